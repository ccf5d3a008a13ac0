// File: src/services/aggregation.rs
//
// The pure reduction step of a dashboard pass: entity rows in,
// MetricsSnapshot out. No clock reads and no I/O; every time boundary
// comes from the TimeWindows handed in.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use nina_common::models::{
    ratio_percentage, Conversation, FollowUp, HumanActivation, Message, MessageSender,
    MetricCount, MetricsSnapshot, Organization, OrganizationProfile, Patient,
    UpcomingAppointment,
};

use crate::utils::time::TimeWindows;

/// Everything one aggregation pass reads, already scoped to a single
/// organization's patients by the repository layer.
#[derive(Debug, Clone, Default)]
pub struct DashboardSources {
    pub patients: Vec<Patient>,
    pub conversations: Vec<Conversation>,
    pub messages: Vec<Message>,
    pub follow_ups: Vec<FollowUp>,
    pub human_activations: Vec<HumanActivation>,
    pub satisfaction_clicks: i64,
    pub upcoming_appointments: Vec<UpcomingAppointment>,
}

/// Reduces one organization's working set into a snapshot.
///
/// The message metrics need the Message → Conversation → Patient join,
/// so the pass builds its lookup structures once up front:
/// 1. conversation id → patient id map;
/// 2. human-message timestamps grouped by patient;
/// 3. follow-up send times grouped by patient and sorted, so the
///    spontaneous-contact check is a binary-search range probe instead
///    of a rescan of every follow-up per message.
/// After that each patient is visited once.
pub fn aggregate_snapshot(
    organization: &Organization,
    procedures: i32,
    sources: DashboardSources,
    windows: &TimeWindows,
) -> MetricsSnapshot {
    let total_patients = sources.patients.len() as i64;

    let new_patients_monthly = sources
        .patients
        .iter()
        .filter(|patient| windows.in_last_30d(patient.created_at))
        .count() as i64;

    let conversation_patient: HashMap<Uuid, Uuid> = sources
        .conversations
        .iter()
        .map(|conversation| (conversation.conversation_id, conversation.patient_id))
        .collect();

    // Activation deduplicates: two conversations for two procedures
    // still count their patient once.
    let activated: HashSet<Uuid> = sources
        .conversations
        .iter()
        .map(|conversation| conversation.patient_id)
        .collect();

    let mut human_messages: HashMap<Uuid, Vec<DateTime<Utc>>> = HashMap::new();
    for message in &sources.messages {
        if message.sender != MessageSender::Human {
            continue;
        }
        let Some(&patient_id) = conversation_patient.get(&message.conversation_id) else {
            continue;
        };
        human_messages
            .entry(patient_id)
            .or_default()
            .push(message.created_at);
    }

    let mut follow_up_sends: HashMap<Uuid, Vec<DateTime<Utc>>> = HashMap::new();
    for follow_up in &sources.follow_ups {
        follow_up_sends
            .entry(follow_up.patient_id)
            .or_default()
            .push(follow_up.scheduled_send_at);
    }
    for sends in follow_up_sends.values_mut() {
        sends.sort_unstable();
    }

    let mut active = 0i64;
    let mut spontaneous = 0i64;
    for (patient_id, timestamps) in &human_messages {
        if timestamps.iter().any(|&t| windows.in_last_24h(t)) {
            active += 1;
        }
        let sends = follow_up_sends
            .get(patient_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        // Existential: one unsolicited message makes the patient
        // spontaneous, no matter how many solicited ones surround it.
        if timestamps.iter().any(|&t| !followed_up_before(sends, t)) {
            spontaneous += 1;
        }
    }

    let activations_today = sources
        .human_activations
        .iter()
        .filter(|activation| windows.is_today(activation.created_at))
        .count() as i64;
    let activations_monthly = sources
        .human_activations
        .iter()
        .filter(|activation| windows.in_last_30d(activation.created_at))
        .count() as i64;

    MetricsSnapshot {
        procedures: procedures as i64,
        total_patients,
        patients_percentage: ratio_percentage(total_patients, procedures as i64),
        active_patients: MetricCount::from_ratio(active, total_patients),
        nina_activation: MetricCount::from_ratio(activated.len() as i64, total_patients),
        // TODO: real formula pending product definition; the dashboard
        // contract reserves the field.
        response_rate_24h: MetricCount::default(),
        spontaneous_contacts: MetricCount::from_ratio(spontaneous, total_patients),
        human_activations: MetricCount {
            count: activations_today,
            // The contract leaves this percentage slot unused.
            percentage: 0,
        },
        satisfaction_clicks: sources.satisfaction_clicks,
        new_patients_monthly,
        human_activations_monthly: activations_monthly,
        upcoming_appointments: sources.upcoming_appointments,
        user_profile: Some(OrganizationProfile {
            name: organization.name.clone(),
        }),
    }
}

/// True when some follow-up send falls in `[t - 24h, t)`, i.e. the
/// message at `t` was solicited. A send at exactly `t - 24h` still
/// counts as solicitation; a send at `t` itself does not.
fn followed_up_before(sends: &[DateTime<Utc>], t: DateTime<Utc>) -> bool {
    let window_start = t - Duration::hours(24);
    let idx = sends.partition_point(|&send| send < window_start);
    idx < sends.len() && sends[idx] < t
}
