// File: nina-common/src/models/metrics.rs
//
// Output contract of the dashboard aggregation pass. Everything here
// serializes 1:1 into the JSON the console front-end binds to, so the
// serde renames are part of the contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer percentage of `count` over `total`, rounded half-up and
/// clamped to 100. A non-positive denominator yields 0 instead of a
/// division error.
///
/// Half-up is pinned on purpose: `1/8` is 13, not the 12 that
/// round-half-to-even would produce.
pub fn ratio_percentage(count: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }
    ((100 * count + total / 2) / total).clamp(0, 100) as u8
}

/// A count plus its percentage share of the organization's patients.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq)]
pub struct MetricCount {
    pub count: i64,
    pub percentage: u8,
}

impl MetricCount {
    /// Builds the pair from a raw count and the denominator it is
    /// measured against.
    pub fn from_ratio(count: i64, total: i64) -> Self {
        Self {
            count,
            percentage: ratio_percentage(count, total),
        }
    }
}

/// One row of the "today's appointments" card: a scheduled procedure
/// joined with the display names the console shows next to it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAppointment {
    #[serde(rename = "id")]
    pub procedure_id: Uuid,
    #[serde(rename = "time")]
    pub scheduled_at: DateTime<Utc>,
    pub patient_name: String,
    pub professional_name: String,
}

/// Display header of the resolved organization. `None` on the zeroed
/// snapshot signals the "onboarding incomplete" state to the
/// presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationProfile {
    pub name: String,
}

/// The complete, immutable result of one aggregation pass, computed
/// against a single reference instant. Constructed fresh on every call;
/// has no behavior of its own.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub procedures: i64,
    pub total_patients: i64,
    pub patients_percentage: u8,
    pub active_patients: MetricCount,
    pub nina_activation: MetricCount,
    pub response_rate_24h: MetricCount,
    pub spontaneous_contacts: MetricCount,
    pub human_activations: MetricCount,
    pub satisfaction_clicks: i64,
    pub new_patients_monthly: i64,
    pub human_activations_monthly: i64,
    pub upcoming_appointments: Vec<UpcomingAppointment>,
    pub user_profile: Option<OrganizationProfile>,
}

impl MetricsSnapshot {
    /// The fully zeroed snapshot returned while an operator has no
    /// resolvable organization. Distinct from an error: repository
    /// failures never produce this value.
    pub fn empty() -> Self {
        Self::default()
    }
}
