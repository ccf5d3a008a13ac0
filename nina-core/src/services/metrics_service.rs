// File: src/services/metrics_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};
use uuid::Uuid;

use nina_common::error::Error;
use nina_common::models::{MetricsSnapshot, Organization};
use nina_common::traits::repository_traits::{DashboardRepository, IdentityRepository};

use crate::services::aggregation::{aggregate_snapshot, DashboardSources};
use crate::utils::time::TimeWindows;

/// How many of today's procedures the appointments card shows.
const UPCOMING_APPOINTMENTS_LIMIT: i64 = 5;

/// Produces dashboard snapshots for console operators. Holds only
/// shared repository handles and the clinic timezone, so one instance
/// serves concurrent callers.
pub struct MetricsService {
    dashboard_repo: Arc<dyn DashboardRepository>,
    identity_repo: Arc<dyn IdentityRepository>,
    timezone: Tz,
}

impl MetricsService {
    pub fn new(
        dashboard_repo: Arc<dyn DashboardRepository>,
        identity_repo: Arc<dyn IdentityRepository>,
        timezone: Tz,
    ) -> Self {
        Self {
            dashboard_repo,
            identity_repo,
            timezone,
        }
    }

    /// Resolves the operator to an organization and aggregates its
    /// metrics against `reference`.
    ///
    /// An operator that does not resolve (no profile row, a profile
    /// without an organization, or a dangling organization id) gets
    /// the zeroed snapshot, not an error. Repository failures do
    /// propagate: a broken read never degrades into fake zeros.
    pub async fn snapshot_for_operator(
        &self,
        operator_user_id: Uuid,
        reference: DateTime<Utc>,
    ) -> Result<MetricsSnapshot, Error> {
        let Some(profile) = self.identity_repo.operator_profile(operator_user_id).await? else {
            debug!("no profile for operator '{}' => zeroed snapshot", operator_user_id);
            return Ok(MetricsSnapshot::empty());
        };
        let Some(organization_id) = profile.organization_id else {
            debug!(
                "operator '{}' not linked to an organization => zeroed snapshot",
                operator_user_id
            );
            return Ok(MetricsSnapshot::empty());
        };
        let Some(organization) = self.dashboard_repo.get_organization(organization_id).await?
        else {
            debug!("organization '{}' not found => zeroed snapshot", organization_id);
            return Ok(MetricsSnapshot::empty());
        };
        self.snapshot_for_organization(&organization, reference).await
    }

    /// One aggregation pass for an already-resolved organization:
    /// 1) an organization whose procedures counter was never entered
    ///    gets the zeroed snapshot;
    /// 2) fetch the patient roster;
    /// 3) fan out the patient-scoped reads, then the
    ///    conversation-scoped reads, failing the whole pass on the
    ///    first repository error;
    /// 4) reduce in memory against one set of time windows.
    pub async fn snapshot_for_organization(
        &self,
        organization: &Organization,
        reference: DateTime<Utc>,
    ) -> Result<MetricsSnapshot, Error> {
        let Some(procedures) = organization.procedures_performed else {
            debug!(
                "organization '{}' has no procedures counter => zeroed snapshot",
                organization.organization_id
            );
            return Ok(MetricsSnapshot::empty());
        };

        let windows = TimeWindows::at(reference, self.timezone);

        let patients = self
            .dashboard_repo
            .list_patients(organization.organization_id)
            .await?;
        let patient_ids: Vec<Uuid> = patients.iter().map(|p| p.patient_id).collect();

        let (conversations, follow_ups, satisfaction_clicks, upcoming_appointments) =
            tokio::try_join!(
                self.dashboard_repo.list_conversations(&patient_ids),
                self.dashboard_repo.list_follow_ups(&patient_ids),
                self.dashboard_repo.count_satisfaction_clicks(&patient_ids),
                self.dashboard_repo.list_scheduled_procedures(
                    &patient_ids,
                    windows.day_start(),
                    windows.day_end(),
                    UPCOMING_APPOINTMENTS_LIMIT,
                ),
            )?;

        let conversation_ids: Vec<Uuid> = conversations
            .iter()
            .map(|c| c.conversation_id)
            .collect();

        // Activations older than the 30-day window never contribute to
        // any metric, so the fetch is bounded below and open above.
        let (messages, human_activations) = tokio::try_join!(
            self.dashboard_repo.list_messages(&conversation_ids),
            self.dashboard_repo.list_human_activations(
                &conversation_ids,
                Some(windows.month_start()),
                None,
            ),
        )?;

        info!(
            "dashboard pass for organization '{}': {} patients, {} conversations, {} messages",
            organization.organization_id,
            patients.len(),
            conversations.len(),
            messages.len()
        );

        let sources = DashboardSources {
            patients,
            conversations,
            messages,
            follow_ups,
            human_activations,
            satisfaction_clicks,
            upcoming_appointments,
        };
        Ok(aggregate_snapshot(organization, procedures, sources, &windows))
    }
}
