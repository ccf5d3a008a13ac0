use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::error::Error;
use crate::models::conversation::{Conversation, HumanActivation, Message};
use crate::models::follow_up::FollowUp;
use crate::models::metrics::UpcomingAppointment;
use crate::models::organization::{OperatorProfile, Organization};
use crate::models::patient::Patient;

/// Read-only access to the entity collections the dashboard aggregates
/// over. Window semantics and ratio math live in the aggregation pass,
/// not here.
///
/// Every method fails with `Error::Database` on transport or permission
/// problems; one failed read aborts the whole snapshot.
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, Error>;

    /// All patients of one organization.
    async fn list_patients(&self, organization_id: Uuid) -> Result<Vec<Patient>, Error>;

    /// Conversations whose patient is in the given id set.
    async fn list_conversations(&self, patient_ids: &[Uuid]) -> Result<Vec<Conversation>, Error>;

    /// Messages of the given conversations, oldest first.
    async fn list_messages(&self, conversation_ids: &[Uuid]) -> Result<Vec<Message>, Error>;

    /// Scheduled outbound contacts for the given patients.
    async fn list_follow_ups(&self, patient_ids: &[Uuid]) -> Result<Vec<FollowUp>, Error>;

    /// Escalation events for the given conversations, optionally
    /// bounded to `[from, to)` (inclusive start, exclusive end).
    async fn list_human_activations(
        &self,
        conversation_ids: &[Uuid],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<HumanActivation>, Error>;

    /// Raw satisfaction-click count for the given patients; clicks are
    /// never deduplicated.
    async fn count_satisfaction_clicks(&self, patient_ids: &[Uuid]) -> Result<i64, Error>;

    /// Scheduled procedures inside `[from, to]` (both ends inclusive),
    /// ascending by time, at most `limit` rows, joined with the patient
    /// and professional display names.
    async fn list_scheduled_procedures(
        &self,
        patient_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UpcomingAppointment>, Error>;
}

/// The session/identity collaborator: maps an authenticated console
/// operator to the organization scope their dashboard reads.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// `None` when the operator has no profile row at all.
    async fn operator_profile(&self, user_id: Uuid) -> Result<Option<OperatorProfile>, Error>;
}
