use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled outbound contact attempt, planned by the follow-up
/// engine independently of whether the patient ever replies.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct FollowUp {
    pub follow_up_id: Uuid,
    pub patient_id: Uuid,
    /// Planned send instant; attribution windows compare against this,
    /// not against any message timestamp.
    pub scheduled_send_at: DateTime<Utc>,
    /// Vocabulary owned by the messaging subsystem; treated as opaque
    /// here.
    pub status: String,
}
