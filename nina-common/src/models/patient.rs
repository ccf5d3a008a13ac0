use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient enrolled for post-procedure follow-up. `organization_id`
/// never changes after creation.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Patient {
    pub patient_id: Uuid,
    pub organization_id: Uuid,
    pub full_name: String,
    /// WhatsApp number the follow-up agent messages.
    pub phone: String,
    pub created_at: DateTime<Utc>,
}
