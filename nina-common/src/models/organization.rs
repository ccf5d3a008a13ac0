use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A clinic tenant. Every dashboard metric is scoped to exactly one
/// organization.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Organization {
    pub organization_id: Uuid,
    pub name: String,
    /// Procedures-performed counter entered by the clinic during
    /// onboarding. `None` means it was never filled in, which is a
    /// different state from an entered `Some(0)`.
    pub procedures_performed: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Row in `profiles` linking an authenticated console operator to the
/// organization they work for. `organization_id` stays `None` until
/// onboarding completes.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct OperatorProfile {
    pub user_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub display_name: Option<String>,
}
