// src/repositories/postgres/identity.rs
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use nina_common::error::Error;
use nina_common::models::OperatorProfile;
use nina_common::traits::repository_traits::IdentityRepository;

/// Postgres-based identity repository, resolving console operators to
/// the organization they belong to.
#[derive(Clone)]
pub struct PostgresIdentityRepository {
    pool: Pool<Postgres>,
}

impl PostgresIdentityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn operator_profile(&self, user_id: Uuid) -> Result<Option<OperatorProfile>, Error> {
        let row = sqlx::query_as::<_, OperatorProfile>(
            r#"
            SELECT user_id,
                   organization_id,
                   display_name
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
