// File: nina-core/src/test_utils/helpers.rs

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use crate::db::Database;
use crate::Error;

/// Installs a fmt subscriber honoring `RUST_LOG`, with this crate at
/// debug by default. Tests call it freely; only the first call in a
/// process installs.
pub fn init_test_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("nina_core=debug".parse().unwrap_or_default());
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Connection pool for the database named by `TEST_DATABASE_URL`.
/// Tests that need Postgres check the variable themselves and skip
/// when it is unset.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .map_err(|_| Error::Config("TEST_DATABASE_URL is not set".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so a run can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            scheduled_procedures,
            professionals,
            satisfaction_clicks,
            human_activations,
            follow_ups,
            messages,
            conversations,
            patients,
            profiles,
            organizations
        RESTART IDENTITY CASCADE;
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns a migrated, empty test DB handle.
pub async fn setup_test_database() -> Result<Database, Error> {
    let pool = create_test_db_pool().await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;

    Ok(db)
}

// Row seeding. Timestamps that drive a metric window are explicit
// parameters; the ones no metric reads are filled in here.

pub async fn insert_organization(
    pool: &Pool<Postgres>,
    name: &str,
    procedures_performed: Option<i32>,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO organizations (organization_id, name, procedures_performed, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(name)
    .bind(procedures_performed)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_profile(
    pool: &Pool<Postgres>,
    organization_id: Option<Uuid>,
    display_name: Option<&str>,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO profiles (user_id, organization_id, display_name, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(organization_id)
    .bind(display_name)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_patient(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    full_name: &str,
    created_at: DateTime<Utc>,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO patients (patient_id, organization_id, full_name, phone, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(organization_id)
    .bind(full_name)
    .bind("+5511988887777")
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_conversation(
    pool: &Pool<Postgres>,
    patient_id: Uuid,
    status: &str,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO conversations (conversation_id, patient_id, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)",
    )
    .bind(id)
    .bind(patient_id)
    .bind(status)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_message(
    pool: &Pool<Postgres>,
    conversation_id: Uuid,
    sender: &str,
    created_at: DateTime<Utc>,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO messages (message_id, conversation_id, type, content, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(conversation_id)
    .bind(sender)
    .bind("mensagem de teste")
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_follow_up(
    pool: &Pool<Postgres>,
    patient_id: Uuid,
    scheduled_send_at: DateTime<Utc>,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO follow_ups (follow_up_id, patient_id, scheduled_send_at, status)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(patient_id)
    .bind(scheduled_send_at)
    .bind("sent")
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_human_activation(
    pool: &Pool<Postgres>,
    conversation_id: Uuid,
    created_at: DateTime<Utc>,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO human_activations (activation_id, conversation_id, created_at)
         VALUES ($1, $2, $3)",
    )
    .bind(id)
    .bind(conversation_id)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_satisfaction_click(
    pool: &Pool<Postgres>,
    patient_id: Uuid,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO satisfaction_clicks (click_id, patient_id, clicked_at)
         VALUES ($1, $2, $3)",
    )
    .bind(id)
    .bind(patient_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_professional(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    name: &str,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO professionals (professional_id, organization_id, name)
         VALUES ($1, $2, $3)",
    )
    .bind(id)
    .bind(organization_id)
    .bind(name)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_scheduled_procedure(
    pool: &Pool<Postgres>,
    patient_id: Uuid,
    professional_id: Uuid,
    scheduled_at: DateTime<Utc>,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO scheduled_procedures
             (procedure_id, patient_id, professional_id, procedure_name, scheduled_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(patient_id)
    .bind(professional_id)
    .bind("Retorno pós-operatório")
    .bind(scheduled_at)
    .execute(pool)
    .await?;
    Ok(id)
}
