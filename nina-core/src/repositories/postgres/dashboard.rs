// src/repositories/postgres/dashboard.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use nina_common::error::Error;
use nina_common::models::{
    Conversation, FollowUp, HumanActivation, Message, Organization, Patient, UpcomingAppointment,
};
use nina_common::traits::repository_traits::DashboardRepository;

/// Postgres-based dashboard repository. Every listing is scoped by the
/// id set the caller passes in; an empty id set short-circuits without
/// touching the database.
#[derive(Clone)]
pub struct PostgresDashboardRepository {
    pool: Pool<Postgres>,
}

impl PostgresDashboardRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardRepository for PostgresDashboardRepository {
    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, Error> {
        let row = sqlx::query_as::<_, Organization>(
            r#"
            SELECT organization_id,
                   name,
                   procedures_performed,
                   created_at
            FROM organizations
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_patients(&self, organization_id: Uuid) -> Result<Vec<Patient>, Error> {
        let rows = sqlx::query_as::<_, Patient>(
            r#"
            SELECT patient_id,
                   organization_id,
                   full_name,
                   phone,
                   created_at
            FROM patients
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_conversations(&self, patient_ids: &[Uuid]) -> Result<Vec<Conversation>, Error> {
        if patient_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT conversation_id,
                   patient_id,
                   status,
                   created_at,
                   updated_at
            FROM conversations
            WHERE patient_id = ANY($1)
            "#,
        )
        .bind(patient_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_messages(&self, conversation_ids: &[Uuid]) -> Result<Vec<Message>, Error> {
        if conversation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT message_id,
                   conversation_id,
                   type,
                   content,
                   created_at
            FROM messages
            WHERE conversation_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_follow_ups(&self, patient_ids: &[Uuid]) -> Result<Vec<FollowUp>, Error> {
        if patient_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, FollowUp>(
            r#"
            SELECT follow_up_id,
                   patient_id,
                   scheduled_send_at,
                   status
            FROM follow_ups
            WHERE patient_id = ANY($1)
            "#,
        )
        .bind(patient_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_human_activations(
        &self,
        conversation_ids: &[Uuid],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<HumanActivation>, Error> {
        if conversation_ids.is_empty() {
            return Ok(Vec::new());
        }
        // Bounds are half-open: `from` inclusive, `to` exclusive. A
        // NULL bound leaves that side of the range open.
        let rows = sqlx::query_as::<_, HumanActivation>(
            r#"
            SELECT activation_id,
                   conversation_id,
                   created_at
            FROM human_activations
            WHERE conversation_id = ANY($1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            "#,
        )
        .bind(conversation_ids)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_satisfaction_clicks(&self, patient_ids: &[Uuid]) -> Result<i64, Error> {
        if patient_ids.is_empty() {
            return Ok(0);
        }
        // Raw event count: a patient clicking twice counts twice.
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM satisfaction_clicks
            WHERE patient_id = ANY($1)
            "#,
        )
        .bind(patient_ids)
        .fetch_one(&self.pool)
        .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn list_scheduled_procedures(
        &self,
        patient_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UpcomingAppointment>, Error> {
        if patient_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UpcomingAppointment>(
            r#"
            SELECT sp.procedure_id,
                   sp.scheduled_at,
                   p.full_name AS patient_name,
                   pr.name AS professional_name
            FROM scheduled_procedures sp
            JOIN patients p ON p.patient_id = sp.patient_id
            JOIN professionals pr ON pr.professional_id = sp.professional_id
            WHERE sp.patient_id = ANY($1)
              AND sp.scheduled_at BETWEEN $2 AND $3
            ORDER BY sp.scheduled_at ASC, sp.procedure_id ASC
            LIMIT $4
            "#,
        )
        .bind(patient_ids)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
