// tests/repository_tests.rs
//
// Postgres integration suite. Runs only when TEST_DATABASE_URL points
// at a database we may freely truncate; otherwise every test skips.
// The schema is migrated once per run and all assertions are scoped to
// ids created inside the test, so the tests can run concurrently.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz::UTC;
use tokio::sync::OnceCell;
use uuid::Uuid;

use nina_common::models::{ConversationStatus, MessageSender};
use nina_common::traits::repository_traits::{DashboardRepository, IdentityRepository};
use nina_core::repositories::postgres::{PostgresDashboardRepository, PostgresIdentityRepository};
use nina_core::services::MetricsService;
use nina_core::test_utils::helpers::{
    init_test_tracing, insert_conversation, insert_follow_up, insert_human_activation,
    insert_message, insert_organization, insert_patient, insert_professional, insert_profile,
    insert_satisfaction_click, insert_scheduled_procedure, setup_test_database,
};
use nina_core::utils::time::TimeWindows;
use nina_core::{Database, Error};

static DB: OnceCell<Database> = OnceCell::const_new();

/// Shared, migrated test database, or `None` when the suite should
/// skip. Truncation happens once per run, not per test.
async fn test_db() -> Result<Option<&'static Database>, Error> {
    if std::env::var("TEST_DATABASE_URL").is_err() {
        eprintln!("skipping: TEST_DATABASE_URL is not set");
        return Ok(None);
    }
    init_test_tracing();
    let db = DB.get_or_try_init(setup_test_database).await?;
    Ok(Some(db))
}

fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 15, 0, 0).unwrap()
}

#[tokio::test]
async fn test_organization_lookup() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresDashboardRepository::new(db.pool().clone());

    let with_counter = insert_organization(db.pool(), "Clínica Verde", Some(25)).await?;
    let without_counter = insert_organization(db.pool(), "Clínica Nova", None).await?;

    let org = repo.get_organization(with_counter).await?.expect("org should exist");
    assert_eq!(org.name, "Clínica Verde");
    assert_eq!(org.procedures_performed, Some(25));

    let org = repo.get_organization(without_counter).await?.expect("org should exist");
    assert_eq!(org.procedures_performed, None);

    assert!(repo.get_organization(Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_patient_listing_is_scoped_by_organization() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresDashboardRepository::new(db.pool().clone());

    let org_a = insert_organization(db.pool(), "Org A", Some(10)).await?;
    let org_b = insert_organization(db.pool(), "Org B", Some(10)).await?;
    let a1 = insert_patient(db.pool(), org_a, "Paciente A1", reference()).await?;
    let a2 = insert_patient(db.pool(), org_a, "Paciente A2", reference()).await?;
    insert_patient(db.pool(), org_b, "Paciente B1", reference()).await?;

    let patients = repo.list_patients(org_a).await?;
    let mut ids: Vec<Uuid> = patients.iter().map(|p| p.patient_id).collect();
    ids.sort();
    let mut expected = vec![a1, a2];
    expected.sort();
    assert_eq!(ids, expected);
    Ok(())
}

#[tokio::test]
async fn test_conversation_and_message_scoping() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresDashboardRepository::new(db.pool().clone());

    let org = insert_organization(db.pool(), "Org Conversas", Some(10)).await?;
    let p1 = insert_patient(db.pool(), org, "Paciente 1", reference()).await?;
    let p2 = insert_patient(db.pool(), org, "Paciente 2", reference()).await?;
    let c1 = insert_conversation(db.pool(), p1, "em_acompanhamento").await?;
    let c2 = insert_conversation(db.pool(), p2, "aguardando_ativacao").await?;

    // Scoping: only p1's conversation comes back.
    let conversations = repo.list_conversations(&[p1]).await?;
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].conversation_id, c1);
    assert_eq!(conversations[0].status, ConversationStatus::EmAcompanhamento);

    let conversations = repo.list_conversations(&[p1, p2]).await?;
    assert_eq!(conversations.len(), 2);

    // Empty id set short-circuits without touching the database.
    assert!(repo.list_conversations(&[]).await?.is_empty());
    assert!(repo.list_messages(&[]).await?.is_empty());

    // Messages come back oldest first regardless of insert order.
    let late = reference() - Duration::hours(1);
    let early = reference() - Duration::hours(6);
    insert_message(db.pool(), c1, "human", late).await?;
    insert_message(db.pool(), c1, "ai", early).await?;

    let messages = repo.list_messages(&[c1, c2]).await?;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].created_at, early);
    assert_eq!(messages[0].sender, MessageSender::Ai);
    assert_eq!(messages[1].created_at, late);
    assert_eq!(messages[1].sender, MessageSender::Human);
    Ok(())
}

#[tokio::test]
async fn test_follow_up_listing_is_scoped_by_patient() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresDashboardRepository::new(db.pool().clone());

    let org = insert_organization(db.pool(), "Org Follow-ups", Some(10)).await?;
    let p1 = insert_patient(db.pool(), org, "Paciente 1", reference()).await?;
    let p2 = insert_patient(db.pool(), org, "Paciente 2", reference()).await?;
    insert_follow_up(db.pool(), p1, reference() - Duration::hours(12)).await?;
    insert_follow_up(db.pool(), p2, reference() - Duration::hours(12)).await?;

    let follow_ups = repo.list_follow_ups(&[p1]).await?;
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].patient_id, p1);
    assert!(repo.list_follow_ups(&[]).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_human_activation_window_bounds() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresDashboardRepository::new(db.pool().clone());

    let org = insert_organization(db.pool(), "Org Ativações", Some(10)).await?;
    let patient = insert_patient(db.pool(), org, "Paciente", reference()).await?;
    let conversation = insert_conversation(db.pool(), patient, "humano_solicitado").await?;

    let t0 = Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2025, 6, 10, 14, 0, 0).unwrap();
    insert_human_activation(db.pool(), conversation, t0).await?;
    let in_window = insert_human_activation(db.pool(), conversation, t1).await?;
    insert_human_activation(db.pool(), conversation, t2).await?;

    // `from` is inclusive, `to` is exclusive.
    let rows = repo
        .list_human_activations(&[conversation], Some(t1), Some(t2))
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].activation_id, in_window);

    let rows = repo
        .list_human_activations(&[conversation], Some(t1), None)
        .await?;
    assert_eq!(rows.len(), 2);

    let rows = repo
        .list_human_activations(&[conversation], None, Some(t1))
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].created_at, t0);

    let rows = repo.list_human_activations(&[conversation], None, None).await?;
    assert_eq!(rows.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_satisfaction_clicks_count_every_row() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresDashboardRepository::new(db.pool().clone());

    let org = insert_organization(db.pool(), "Org Cliques", Some(10)).await?;
    let p1 = insert_patient(db.pool(), org, "Paciente 1", reference()).await?;
    let p2 = insert_patient(db.pool(), org, "Paciente 2", reference()).await?;
    // Same patient clicking twice counts twice.
    insert_satisfaction_click(db.pool(), p1).await?;
    insert_satisfaction_click(db.pool(), p1).await?;
    insert_satisfaction_click(db.pool(), p2).await?;

    assert_eq!(repo.count_satisfaction_clicks(&[p1, p2]).await?, 3);
    assert_eq!(repo.count_satisfaction_clicks(&[p1]).await?, 2);
    assert_eq!(repo.count_satisfaction_clicks(&[]).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_scheduled_procedures_today_window() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresDashboardRepository::new(db.pool().clone());

    let org = insert_organization(db.pool(), "Org Agenda", Some(10)).await?;
    let patient = insert_patient(db.pool(), org, "Maria Souza", reference()).await?;
    let dr_lima = insert_professional(db.pool(), org, "Dr. Lima").await?;
    let dra_ana = insert_professional(db.pool(), org, "Dra. Ana").await?;

    let windows = TimeWindows::at(reference(), UTC);
    // Six procedures today (08:00..13:00), plus one yesterday and one
    // tomorrow that must not appear.
    for hour in 8..14 {
        let professional = if hour % 2 == 0 { dr_lima } else { dra_ana };
        insert_scheduled_procedure(
            db.pool(),
            patient,
            professional,
            Utc.with_ymd_and_hms(2025, 6, 10, hour, 0, 0).unwrap(),
        )
        .await?;
    }
    insert_scheduled_procedure(
        db.pool(),
        patient,
        dr_lima,
        Utc.with_ymd_and_hms(2025, 6, 9, 10, 0, 0).unwrap(),
    )
    .await?;
    insert_scheduled_procedure(
        db.pool(),
        patient,
        dr_lima,
        Utc.with_ymd_and_hms(2025, 6, 11, 10, 0, 0).unwrap(),
    )
    .await?;

    let rows = repo
        .list_scheduled_procedures(&[patient], windows.day_start(), windows.day_end(), 5)
        .await?;
    assert_eq!(rows.len(), 5, "limit should cap today's six rows at five");
    assert_eq!(
        rows[0].scheduled_at,
        Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap()
    );
    assert_eq!(
        rows[4].scheduled_at,
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    );
    assert_eq!(rows[0].patient_name, "Maria Souza");
    assert_eq!(rows[0].professional_name, "Dr. Lima"); // 08:00, even hour
    assert_eq!(rows[1].professional_name, "Dra. Ana"); // 09:00, odd hour
    assert!(repo
        .list_scheduled_procedures(&[], windows.day_start(), windows.day_end(), 5)
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_operator_profile_lookup() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let repo = PostgresIdentityRepository::new(db.pool().clone());

    let org = insert_organization(db.pool(), "Org Perfis", Some(10)).await?;
    let linked = insert_profile(db.pool(), Some(org), Some("Dra. Ana")).await?;
    let unlinked = insert_profile(db.pool(), None, None).await?;

    let profile = repo.operator_profile(linked).await?.expect("profile should exist");
    assert_eq!(profile.organization_id, Some(org));
    assert_eq!(profile.display_name.as_deref(), Some("Dra. Ana"));

    let profile = repo.operator_profile(unlinked).await?.expect("profile should exist");
    assert_eq!(profile.organization_id, None);

    assert!(repo.operator_profile(Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_full_snapshot_against_postgres() -> Result<(), Error> {
    let Some(db) = test_db().await? else { return Ok(()) };

    // 1) Seed one small clinic.
    let org = insert_organization(db.pool(), "Clínica Aurora", Some(50)).await?;
    let operator = insert_profile(db.pool(), Some(org), Some("Dra. Ana")).await?;
    let talker = insert_patient(db.pool(), org, "Paciente Ativa", reference()).await?;
    let silent = insert_patient(
        db.pool(),
        org,
        "Paciente Quieta",
        reference() - Duration::days(45),
    )
    .await?;
    let conversation = insert_conversation(db.pool(), talker, "em_acompanhamento").await?;
    insert_message(
        db.pool(),
        conversation,
        "human",
        reference() - Duration::hours(1),
    )
    .await?;
    insert_human_activation(db.pool(), conversation, reference() - Duration::hours(2)).await?;
    insert_satisfaction_click(db.pool(), talker).await?;
    let professional = insert_professional(db.pool(), org, "Dr. Lima").await?;
    insert_scheduled_procedure(
        db.pool(),
        silent,
        professional,
        Utc.with_ymd_and_hms(2025, 6, 10, 17, 30, 0).unwrap(),
    )
    .await?;

    // 2) Run the real service over the real repositories.
    let service = MetricsService::new(
        Arc::new(PostgresDashboardRepository::new(db.pool().clone())),
        Arc::new(PostgresIdentityRepository::new(db.pool().clone())),
        UTC,
    );
    let snap = service.snapshot_for_operator(operator, reference()).await?;

    // 3) Every card reflects the seed.
    assert_eq!(snap.procedures, 50);
    assert_eq!(snap.total_patients, 2);
    assert_eq!(snap.patients_percentage, 4); // 2/50
    assert_eq!(snap.new_patients_monthly, 1);
    assert_eq!(snap.nina_activation.count, 1);
    assert_eq!(snap.nina_activation.percentage, 50);
    assert_eq!(snap.active_patients.count, 1);
    assert_eq!(snap.spontaneous_contacts.count, 1);
    assert_eq!(snap.human_activations.count, 1);
    assert_eq!(snap.human_activations_monthly, 1);
    assert_eq!(snap.satisfaction_clicks, 1);
    assert_eq!(snap.upcoming_appointments.len(), 1);
    assert_eq!(snap.upcoming_appointments[0].professional_name, "Dr. Lima");
    assert_eq!(snap.user_profile.expect("profile").name, "Clínica Aurora");
    Ok(())
}
