use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use session_cell::services::store::SupabaseSessionStore;
use session_cell::{Session, SessionStatus, SessionStore, StatusUpdate};
use shared_database::{StoreError, SupabaseClient};
use shared_models::clock::ClockTime;
use shared_utils::test_utils::TestConfig;

fn store_for(server: &MockServer) -> SupabaseSessionStore {
    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    SupabaseSessionStore::new(Arc::new(SupabaseClient::new(&config)))
}

fn session_row(id: Uuid, status: &str) -> serde_json::Value {
    let now = Utc::now().to_rfc3339();
    json!({
        "id": id,
        "patient_id": Uuid::nil(),
        "patient_name": "Anna Kowalska",
        "therapist_id": Uuid::nil(),
        "therapist_name": "Natalia Pucz",
        "date": "2025-03-10",
        "start_time": "09:00",
        "end_time": "10:00",
        "status": status,
        "notes": null,
        "created_at": now,
        "updated_at": now
    })
}

fn session(id: Uuid) -> Session {
    serde_json::from_value(session_row(id, "scheduled")).unwrap()
}

#[tokio::test]
async fn booking_rpc_without_rows_means_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let result = store_for(&server).insert_if_free(&session(Uuid::new_v4())).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn booking_rpc_returns_inserted_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(id, "scheduled")])))
        .mount(&server)
        .await;

    let created = store_for(&server).insert_if_free(&session(id)).await.unwrap().unwrap();

    assert_eq!(created.id, id);
    assert_eq!(created.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    assert_eq!(created.start_time, ClockTime::parse("09:00").unwrap());
}

#[tokio::test]
async fn status_update_is_conditional_on_previous_status() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/sessions"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(id, "no-show")])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/sessions"))
        .and(query_param("status", "eq.no-show"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(id, "completed")])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = store_for(&server)
        .update_status(id, SessionStatus::Completed, Utc::now())
        .await
        .unwrap();

    let (previous, updated) = assert_matches!(outcome, StatusUpdate::Updated { previous, session } => (previous, session));
    assert_eq!(previous, SessionStatus::NoShow);
    assert_eq!(updated.status, SessionStatus::Completed);
}

#[tokio::test]
async fn status_update_gives_up_after_repeated_races() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(id, "scheduled")])))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let result = store_for(&server)
        .update_status(id, SessionStatus::Cancelled, Utc::now())
        .await;

    assert_matches!(result, Err(StoreError::Conflict(_)));
}

#[tokio::test]
async fn status_update_on_missing_session_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = store_for(&server)
        .update_status(Uuid::new_v4(), SessionStatus::Completed, Utc::now())
        .await
        .unwrap();

    assert_eq!(result, StatusUpdate::NotFound);
}

#[tokio::test]
async fn restoring_cancelled_session_goes_through_guarded_function() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(id, "cancelled")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/reactivate_session"))
        .and(body_partial_json(json!({ "p_id": id, "p_status": "scheduled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(id, "scheduled")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = store_for(&server)
        .update_status(id, SessionStatus::Scheduled, Utc::now())
        .await
        .unwrap();

    let previous = assert_matches!(outcome, StatusUpdate::Updated { previous, .. } => previous);
    assert_eq!(previous, SessionStatus::Cancelled);
}

#[tokio::test]
async fn restoring_into_rebooked_slot_reports_slot_taken() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    // Still cancelled on the re-read, so the empty reply means the slot is gone.
    Mock::given(method("GET"))
        .and(path("/rest/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(id, "cancelled")])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/reactivate_session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = store_for(&server)
        .update_status(id, SessionStatus::Scheduled, Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome, StatusUpdate::SlotTaken);
}

#[tokio::test]
async fn date_range_filters_both_ends() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/sessions"))
        .and(query_param("order", "date.asc,start_time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_row(Uuid::new_v4(), "completed")])))
        .expect(1)
        .mount(&server)
        .await;

    let from = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    let sessions = store_for(&server).list_by_date_range(from, to).await.unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, SessionStatus::Completed);
}
