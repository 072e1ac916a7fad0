// libs/therapist-cell/tests/supabase_store_test.rs
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_database::SupabaseClient;
use shared_models::clock::ClockTime;
use shared_utils::test_utils::TestConfig;
use therapist_cell::services::store::{SupabaseAvailabilityStore, SupabaseTherapistStore};
use therapist_cell::{AvailabilityStore, TherapistStore};

fn client_for(server: &MockServer) -> Arc<SupabaseClient> {
    Arc::new(SupabaseClient::new(&TestConfig::with_supabase_url(&server.uri()).to_app_config()))
}

fn window_row(id: Uuid, therapist_id: Uuid, day: u8, start: &str, end: &str) -> serde_json::Value {
    json!({
        "id": id,
        "therapist_id": therapist_id,
        "day_of_week": day,
        "start_time": start,
        "end_time": end,
        "is_active": true
    })
}

#[tokio::test]
async fn lists_windows_for_therapist_in_order() {
    let server = MockServer::start().await;
    let therapist_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability"))
        .and(query_param("therapist_id", format!("eq.{}", therapist_id)))
        .and(query_param("order", "day_of_week.asc,start_time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            window_row(Uuid::new_v4(), therapist_id, 1, "18:30", "19:30"),
            window_row(Uuid::new_v4(), therapist_id, 4, "16:30", "17:30"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = SupabaseAvailabilityStore::new(client_for(&server));
    let windows = store.list_windows(therapist_id).await.unwrap();

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].start_time, ClockTime::parse("18:30").unwrap());
    assert_eq!(windows[1].day_of_week, 4);
}

#[tokio::test]
async fn cascade_delete_counts_removed_windows() {
    let server = MockServer::start().await;
    let therapist_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/availability"))
        .and(query_param("therapist_id", format!("eq.{}", therapist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            window_row(Uuid::new_v4(), therapist_id, 3, "10:00", "16:00"),
            window_row(Uuid::new_v4(), therapist_id, 5, "08:00", "13:00"),
        ])))
        .mount(&server)
        .await;

    let store = SupabaseAvailabilityStore::new(client_for(&server));

    assert_eq!(store.delete_all_windows_for(therapist_id).await.unwrap(), 2);
}

#[tokio::test]
async fn missing_therapist_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = SupabaseTherapistStore::new(client_for(&server));

    assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn backend_failure_surfaces_as_store_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = SupabaseTherapistStore::new(client_for(&server));
    let err = store.list().await.unwrap_err();

    assert!(err.to_string().contains("boom"));
}
