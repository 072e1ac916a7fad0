use axum::{middleware, routing::get, Router};

use auth_cell::role_middleware;
use auth_cell::router::auth_routes;
use patient_cell::router::create_patient_router;
use session_cell::router::session_routes;
use shared_utils::extractor::auth_middleware;
use therapist_cell::router::therapist_routes;

use crate::state::AppState;

pub fn create_router(state: &AppState) -> Router {
    // The last layer runs first: authenticate, then resolve the role.
    let protected = Router::new()
        .nest("/auth", auth_routes(state.resolver.clone()))
        .nest("/therapists", therapist_routes(state.therapist.clone()))
        .nest("/patients", create_patient_router(state.patient.clone()))
        .nest("/sessions", session_routes(state.session.clone()))
        .layer(middleware::from_fn_with_state(state.resolver.clone(), role_middleware))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Stores;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use shared_config::ClinicSeed;
    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser, TEST_JWT_SECRET};
    use tower::ServiceExt;

    async fn seeded_app() -> (Router, AppState) {
        let state = AppState::build(TestConfig::default().to_arc(), Stores::in_memory());
        state
            .therapist
            .therapists
            .bootstrap(&ClinicSeed::default(), &state.therapist.availability)
            .await
            .unwrap();
        (create_router(&state), state)
    }

    fn request(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_is_public() {
        let (app, _) = seeded_app().await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cell_routes_require_a_token() {
        let (app, _) = seeded_app().await;

        let response = app
            .oneshot(Request::builder().uri("/therapists").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_books_a_session_end_to_end() {
        let (app, state) = seeded_app().await;
        let token = JwtTestUtils::create_test_token(&TestUser::admin(), TEST_JWT_SECRET, Some(1));

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/therapists", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let therapists = json_body(response).await;
        let natalia = therapists["therapists"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "Natalia Pucz")
            .cloned()
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/patients",
                &token,
                Some(json!({ "name": "Anna Kowalska", "total_sessions": 10 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let patient = json_body(response).await;

        let windows = state
            .therapist
            .availability
            .list_windows(serde_json::from_value(natalia["id"].clone()).unwrap())
            .await
            .unwrap();
        let window = windows.first().unwrap();
        let date = next_weekday(window.day_of_week);

        let booking = json!({
            "patient_id": patient["id"],
            "therapist_id": natalia["id"],
            "date": date.to_string(),
            "start_time": window.start_time.to_string(),
            "end_time": window.start_time.checked_add_minutes(60).unwrap().to_string(),
            "notes": null
        });
        let response = app
            .clone()
            .oneshot(request(Method::POST, "/sessions", &token, Some(booking.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(request(Method::POST, "/sessions", &token, Some(booking)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    fn next_weekday(day_of_week: u8) -> chrono::NaiveDate {
        use chrono::Datelike;

        let mut date = chrono::Local::now().date_naive();
        while date.weekday().num_days_from_sunday() as u8 != day_of_week {
            date = date.succ_opt().unwrap();
        }
        date
    }
}
