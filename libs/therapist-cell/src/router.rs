use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::{self, TherapistCellState};

/// Routes expect `Principal` in the request extensions; the API layers the
/// authentication and role middleware around them.
pub fn therapist_routes(state: Arc<TherapistCellState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_therapists).post(handlers::create_therapist))
        .route("/availability", get(handlers::list_all_availability))
        .route(
            "/availability/{window_id}",
            patch(handlers::update_availability).delete(handlers::delete_availability),
        )
        .route(
            "/{therapist_id}",
            get(handlers::get_therapist)
                .put(handlers::update_therapist)
                .delete(handlers::delete_therapist),
        )
        .route(
            "/{therapist_id}/availability",
            get(handlers::list_availability).post(handlers::create_availability),
        )
        .with_state(state)
}
