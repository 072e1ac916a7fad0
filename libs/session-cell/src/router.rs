use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{self, SessionCellState};

pub fn session_routes(state: Arc<SessionCellState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_session).get(handlers::list_sessions))
        .route("/check", get(handlers::check_slot))
        .route("/open-slots", get(handlers::open_slots))
        .route("/stats", get(handlers::dashboard_stats))
        .route("/reconcile/{patient_id}", post(handlers::reconcile_patient))
        .route("/{session_id}", get(handlers::get_session).delete(handlers::delete_session))
        .route("/{session_id}/status", patch(handlers::change_status))
        .with_state(state)
}
