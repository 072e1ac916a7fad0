use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::*;

pub fn create_patient_router(state: Arc<PatientCellState>) -> Router {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route("/packages/summary", get(package_summary))
        .route("/{id}", get(get_patient).put(update_patient).delete(delete_patient))
        .route("/{id}/balance", get(get_balance))
        .with_state(state)
}
