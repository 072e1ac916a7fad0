use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::LinkPatientRequest;
use crate::services::RoleResolver;

#[axum::debug_handler]
pub async fn get_me(
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(principal)))
}

#[axum::debug_handler]
pub async fn link_user_to_patient(
    State(resolver): State<Arc<RoleResolver>>,
    Extension(principal): Extension<Principal>,
    Path(uid): Path<String>,
    Json(request): Json<LinkPatientRequest>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let record = resolver.link_user_to_patient(&uid, request.patient_id).await?;

    Ok(Json(json!({
        "uid": record.uid,
        "patient_id": record.patient_id
    })))
}
