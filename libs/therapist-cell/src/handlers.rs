use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::{
    CreateAvailabilityRequest, CreateTherapistRequest, UpdateAvailabilityRequest, UpdateTherapistRequest,
};
use crate::services::{AvailabilityService, TherapistService};

pub struct TherapistCellState {
    pub therapists: TherapistService,
    pub availability: AvailabilityService,
}

// ==============================================================================
// THERAPIST ROSTER
// ==============================================================================

#[axum::debug_handler]
pub async fn list_therapists(
    State(state): State<Arc<TherapistCellState>>,
    Extension(_principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let therapists = state.therapists.list_therapists().await?;

    Ok(Json(json!({
        "therapists": therapists,
        "total": therapists.len()
    })))
}

#[axum::debug_handler]
pub async fn get_therapist(
    State(state): State<Arc<TherapistCellState>>,
    Extension(_principal): Extension<Principal>,
    Path(therapist_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let therapist = state.therapists.get_therapist(therapist_id).await?;
    Ok(Json(json!(therapist)))
}

#[axum::debug_handler]
pub async fn create_therapist(
    State(state): State<Arc<TherapistCellState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateTherapistRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    principal.require_admin()?;

    let therapist = state.therapists.create_therapist(request).await?;
    Ok((StatusCode::CREATED, Json(json!(therapist))))
}

#[axum::debug_handler]
pub async fn update_therapist(
    State(state): State<Arc<TherapistCellState>>,
    Extension(principal): Extension<Principal>,
    Path(therapist_id): Path<Uuid>,
    Json(request): Json<UpdateTherapistRequest>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let therapist = state.therapists.update_therapist(therapist_id, request).await?;
    Ok(Json(json!(therapist)))
}

#[axum::debug_handler]
pub async fn delete_therapist(
    State(state): State<Arc<TherapistCellState>>,
    Extension(principal): Extension<Principal>,
    Path(therapist_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require_admin()?;

    state.therapists.delete_therapist(therapist_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==============================================================================
// WEEKLY AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn list_all_availability(
    State(state): State<Arc<TherapistCellState>>,
    Extension(_principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let windows = state.availability.list_all_windows().await?;
    Ok(Json(json!({ "availability": windows })))
}

#[axum::debug_handler]
pub async fn list_availability(
    State(state): State<Arc<TherapistCellState>>,
    Extension(_principal): Extension<Principal>,
    Path(therapist_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let windows = state.availability.list_windows(therapist_id).await?;

    Ok(Json(json!({
        "therapist_id": therapist_id,
        "availability": windows
    })))
}

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<TherapistCellState>>,
    Extension(principal): Extension<Principal>,
    Path(therapist_id): Path<Uuid>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    principal.require_admin()?;

    let window = state.availability.create_window(therapist_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(window))))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<TherapistCellState>>,
    Extension(principal): Extension<Principal>,
    Path(window_id): Path<Uuid>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let window = state.availability.update_window(window_id, request).await?;
    Ok(Json(json!(window)))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<TherapistCellState>>,
    Extension(principal): Extension<Principal>,
    Path(window_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require_admin()?;

    state.availability.delete_window(window_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
