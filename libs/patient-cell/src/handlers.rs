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

use crate::models::{CreatePatientRequest, UpdatePatientRequest};
use crate::services::{PackageBalanceTracker, PatientService};

pub struct PatientCellState {
    pub patients: PatientService,
    pub balance: PackageBalanceTracker,
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<PatientCellState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let patients = state.patients.list_patients().await?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<PatientCellState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    principal.require_admin()?;

    let patient = state.patients.create_patient(request).await?;
    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<PatientCellState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    principal.require_patient_access(patient_id)?;

    let patient = state.patients.get_patient(patient_id).await?;
    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<PatientCellState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let patient = state.patients.update_patient(patient_id, request).await?;
    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<PatientCellState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require_admin()?;

    state.patients.delete_patient(patient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_balance(
    State(state): State<Arc<PatientCellState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    principal.require_patient_access(patient_id)?;

    let balance = state.balance.balance(patient_id).await?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "balance": balance
    })))
}

#[axum::debug_handler]
pub async fn package_summary(
    State(state): State<Arc<PatientCellState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let summary = state.balance.package_summary().await?;
    Ok(Json(json!(summary)))
}
