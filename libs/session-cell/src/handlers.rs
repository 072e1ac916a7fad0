use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::clock::ClockTime;
use shared_models::error::AppError;

use crate::models::{parse_date, NewSessionPayload, Session, SessionError, StatusChangeRequest};
use crate::services::{BookingEngine, SessionLifecycleManager, SessionQueries};

pub struct SessionCellState {
    pub engine: BookingEngine,
    pub lifecycle: SessionLifecycleManager,
    pub queries: SessionQueries,
    pub default_slot_minutes: u16,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSessionsQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub therapist_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CheckSlotQuery {
    pub therapist_id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub exclude_session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct OpenSlotsQuery {
    pub therapist_id: Uuid,
    pub date: String,
    pub duration_minutes: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub date: Option<NaiveDate>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Patients only ever see their own sessions.
fn visible_to(principal: &Principal, sessions: Vec<Session>) -> Vec<Session> {
    if principal.is_admin() {
        return sessions;
    }
    let own = principal.role.patient_id();
    sessions.into_iter().filter(|s| Some(s.patient_id) == own).collect()
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[axum::debug_handler]
pub async fn book_session(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewSessionPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let session = state.engine.book_payload(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(json!(session))))
}

#[axum::debug_handler]
pub async fn check_slot(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<CheckSlotQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&query.date)?;
    let start = ClockTime::parse(&query.start_time).map_err(SessionError::from)?;
    let end = ClockTime::parse(&query.end_time).map_err(SessionError::from)?;

    let check = state
        .engine
        .check_slot(query.therapist_id, date, start, end, query.exclude_session_id)
        .await?;

    // Conflicting sessions carry other patients' names.
    if principal.is_admin() {
        return Ok(Json(json!(check)));
    }

    Ok(Json(json!({
        "open": check.open,
        "within_availability": check.within_availability,
        "conflicts": check.conflicts.len()
    })))
}

#[axum::debug_handler]
pub async fn open_slots(
    State(state): State<Arc<SessionCellState>>,
    Extension(_principal): Extension<Principal>,
    Query(query): Query<OpenSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&query.date)?;
    let duration = query.duration_minutes.unwrap_or(state.default_slot_minutes);

    let slots = state.engine.open_slots(query.therapist_id, date, duration).await?;

    Ok(Json(json!({
        "therapist_id": query.therapist_id,
        "date": date,
        "duration_minutes": duration,
        "slots": slots
    })))
}

// ==============================================================================
// CALENDAR QUERIES
// ==============================================================================

#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<Value>, AppError> {
    let sessions = if let Some(patient_id) = query.patient_id {
        principal.require_patient_access(patient_id)?;
        state.queries.list_by_patient(patient_id).await?
    } else if let Some(date) = query.date {
        state.queries.list_by_date(date).await?
    } else if let (Some(from), Some(to)) = (query.from, query.to) {
        state.queries.list_by_date_range(from, to).await?
    } else if let Some(therapist_id) = query.therapist_id {
        state.queries.list_by_therapist(therapist_id).await?
    } else if let Some(own) = principal.role.patient_id() {
        state.queries.list_by_patient(own).await?
    } else {
        state.queries.today(today()).await?
    };

    let sessions = visible_to(&principal, sessions);

    Ok(Json(json!({
        "sessions": sessions,
        "total": sessions.len()
    })))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.queries.get(session_id).await?;
    principal.require_patient_access(session.patient_id)?;

    Ok(Json(json!(session)))
}

#[axum::debug_handler]
pub async fn dashboard_stats(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let reference = query.date.unwrap_or_else(today);
    let stats = state.queries.dashboard_stats(reference).await?;

    Ok(Json(json!({
        "date": reference,
        "stats": stats
    })))
}

// ==============================================================================
// LIFECYCLE (ADMIN)
// ==============================================================================

#[axum::debug_handler]
pub async fn change_status(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let session = state.lifecycle.change_status(session_id, request.status).await?;
    Ok(Json(json!(session)))
}

#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require_admin()?;

    state.lifecycle.delete_session(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn reconcile_patient(
    State(state): State<Arc<SessionCellState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    principal.require_admin()?;

    let balance = state.lifecycle.reconcile_used_sessions(patient_id).await?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "balance": balance
    })))
}
