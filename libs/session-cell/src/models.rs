// libs/session-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use patient_cell::PatientError;
use shared_database::StoreError;
use shared_models::clock::{ranges_overlap, ClockTime, MalformedTimeError};
use shared_models::error::AppError;
use therapist_cell::TherapistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "no-show")]
    NoShow,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no-show",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "no-show" => Ok(SessionStatus::NoShow),
            other => Err(SessionError::ValidationError(format!("Unknown session status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Snapshot taken at booking time; later renames do not propagate.
    pub patient_name: String,
    pub therapist_id: Uuid,
    pub therapist_name: String,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Cancelled sessions free their slot; every other status holds it.
    pub fn holds_slot(&self) -> bool {
        self.status != SessionStatus::Cancelled
    }

    pub fn overlaps(&self, start: ClockTime, end: ClockTime) -> bool {
        ranges_overlap(self.start_time, self.end_time, start, end)
    }
}

/// Raw booking input as it arrives over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionPayload {
    pub patient_id: Uuid,
    pub therapist_id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
}

/// A validated booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub therapist_id: Uuid,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub notes: Option<String>,
}

impl TryFrom<NewSessionPayload> for BookingRequest {
    type Error = SessionError;

    fn try_from(payload: NewSessionPayload) -> Result<Self, Self::Error> {
        let date = parse_date(&payload.date)?;
        let start_time = ClockTime::parse(&payload.start_time)?;
        let end_time = ClockTime::parse(&payload.end_time)?;
        ensure_time_range(start_time, end_time)?;

        Ok(Self {
            patient_id: payload.patient_id,
            therapist_id: payload.therapist_id,
            date,
            start_time,
            end_time,
            notes: payload.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, SessionError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| SessionError::InvalidDate(input.to_string()))
}

pub fn ensure_time_range(start: ClockTime, end: ClockTime) -> Result<(), SessionError> {
    if start >= end {
        return Err(SessionError::InvalidTimeRange { start, end });
    }
    Ok(())
}

/// Read-only answer to "can this range be booked", for the calendar UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCheck {
    pub open: bool,
    pub within_availability: bool,
    pub conflicts: Vec<Session>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub today_sessions: usize,
    pub today_completed: usize,
    pub week_sessions: usize,
    pub month_completed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: SessionStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    MalformedTime(#[from] MalformedTimeError),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start time {start} must be before end time {end}")]
    InvalidTimeRange { start: ClockTime, end: ClockTime },

    #[error("Therapist {therapist_id} is not available on {date} at {start_time}")]
    SlotNotAvailable {
        therapist_id: Uuid,
        date: NaiveDate,
        start_time: ClockTime,
    },

    #[error("Requested time overlaps an existing session")]
    SlotConflict,

    #[error("Session package exhausted for patient {patient_id} ({remaining} remaining)")]
    PackageExhausted { patient_id: Uuid, remaining: i32 },

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Therapist not found: {0}")]
    TherapistNotFound(Uuid),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TherapistError> for SessionError {
    fn from(err: TherapistError) -> Self {
        match err {
            TherapistError::NotFound(id) => SessionError::TherapistNotFound(id),
            TherapistError::MalformedTime(e) => SessionError::MalformedTime(e),
            TherapistError::Store(e) => SessionError::Store(e),
            other => SessionError::ValidationError(other.to_string()),
        }
    }
}

impl From<PatientError> for SessionError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(id) => SessionError::PatientNotFound(id),
            PatientError::Store(e) => SessionError::Store(e),
            other => SessionError::ValidationError(other.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MalformedTime(_)
            | SessionError::InvalidDate(_)
            | SessionError::InvalidTimeRange { .. } => AppError::BadRequest(err.to_string()),
            SessionError::SlotNotAvailable { .. } | SessionError::SlotConflict => AppError::Conflict(err.to_string()),
            SessionError::PackageExhausted { .. } | SessionError::ValidationError(_) => {
                AppError::ValidationError(err.to_string())
            }
            SessionError::SessionNotFound(_)
            | SessionError::TherapistNotFound(_)
            | SessionError::PatientNotFound(_) => AppError::NotFound(err.to_string()),
            SessionError::Forbidden(msg) => AppError::Forbidden(msg),
            SessionError::Store(StoreError::NotFound(msg)) => AppError::NotFound(msg),
            SessionError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            SessionError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
