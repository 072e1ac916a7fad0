// libs/therapist-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::clock::{ClockTime, MalformedTimeError};
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Therapist {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    /// Calendar display colour, e.g. `#0f766e`.
    pub color: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTherapistRequest {
    pub name: String,
    pub specialization: String,
    pub color: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTherapistRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub color: Option<String>,
    pub avatar_url: Option<String>,
}

/// A recurring weekly window during which a therapist accepts bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub therapist_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub is_active: bool,
}

impl AvailabilityWindow {
    pub fn new(therapist_id: Uuid, day_of_week: u8, start_time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            therapist_id,
            day_of_week,
            start_time,
            end_time,
            is_active: true,
        }
    }

    /// Inclusive on both ends: a slot starting exactly at `end_time` is still covered.
    pub fn covers(&self, day_of_week: u8, slot_start: ClockTime) -> bool {
        self.is_active
            && self.day_of_week == day_of_week
            && self.start_time <= slot_start
            && slot_start <= self.end_time
    }

    pub fn validate(&self) -> Result<(), TherapistError> {
        if self.day_of_week > 6 {
            return Err(TherapistError::InvalidWindow(
                "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ));
        }
        if self.start_time >= self.end_time {
            return Err(TherapistError::InvalidWindow(
                "Start time must be before end time".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub day_of_week: Option<u8>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: Option<bool>,
}

/// A fixed-duration candidate booking interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    pub therapists_created: usize,
    pub windows_created: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TherapistError {
    #[error("Therapist not found: {0}")]
    NotFound(Uuid),

    #[error("Availability window not found: {0}")]
    WindowNotFound(Uuid),

    #[error("Invalid availability window: {0}")]
    InvalidWindow(String),

    #[error(transparent)]
    MalformedTime(#[from] MalformedTimeError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TherapistError> for AppError {
    fn from(err: TherapistError) -> Self {
        match err {
            TherapistError::NotFound(_) | TherapistError::WindowNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            TherapistError::InvalidWindow(_)
            | TherapistError::MalformedTime(_)
            | TherapistError::ValidationError(_) => AppError::ValidationError(err.to_string()),
            TherapistError::Store(StoreError::NotFound(msg)) => AppError::NotFound(msg),
            TherapistError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            TherapistError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
