use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    /// Stored lower-cased so sign-in linkage can match exactly.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    /// Package size purchased by the patient.
    pub total_sessions: i32,
    /// Completed sessions counted against the package.
    pub used_sessions: i32,
    #[serde(default)]
    pub sessions_history: Vec<Uuid>,
    pub crm_patient_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn balance(&self) -> PackageBalance {
        PackageBalance::new(self.total_sessions, self.used_sessions)
    }
}

/// Remaining package balance. `remaining` is never clamped: an admin may lower
/// `total` below `used`, which reads as exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageBalance {
    pub total: i32,
    pub used: i32,
    pub remaining: i32,
    pub exhausted: bool,
}

impl PackageBalance {
    pub fn new(total: i32, used: i32) -> Self {
        let remaining = total - used;
        Self {
            total,
            used,
            remaining,
            exhausted: remaining <= 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub total_patients: usize,
    pub active_packages: usize,
    pub exhausted_packages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub total_sessions: Option<i32>,
    pub crm_patient_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub total_sessions: Option<i32>,
    pub crm_patient_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found: {0}")]
    NotFound(Uuid),

    #[error("Patient with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists { .. } => AppError::Conflict(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::Store(StoreError::NotFound(msg)) => AppError::NotFound(msg),
            PatientError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            PatientError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
