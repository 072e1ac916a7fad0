use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use patient_cell::PatientError;
use shared_database::StoreError;
use shared_models::auth::{Principal, Role};
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Admin,
    Patient,
}

/// One row per signed-in identity, created on first sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRoleRecord {
    pub uid: String,
    pub email: String,
    pub role: RoleKind,
    pub patient_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UserRoleRecord {
    pub fn role(&self) -> Role {
        match self.role {
            RoleKind::Admin => Role::Admin,
            RoleKind::Patient => Role::Patient {
                patient_id: self.patient_id,
            },
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            uid: self.uid.clone(),
            email: self.email.clone(),
            role: self.role(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPatientRequest {
    pub patient_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Signed-in identity carries no email address")]
    MissingEmail,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingEmail => AppError::Auth(err.to_string()),
            AuthError::UserNotFound(_) | AuthError::PatientNotFound(_) => AppError::NotFound(err.to_string()),
            AuthError::Patient(e) => e.into(),
            AuthError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
