use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Identity as supplied by the identity provider's signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Clinic role, resolved once per request from the user-role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    Patient { patient_id: Option<Uuid> },
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// The patient record a patient-role user is linked to, if any.
    pub fn patient_id(&self) -> Option<Uuid> {
        match self {
            Role::Admin => None,
            Role::Patient { patient_id } => *patient_id,
        }
    }

    /// Admins may act on any patient; patients only on their own linked record.
    pub fn can_act_for_patient(&self, patient_id: Uuid) -> bool {
        match self {
            Role::Admin => true,
            Role::Patient { patient_id: own } => *own == Some(patient_id),
        }
    }
}

/// The signed-in caller, passed explicitly to every core operation that
/// depends on who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
    #[serde(flatten)]
    pub role: Role,
}

impl Principal {
    pub fn admin(uid: &str, email: &str) -> Self {
        Self {
            uid: uid.to_string(),
            email: email.to_string(),
            role: Role::Admin,
        }
    }

    pub fn patient(uid: &str, email: &str, patient_id: Option<Uuid>) -> Self {
        Self {
            uid: uid.to_string(),
            email: email.to_string(),
            role: Role::Patient { patient_id },
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator role required".to_string()))
        }
    }

    pub fn require_patient_access(&self, patient_id: Uuid) -> Result<(), AppError> {
        if self.role.can_act_for_patient(patient_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not allowed to access this patient".to_string()))
        }
    }
}
