use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use patient_cell::{PatientError, PatientService};
use shared_config::AppConfig;
use shared_database::StoreError;
use shared_models::auth::{Principal, User};

use crate::models::{AuthError, RoleKind, UserRoleRecord};
use crate::services::store::UserRoleStore;

/// Maps a validated identity to its clinic role, creating the user-role record
/// on first sign-in.
pub struct RoleResolver {
    config: Arc<AppConfig>,
    users: Arc<dyn UserRoleStore>,
    patients: PatientService,
}

impl RoleResolver {
    pub fn new(config: Arc<AppConfig>, users: Arc<dyn UserRoleStore>, patients: PatientService) -> Self {
        Self {
            config,
            users,
            patients,
        }
    }

    pub async fn principal_for(&self, user: &User) -> Result<Principal, AuthError> {
        let email = user.email.as_deref().unwrap_or_default();
        Ok(self.ensure_user(&user.id, email).await?.principal())
    }

    /// Allow-listed emails become admins. Everyone else is a patient, linked
    /// to the patient record carrying the same email when one exists.
    pub async fn ensure_user(&self, uid: &str, email: &str) -> Result<UserRoleRecord, AuthError> {
        if let Some(record) = self.users.get(uid).await? {
            return self.relink_if_unlinked(record).await;
        }

        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }

        let record = if self.config.is_admin_email(&email) {
            UserRoleRecord {
                uid: uid.to_string(),
                email,
                role: RoleKind::Admin,
                patient_id: None,
                created_at: Utc::now(),
            }
        } else {
            let patient_id = self.patients.find_by_email(&email).await?.map(|p| p.id);
            UserRoleRecord {
                uid: uid.to_string(),
                email,
                role: RoleKind::Patient,
                patient_id,
                created_at: Utc::now(),
            }
        };

        match self.users.create(&record).await {
            Ok(created) => {
                info!(
                    "User {} registered as {:?} (patient link: {:?})",
                    created.uid, created.role, created.patient_id
                );
                Ok(created)
            }
            // A concurrent first request created it already.
            Err(StoreError::Conflict(_)) => self
                .users
                .get(uid)
                .await?
                .ok_or_else(|| AuthError::UserNotFound(uid.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn link_user_to_patient(&self, uid: &str, patient_id: Uuid) -> Result<UserRoleRecord, AuthError> {
        match self.patients.get_patient(patient_id).await {
            Ok(_) => {}
            Err(PatientError::NotFound(_)) => return Err(AuthError::PatientNotFound(patient_id)),
            Err(e) => return Err(e.into()),
        }

        let record = self
            .users
            .set_patient(uid, patient_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(uid.to_string()))?;

        info!("User {} linked to patient {}", uid, patient_id);
        Ok(record)
    }

    /// Patients created after their owner signed up are picked up on the next request.
    async fn relink_if_unlinked(&self, record: UserRoleRecord) -> Result<UserRoleRecord, AuthError> {
        if record.role != RoleKind::Patient || record.patient_id.is_some() {
            return Ok(record);
        }

        match self.patients.find_by_email(&record.email).await? {
            Some(patient) => {
                debug!("Linking user {} to patient {} by email", record.uid, patient.id);
                Ok(self
                    .users
                    .set_patient(&record.uid, patient.id)
                    .await?
                    .unwrap_or(record))
            }
            None => Ok(record),
        }
    }
}
