use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{CreatePatientRequest, Patient, PatientError, UpdatePatientRequest};
use crate::services::store::PatientStore;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
    default_package_sessions: i32,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>, default_package_sessions: i32) -> Self {
        Self {
            store,
            default_package_sessions,
        }
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        self.store
            .get(patient_id)
            .await?
            .ok_or(PatientError::NotFound(patient_id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, PatientError> {
        Ok(self.store.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(PatientError::ValidationError("Patient name is required".to_string()));
        }

        let email = match request.email.as_deref().map(normalize_email) {
            Some(email) if email.is_empty() => None,
            other => other,
        };
        if let Some(email) = email.as_deref() {
            self.ensure_email_available(email, None).await?;
        }

        let total_sessions = request.total_sessions.unwrap_or(self.default_package_sessions);
        if total_sessions < 0 {
            return Err(PatientError::ValidationError(
                "Package size cannot be negative".to_string(),
            ));
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            phone: request.phone,
            notes: request.notes,
            total_sessions,
            used_sessions: 0,
            sessions_history: Vec::new(),
            crm_patient_id: request.crm_patient_id,
            created_at: Utc::now(),
        };

        let created = self.store.create(&patient).await?;
        info!("Patient {} created with a {} session package", created.id, created.total_sessions);
        Ok(created)
    }

    /// Admin edit. `total_sessions` may drop below `used_sessions`; the
    /// package then reads as exhausted.
    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        let mut patient = self.get_patient(patient_id).await?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(PatientError::ValidationError("Patient name is required".to_string()));
            }
            patient.name = name.trim().to_string();
        }
        if let Some(email) = request.email {
            let email = normalize_email(&email);
            if email.is_empty() {
                patient.email = None;
            } else {
                self.ensure_email_available(&email, Some(patient_id)).await?;
                patient.email = Some(email);
            }
        }
        if let Some(phone) = request.phone {
            patient.phone = Some(phone);
        }
        if let Some(notes) = request.notes {
            patient.notes = Some(notes);
        }
        if let Some(total) = request.total_sessions {
            if total < 0 {
                return Err(PatientError::ValidationError(
                    "Package size cannot be negative".to_string(),
                ));
            }
            if total < patient.used_sessions {
                warn!(
                    "Package for patient {} lowered to {} below {} used sessions",
                    patient_id, total, patient.used_sessions
                );
            }
            patient.total_sessions = total;
        }
        if let Some(crm_id) = request.crm_patient_id {
            patient.crm_patient_id = Some(crm_id);
        }

        self.store
            .update(&patient)
            .await?
            .ok_or(PatientError::NotFound(patient_id))
    }

    /// Irreversible. Sessions referencing the patient are kept.
    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        if !self.store.delete(patient_id).await? {
            return Err(PatientError::NotFound(patient_id));
        }
        info!("Patient {} deleted", patient_id);
        Ok(())
    }

    /// Record a booked session on the patient. Failures are logged only; the
    /// booking itself has already been committed.
    pub async fn append_history(&self, patient_id: Uuid, session_id: Uuid) {
        match self.store.append_history(patient_id, session_id).await {
            Ok(Some(_)) => debug!("Session {} added to history of patient {}", session_id, patient_id),
            Ok(None) => warn!("Patient {} vanished before session {} was recorded", patient_id, session_id),
            Err(e) => warn!("Failed to record session {} for patient {}: {}", session_id, patient_id, e),
        }
    }

    async fn ensure_email_available(&self, email: &str, own_id: Option<Uuid>) -> Result<(), PatientError> {
        if !is_valid_email(email) {
            return Err(PatientError::ValidationError(format!("Invalid email address: {}", email)));
        }

        match self.store.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != own_id => Err(PatientError::EmailAlreadyExists {
                email: email.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
        && email.len() <= 254
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("anna.kowalska@example.pl"));
        assert!(!is_valid_email("anna@"));
        assert!(!is_valid_email("not an email"));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Anna@Example.COM "), "anna@example.com");
    }
}
