use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{PackageBalance, PackageSummary, Patient, PatientError};
use crate::services::store::PatientStore;

/// The only sanctioned mutator of `used_sessions`.
#[derive(Clone)]
pub struct PackageBalanceTracker {
    store: Arc<dyn PatientStore>,
}

impl PackageBalanceTracker {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }

    pub async fn balance(&self, patient_id: Uuid) -> Result<PackageBalance, PatientError> {
        self.store
            .get(patient_id)
            .await?
            .map(|p| p.balance())
            .ok_or(PatientError::NotFound(patient_id))
    }

    /// `None` when the patient no longer exists; the skip is logged.
    pub async fn increment_used(&self, patient_id: Uuid) -> Result<Option<Patient>, PatientError> {
        let updated = self.store.increment_used(patient_id).await?;
        log_adjustment(patient_id, "incremented", updated.as_ref());
        Ok(updated)
    }

    /// Floors at 0, so calling this on an unused package changes nothing.
    pub async fn decrement_used(&self, patient_id: Uuid) -> Result<Option<Patient>, PatientError> {
        let updated = self.store.decrement_used(patient_id).await?;
        log_adjustment(patient_id, "decremented", updated.as_ref());
        Ok(updated)
    }

    pub async fn set_used(&self, patient_id: Uuid, used_sessions: i32) -> Result<Patient, PatientError> {
        let updated = self
            .store
            .set_used(patient_id, used_sessions)
            .await?
            .ok_or(PatientError::NotFound(patient_id))?;

        info!("Used sessions for patient {} set to {}", patient_id, updated.used_sessions);
        Ok(updated)
    }

    pub async fn package_summary(&self) -> Result<PackageSummary, PatientError> {
        let patients = self.store.list().await?;
        let exhausted = patients.iter().filter(|p| p.balance().exhausted).count();

        Ok(PackageSummary {
            total_patients: patients.len(),
            active_packages: patients.len() - exhausted,
            exhausted_packages: exhausted,
        })
    }
}

fn log_adjustment(patient_id: Uuid, action: &str, updated: Option<&Patient>) {
    match updated {
        Some(patient) => debug!(
            "Used sessions {} for patient {}: now {}/{}",
            action, patient_id, patient.used_sessions, patient.total_sessions
        ),
        None => warn!("Skipping balance adjustment, patient {} not found", patient_id),
    }
}
