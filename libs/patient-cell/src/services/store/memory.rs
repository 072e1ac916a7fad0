use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::{StoreError, StoreResult};

use super::PatientStore;
use crate::models::Patient;

#[derive(Default)]
pub struct InMemoryPatientStore {
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn list(&self) -> StoreResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self.patients.read().await.values().cloned().collect();
        patients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(patients)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self.patients.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Patient>> {
        Ok(self
            .patients
            .read()
            .await
            .values()
            .find(|p| p.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create(&self, patient: &Patient) -> StoreResult<Patient> {
        let mut patients = self.patients.write().await;
        if patients.contains_key(&patient.id) {
            return Err(StoreError::Conflict(format!("patient {} already exists", patient.id)));
        }
        patients.insert(patient.id, patient.clone());
        Ok(patient.clone())
    }

    async fn update(&self, patient: &Patient) -> StoreResult<Option<Patient>> {
        let mut patients = self.patients.write().await;
        match patients.get_mut(&patient.id) {
            Some(existing) => {
                *existing = patient.clone();
                Ok(Some(patient.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.patients.write().await.remove(&id).is_some())
    }

    async fn adjust_used(&self, id: Uuid, delta: i32) -> StoreResult<Option<Patient>> {
        let mut patients = self.patients.write().await;
        Ok(patients.get_mut(&id).map(|patient| {
            patient.used_sessions = (patient.used_sessions + delta).max(0);
            patient.clone()
        }))
    }

    async fn set_used(&self, id: Uuid, used_sessions: i32) -> StoreResult<Option<Patient>> {
        let mut patients = self.patients.write().await;
        Ok(patients.get_mut(&id).map(|patient| {
            patient.used_sessions = used_sessions.max(0);
            patient.clone()
        }))
    }

    async fn append_history(&self, id: Uuid, session_id: Uuid) -> StoreResult<Option<Patient>> {
        let mut patients = self.patients.write().await;
        Ok(patients.get_mut(&id).map(|patient| {
            patient.sessions_history.push(session_id);
            patient.clone()
        }))
    }
}
