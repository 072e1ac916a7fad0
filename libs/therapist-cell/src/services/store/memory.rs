// libs/therapist-cell/src/services/store/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::{StoreError, StoreResult};

use super::{sort_windows, AvailabilityStore, TherapistStore};
use crate::models::{AvailabilityWindow, Therapist};

#[derive(Default)]
pub struct InMemoryTherapistStore {
    therapists: RwLock<HashMap<Uuid, Therapist>>,
}

impl InMemoryTherapistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TherapistStore for InMemoryTherapistStore {
    async fn list(&self) -> StoreResult<Vec<Therapist>> {
        let mut therapists: Vec<Therapist> = self.therapists.read().await.values().cloned().collect();
        therapists.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(therapists)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Therapist>> {
        Ok(self.therapists.read().await.get(&id).cloned())
    }

    async fn create(&self, therapist: &Therapist) -> StoreResult<Therapist> {
        let mut therapists = self.therapists.write().await;
        if therapists.contains_key(&therapist.id) {
            return Err(StoreError::Conflict(format!("therapist {} already exists", therapist.id)));
        }
        therapists.insert(therapist.id, therapist.clone());
        Ok(therapist.clone())
    }

    async fn update(&self, therapist: &Therapist) -> StoreResult<Option<Therapist>> {
        let mut therapists = self.therapists.write().await;
        match therapists.get_mut(&therapist.id) {
            Some(existing) => {
                *existing = therapist.clone();
                Ok(Some(therapist.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.therapists.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryAvailabilityStore {
    windows: RwLock<HashMap<Uuid, AvailabilityWindow>>,
}

impl InMemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn list_windows(&self, therapist_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>> {
        let mut windows: Vec<AvailabilityWindow> = self
            .windows
            .read()
            .await
            .values()
            .filter(|w| w.therapist_id == therapist_id)
            .cloned()
            .collect();
        sort_windows(&mut windows);
        Ok(windows)
    }

    async fn list_all_windows(&self) -> StoreResult<Vec<AvailabilityWindow>> {
        let mut windows: Vec<AvailabilityWindow> = self.windows.read().await.values().cloned().collect();
        sort_windows(&mut windows);
        Ok(windows)
    }

    async fn get_window(&self, id: Uuid) -> StoreResult<Option<AvailabilityWindow>> {
        Ok(self.windows.read().await.get(&id).cloned())
    }

    async fn create_window(&self, window: &AvailabilityWindow) -> StoreResult<AvailabilityWindow> {
        let mut windows = self.windows.write().await;
        if windows.contains_key(&window.id) {
            return Err(StoreError::Conflict(format!("window {} already exists", window.id)));
        }
        windows.insert(window.id, window.clone());
        Ok(window.clone())
    }

    async fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<Option<AvailabilityWindow>> {
        let mut windows = self.windows.write().await;
        match windows.get_mut(&window.id) {
            Some(existing) => {
                *existing = window.clone();
                Ok(Some(window.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_window(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.windows.write().await.remove(&id).is_some())
    }

    async fn delete_all_windows_for(&self, therapist_id: Uuid) -> StoreResult<usize> {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, w| w.therapist_id != therapist_id);
        Ok(before - windows.len())
    }
}
