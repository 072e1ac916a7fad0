use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::{StoreError, StoreResult};

use super::UserRoleStore;
use crate::models::UserRoleRecord;

#[derive(Default)]
pub struct InMemoryUserRoleStore {
    users: RwLock<HashMap<String, UserRoleRecord>>,
}

impl InMemoryUserRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRoleStore for InMemoryUserRoleStore {
    async fn get(&self, uid: &str) -> StoreResult<Option<UserRoleRecord>> {
        Ok(self.users.read().await.get(uid).cloned())
    }

    async fn create(&self, record: &UserRoleRecord) -> StoreResult<UserRoleRecord> {
        let mut users = self.users.write().await;
        if users.contains_key(&record.uid) {
            return Err(StoreError::Conflict(format!("user {} already exists", record.uid)));
        }
        users.insert(record.uid.clone(), record.clone());
        Ok(record.clone())
    }

    async fn set_patient(&self, uid: &str, patient_id: Uuid) -> StoreResult<Option<UserRoleRecord>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(uid).map(|record| {
            record.patient_id = Some(patient_id);
            record.clone()
        }))
    }
}
