use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use uuid::Uuid;

use shared_database::{StoreError, StoreResult, SupabaseClient};

use super::UserRoleStore;
use crate::models::UserRoleRecord;

pub struct SupabaseUserRoleStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseUserRoleStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl UserRoleStore for SupabaseUserRoleStore {
    async fn get(&self, uid: &str) -> StoreResult<Option<UserRoleRecord>> {
        let path = format!("/rest/v1/users?uid=eq.{}", urlencoding::encode(uid));
        let rows: Vec<UserRoleRecord> = self.supabase.select(&path).await?;
        Ok(rows.into_iter().next())
    }

    async fn create(&self, record: &UserRoleRecord) -> StoreResult<UserRoleRecord> {
        let rows: Vec<UserRoleRecord> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/users", Some(serde_json::to_value(record)?))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no user row".to_string()))
    }

    async fn set_patient(&self, uid: &str, patient_id: Uuid) -> StoreResult<Option<UserRoleRecord>> {
        let path = format!("/rest/v1/users?uid=eq.{}", urlencoding::encode(uid));
        let rows: Vec<UserRoleRecord> = self
            .supabase
            .write_returning(Method::PATCH, &path, Some(json!({ "patient_id": patient_id })))
            .await?;
        Ok(rows.into_iter().next())
    }
}
