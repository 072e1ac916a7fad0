use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_database::{StoreError, StoreResult, SupabaseClient};

use super::PatientStore;
use crate::models::Patient;

pub struct SupabasePatientStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePatientStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl PatientStore for SupabasePatientStore {
    async fn list(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.supabase.select("/rest/v1/patients?order=name.asc").await?)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?id=eq.{}", id);
        let rows: Vec<Patient> = self.supabase.select(&path).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?email=eq.{}&limit=1", urlencoding::encode(email));
        let rows: Vec<Patient> = self.supabase.select(&path).await?;
        Ok(rows.into_iter().next())
    }

    async fn create(&self, patient: &Patient) -> StoreResult<Patient> {
        debug!("Inserting patient {}", patient.id);

        let rows: Vec<Patient> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/patients", Some(serde_json::to_value(patient)?))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no patient row".to_string()))
    }

    /// Profile fields only. The usage counter and history move through their
    /// own atomic operations.
    async fn update(&self, patient: &Patient) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient.id);
        let body = json!({
            "name": patient.name,
            "email": patient.email,
            "phone": patient.phone,
            "notes": patient.notes,
            "total_sessions": patient.total_sessions,
            "crm_patient_id": patient.crm_patient_id,
        });

        let rows: Vec<Patient> = self.supabase.write_returning(Method::PATCH, &path, Some(body)).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let path = format!("/rest/v1/patients?id=eq.{}", id);
        let rows: Vec<Patient> = self.supabase.write_returning(Method::DELETE, &path, None).await?;
        Ok(!rows.is_empty())
    }

    async fn adjust_used(&self, id: Uuid, delta: i32) -> StoreResult<Option<Patient>> {
        debug!("Adjusting used sessions for patient {} by {}", id, delta);

        let rows: Vec<Patient> = self
            .supabase
            .rpc("adjust_used_sessions", json!({ "p_patient_id": id, "p_delta": delta }))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn set_used(&self, id: Uuid, used_sessions: i32) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?id=eq.{}", id);
        let body = json!({ "used_sessions": used_sessions.max(0) });

        let rows: Vec<Patient> = self.supabase.write_returning(Method::PATCH, &path, Some(body)).await?;
        Ok(rows.into_iter().next())
    }

    async fn append_history(&self, id: Uuid, session_id: Uuid) -> StoreResult<Option<Patient>> {
        let rows: Vec<Patient> = self
            .supabase
            .rpc(
                "append_session_history",
                json!({ "p_patient_id": id, "p_session_id": session_id }),
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}
