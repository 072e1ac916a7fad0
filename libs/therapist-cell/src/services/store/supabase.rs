// libs/therapist-cell/src/services/store/supabase.rs
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_database::{StoreError, StoreResult, SupabaseClient};

use super::{AvailabilityStore, TherapistStore};
use crate::models::{AvailabilityWindow, Therapist};

pub struct SupabaseTherapistStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseTherapistStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl TherapistStore for SupabaseTherapistStore {
    async fn list(&self) -> StoreResult<Vec<Therapist>> {
        Ok(self.supabase.select("/rest/v1/therapists?order=name.asc").await?)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Therapist>> {
        let path = format!("/rest/v1/therapists?id=eq.{}", id);
        let rows: Vec<Therapist> = self.supabase.select(&path).await?;
        Ok(rows.into_iter().next())
    }

    async fn create(&self, therapist: &Therapist) -> StoreResult<Therapist> {
        debug!("Inserting therapist {}", therapist.id);

        let rows: Vec<Therapist> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/therapists", Some(serde_json::to_value(therapist)?))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no therapist row".to_string()))
    }

    async fn update(&self, therapist: &Therapist) -> StoreResult<Option<Therapist>> {
        let path = format!("/rest/v1/therapists?id=eq.{}", therapist.id);
        let body = json!({
            "name": therapist.name,
            "specialization": therapist.specialization,
            "color": therapist.color,
            "avatar_url": therapist.avatar_url,
        });

        let rows: Vec<Therapist> = self.supabase.write_returning(Method::PATCH, &path, Some(body)).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let path = format!("/rest/v1/therapists?id=eq.{}", id);
        let rows: Vec<Therapist> = self.supabase.write_returning(Method::DELETE, &path, None).await?;
        Ok(!rows.is_empty())
    }
}

pub struct SupabaseAvailabilityStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAvailabilityStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AvailabilityStore for SupabaseAvailabilityStore {
    async fn list_windows(&self, therapist_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>> {
        let path = format!(
            "/rest/v1/availability?therapist_id=eq.{}&order=day_of_week.asc,start_time.asc",
            therapist_id
        );
        Ok(self.supabase.select(&path).await?)
    }

    async fn list_all_windows(&self) -> StoreResult<Vec<AvailabilityWindow>> {
        Ok(self
            .supabase
            .select("/rest/v1/availability?order=day_of_week.asc,start_time.asc")
            .await?)
    }

    async fn get_window(&self, id: Uuid) -> StoreResult<Option<AvailabilityWindow>> {
        let path = format!("/rest/v1/availability?id=eq.{}", id);
        let rows: Vec<AvailabilityWindow> = self.supabase.select(&path).await?;
        Ok(rows.into_iter().next())
    }

    async fn create_window(&self, window: &AvailabilityWindow) -> StoreResult<AvailabilityWindow> {
        debug!("Inserting availability window for therapist {}", window.therapist_id);

        let rows: Vec<AvailabilityWindow> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/availability", Some(serde_json::to_value(window)?))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no availability row".to_string()))
    }

    async fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<Option<AvailabilityWindow>> {
        let path = format!("/rest/v1/availability?id=eq.{}", window.id);
        let body = json!({
            "day_of_week": window.day_of_week,
            "start_time": window.start_time,
            "end_time": window.end_time,
            "is_active": window.is_active,
        });

        let rows: Vec<AvailabilityWindow> = self.supabase.write_returning(Method::PATCH, &path, Some(body)).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_window(&self, id: Uuid) -> StoreResult<bool> {
        let path = format!("/rest/v1/availability?id=eq.{}", id);
        let rows: Vec<AvailabilityWindow> = self.supabase.write_returning(Method::DELETE, &path, None).await?;
        Ok(!rows.is_empty())
    }

    async fn delete_all_windows_for(&self, therapist_id: Uuid) -> StoreResult<usize> {
        let path = format!("/rest/v1/availability?therapist_id=eq.{}", therapist_id);
        let rows: Vec<AvailabilityWindow> = self.supabase.write_returning(Method::DELETE, &path, None).await?;
        Ok(rows.len())
    }
}
