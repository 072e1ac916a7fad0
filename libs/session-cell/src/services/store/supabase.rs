use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{StoreError, StoreResult, SupabaseClient};

use super::{reclaims_slot, SessionStore, StatusUpdate};
use crate::models::{Session, SessionStatus};

const ORDER: &str = "order=date.asc,start_time.asc";

pub struct SupabaseSessionStore {
    supabase: Arc<SupabaseClient>,
    max_retry_attempts: u32,
}

impl SupabaseSessionStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            supabase,
            max_retry_attempts: 3,
        }
    }
}

#[async_trait]
impl SessionStore for SupabaseSessionStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let path = format!("/rest/v1/sessions?id=eq.{}", id);
        let rows: Vec<Session> = self.supabase.select(&path).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Session>> {
        let path = format!("/rest/v1/sessions?date=eq.{}&{}", date, ORDER);
        Ok(self.supabase.select(&path).await?)
    }

    async fn list_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Session>> {
        let path = format!("/rest/v1/sessions?date=gte.{}&date=lte.{}&{}", from, to, ORDER);
        Ok(self.supabase.select(&path).await?)
    }

    async fn list_by_therapist(&self, therapist_id: Uuid) -> StoreResult<Vec<Session>> {
        let path = format!("/rest/v1/sessions?therapist_id=eq.{}&{}", therapist_id, ORDER);
        Ok(self.supabase.select(&path).await?)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Session>> {
        let path = format!("/rest/v1/sessions?patient_id=eq.{}&{}", patient_id, ORDER);
        Ok(self.supabase.select(&path).await?)
    }

    async fn list_for_therapist_on(&self, therapist_id: Uuid, date: NaiveDate) -> StoreResult<Vec<Session>> {
        let path = format!(
            "/rest/v1/sessions?therapist_id=eq.{}&date=eq.{}&{}",
            therapist_id, date, ORDER
        );
        Ok(self.supabase.select(&path).await?)
    }

    /// Delegates to the `book_session` database function, which serialises
    /// bookings per therapist and day with an advisory lock.
    async fn insert_if_free(&self, session: &Session) -> StoreResult<Option<Session>> {
        debug!(
            "Booking session {} for therapist {} on {} {}-{}",
            session.id, session.therapist_id, session.date, session.start_time, session.end_time
        );

        let params = json!({
            "p_id": session.id,
            "p_patient_id": session.patient_id,
            "p_patient_name": session.patient_name,
            "p_therapist_id": session.therapist_id,
            "p_therapist_name": session.therapist_name,
            "p_date": session.date,
            "p_start_time": session.start_time,
            "p_end_time": session.end_time,
            "p_notes": session.notes,
            "p_created_at": session.created_at,
        });

        let rows: Vec<Session> = self.supabase.rpc("book_session", params).await?;
        Ok(rows.into_iter().next())
    }

    /// Compare-and-set on the previous status so the returned pair is exact
    /// even when another writer changes the same session in between. Leaving
    /// `cancelled` goes through `reactivate_session`, which re-checks overlap
    /// under the same lock as `book_session`.
    async fn update_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<StatusUpdate> {
        for attempt in 1..=self.max_retry_attempts {
            let Some(current) = self.get(id).await? else {
                return Ok(StatusUpdate::NotFound);
            };
            let previous = current.status;

            let reclaiming = reclaims_slot(previous, status);
            let rows: Vec<Session> = if reclaiming {
                let params = json!({
                    "p_id": id,
                    "p_status": status,
                    "p_updated_at": updated_at,
                });
                self.supabase.rpc("reactivate_session", params).await?
            } else {
                let path = format!("/rest/v1/sessions?id=eq.{}&status=eq.{}", id, previous);
                let body = json!({ "status": status, "updated_at": updated_at });
                self.supabase.write_returning(Method::PATCH, &path, Some(body)).await?
            };

            if let Some(session) = rows.into_iter().next() {
                return Ok(StatusUpdate::Updated { previous, session });
            }

            // No row back from the guarded path: either the slot is taken or
            // the session left `cancelled` meanwhile.
            if reclaiming {
                let still_cancelled = self
                    .get(id)
                    .await?
                    .is_some_and(|s| s.status == SessionStatus::Cancelled);
                if still_cancelled {
                    debug!("Session {} cannot be restored, its slot is taken", id);
                    return Ok(StatusUpdate::SlotTaken);
                }
            }

            warn!(
                "Session {} changed concurrently, retrying status update ({}/{})",
                id, attempt, self.max_retry_attempts
            );
        }

        Err(StoreError::Conflict(format!(
            "session {} kept changing during status update",
            id
        )))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let path = format!("/rest/v1/sessions?id=eq.{}", id);
        let rows: Vec<Session> = self.supabase.write_returning(Method::DELETE, &path, None).await?;
        Ok(rows.into_iter().next())
    }
}
