use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::{StoreError, StoreResult};

use super::{reclaims_slot, sort_sessions, SessionStore, StatusUpdate};
use crate::models::{Session, SessionStatus};
use crate::services::conflict;

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<Session>
    where
        F: Fn(&Session) -> bool,
    {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| predicate(s))
            .cloned()
            .collect();
        sort_sessions(&mut sessions);
        sessions
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn list_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Session>> {
        Ok(self.filtered(|s| s.date == date).await)
    }

    async fn list_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Session>> {
        Ok(self.filtered(|s| from <= s.date && s.date <= to).await)
    }

    async fn list_by_therapist(&self, therapist_id: Uuid) -> StoreResult<Vec<Session>> {
        Ok(self.filtered(|s| s.therapist_id == therapist_id).await)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Session>> {
        Ok(self.filtered(|s| s.patient_id == patient_id).await)
    }

    async fn list_for_therapist_on(&self, therapist_id: Uuid, date: NaiveDate) -> StoreResult<Vec<Session>> {
        Ok(self
            .filtered(|s| s.therapist_id == therapist_id && s.date == date)
            .await)
    }

    async fn insert_if_free(&self, session: &Session) -> StoreResult<Option<Session>> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict(format!("session {} already exists", session.id)));
        }

        let same_day: Vec<Session> = sessions
            .values()
            .filter(|s| s.therapist_id == session.therapist_id && s.date == session.date)
            .cloned()
            .collect();
        if conflict::has_conflict(&same_day, session.start_time, session.end_time) {
            return Ok(None);
        }

        sessions.insert(session.id, session.clone());
        Ok(Some(session.clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<StatusUpdate> {
        let mut sessions = self.sessions.write().await;

        let Some(current) = sessions.get(&id) else {
            return Ok(StatusUpdate::NotFound);
        };
        let previous = current.status;

        if reclaims_slot(previous, status) {
            let same_day: Vec<Session> = sessions
                .values()
                .filter(|s| s.id != id && s.therapist_id == current.therapist_id && s.date == current.date)
                .cloned()
                .collect();
            if conflict::has_conflict(&same_day, current.start_time, current.end_time) {
                return Ok(StatusUpdate::SlotTaken);
            }
        }

        let Some(session) = sessions.get_mut(&id) else {
            return Ok(StatusUpdate::NotFound);
        };
        session.status = status;
        session.updated_at = updated_at;
        Ok(StatusUpdate::Updated {
            previous,
            session: session.clone(),
        })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.sessions.write().await.remove(&id))
    }
}
