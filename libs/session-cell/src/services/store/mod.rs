use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared_database::StoreResult;

use crate::models::{Session, SessionStatus};

pub mod memory;
pub mod supabase;

pub use memory::InMemorySessionStore;
pub use supabase::SupabaseSessionStore;

/// Outcome of [`SessionStore::update_status`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    Updated { previous: SessionStatus, session: Session },
    /// The session was cancelled and its slot has since been booked.
    SlotTaken,
    NotFound,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Session>>;

    /// Every session on `date`, any status, ordered by start time.
    async fn list_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Session>>;

    /// Inclusive on both dates.
    async fn list_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Session>>;

    async fn list_by_therapist(&self, therapist_id: Uuid) -> StoreResult<Vec<Session>>;

    async fn list_by_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Session>>;

    async fn list_for_therapist_on(&self, therapist_id: Uuid, date: NaiveDate) -> StoreResult<Vec<Session>>;

    /// Insert unless a non-cancelled session of the same therapist on the same
    /// date overlaps it. The check and the write are one atomic step.
    /// `None` means the slot was taken.
    async fn insert_if_free(&self, session: &Session) -> StoreResult<Option<Session>>;

    /// Set the status and report the status it replaced, as observed by the
    /// same atomic step. Moving a cancelled session back to a slot-holding
    /// status re-checks overlap inside that step.
    async fn update_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<StatusUpdate>;

    /// Returns the removed session.
    async fn delete(&self, id: Uuid) -> StoreResult<Option<Session>>;
}

/// A move out of `cancelled` claims the slot again.
pub(crate) fn reclaims_slot(previous: SessionStatus, next: SessionStatus) -> bool {
    previous == SessionStatus::Cancelled && next != SessionStatus::Cancelled
}

pub(crate) fn sort_sessions(sessions: &mut [Session]) {
    sessions.sort_by_key(|s| (s.date, s.start_time));
}
