// libs/session-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use patient_cell::{PackageBalance, PackageBalanceTracker};
use shared_config::CompletedDeletionPolicy;

use crate::models::{Session, SessionError, SessionStatus};
use crate::services::store::{SessionStore, StatusUpdate};

/// What a status transition does to the patient's used-session counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceEffect {
    Increment,
    Decrement,
    Unchanged,
}

impl BalanceEffect {
    pub fn of(previous: SessionStatus, next: SessionStatus) -> Self {
        match (previous == SessionStatus::Completed, next == SessionStatus::Completed) {
            (false, true) => BalanceEffect::Increment,
            (true, false) => BalanceEffect::Decrement,
            _ => BalanceEffect::Unchanged,
        }
    }
}

#[derive(Clone)]
pub struct SessionLifecycleManager {
    sessions: Arc<dyn SessionStore>,
    balance: PackageBalanceTracker,
    deletion_policy: CompletedDeletionPolicy,
}

impl SessionLifecycleManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        balance: PackageBalanceTracker,
        deletion_policy: CompletedDeletionPolicy,
    ) -> Self {
        Self {
            sessions,
            balance,
            deletion_policy,
        }
    }

    /// Any status may move to any other; only moves into or out of
    /// `completed` touch the package. Leaving `cancelled` fails with
    /// `SlotConflict` when the slot has been booked since.
    pub async fn change_status(&self, session_id: Uuid, status: SessionStatus) -> Result<Session, SessionError> {
        let (previous, updated) = match self.sessions.update_status(session_id, status, Utc::now()).await? {
            StatusUpdate::Updated { previous, session } => (previous, session),
            StatusUpdate::SlotTaken => {
                warn!("Session {} cannot leave cancelled, its slot was rebooked", session_id);
                return Err(SessionError::SlotConflict);
            }
            StatusUpdate::NotFound => return Err(SessionError::SessionNotFound(session_id)),
        };

        self.apply(BalanceEffect::of(previous, status), updated.patient_id).await?;

        info!("Session {} moved from {} to {}", session_id, previous, status);
        Ok(updated)
    }

    pub async fn complete(&self, session_id: Uuid) -> Result<Session, SessionError> {
        self.change_status(session_id, SessionStatus::Completed).await
    }

    pub async fn cancel(&self, session_id: Uuid) -> Result<Session, SessionError> {
        self.change_status(session_id, SessionStatus::Cancelled).await
    }

    pub async fn mark_no_show(&self, session_id: Uuid) -> Result<Session, SessionError> {
        self.change_status(session_id, SessionStatus::NoShow).await
    }

    pub async fn reschedule_to_scheduled(&self, session_id: Uuid) -> Result<Session, SessionError> {
        self.change_status(session_id, SessionStatus::Scheduled).await
    }

    /// Remove the record outright. Whether a deleted `completed` session is
    /// given back to the package depends on the configured policy.
    pub async fn delete_session(&self, session_id: Uuid) -> Result<Session, SessionError> {
        let deleted = self
            .sessions
            .delete(session_id)
            .await?
            .ok_or(SessionError::SessionNotFound(session_id))?;

        if deleted.status == SessionStatus::Completed {
            match self.deletion_policy {
                CompletedDeletionPolicy::Keep => warn!(
                    "Deleted completed session {}; used sessions of patient {} left unchanged",
                    deleted.id, deleted.patient_id
                ),
                CompletedDeletionPolicy::Compensate => {
                    self.apply(BalanceEffect::Decrement, deleted.patient_id).await?;
                }
            }
        }

        info!("Session {} deleted", session_id);
        Ok(deleted)
    }

    /// Recount `used_sessions` from the patient's completed sessions.
    pub async fn reconcile_used_sessions(&self, patient_id: Uuid) -> Result<PackageBalance, SessionError> {
        let before = self.balance.balance(patient_id).await?;

        let completed = self
            .sessions
            .list_by_patient(patient_id)
            .await?
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .count();
        let completed = i32::try_from(completed)
            .map_err(|_| SessionError::ValidationError("Completed session count overflows".to_string()))?;

        let patient = self.balance.set_used(patient_id, completed).await?;
        if before.used != completed {
            warn!(
                "Reconciled patient {}: used sessions {} -> {}",
                patient_id, before.used, completed
            );
        }
        Ok(patient.balance())
    }

    async fn apply(&self, effect: BalanceEffect, patient_id: Uuid) -> Result<(), SessionError> {
        match effect {
            BalanceEffect::Increment => {
                self.balance.increment_used(patient_id).await?;
            }
            BalanceEffect::Decrement => {
                self.balance.decrement_used(patient_id).await?;
            }
            BalanceEffect::Unchanged => {}
        }
        Ok(())
    }
}
