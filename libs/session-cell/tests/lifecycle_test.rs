mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use uuid::Uuid;

use common::{admin, clinic, monday, request};
use session_cell::{SessionError, SessionStatus, SessionStore};
use shared_config::CompletedDeletionPolicy;

async fn used(clinic: &common::Clinic) -> i32 {
    clinic.balance.balance(clinic.patient_id).await.unwrap().used
}

#[tokio::test]
async fn completing_and_reopening_round_trips_the_counter() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let session = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();

    clinic.lifecycle.complete(session.id).await.unwrap();
    assert_eq!(used(&clinic).await, 1);

    // Completing twice does not double count.
    clinic.lifecycle.complete(session.id).await.unwrap();
    assert_eq!(used(&clinic).await, 1);

    let reopened = clinic.lifecycle.reschedule_to_scheduled(session.id).await.unwrap();
    assert_eq!(reopened.status, SessionStatus::Scheduled);
    assert_eq!(used(&clinic).await, 0);
}

#[tokio::test]
async fn cancel_and_no_show_leave_counter_alone() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let a = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    let b = clinic.engine.book(&admin(), request(&clinic, "10:00", "11:00")).await.unwrap();

    clinic.lifecycle.cancel(a.id).await.unwrap();
    clinic.lifecycle.mark_no_show(b.id).await.unwrap();
    assert_eq!(used(&clinic).await, 0);

    // no-show -> completed counts, completed -> cancelled gives it back.
    clinic.lifecycle.complete(b.id).await.unwrap();
    assert_eq!(used(&clinic).await, 1);
    clinic.lifecycle.cancel(b.id).await.unwrap();
    assert_eq!(used(&clinic).await, 0);
}

#[tokio::test]
async fn counter_never_goes_negative() {
    let clinic = clinic(20, CompletedDeletionPolicy::Compensate).await;
    let session = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();

    clinic.lifecycle.complete(session.id).await.unwrap();
    clinic.balance.set_used(clinic.patient_id, 0).await.unwrap();
    clinic.lifecycle.cancel(session.id).await.unwrap();

    assert_eq!(used(&clinic).await, 0);
}

#[tokio::test]
async fn uncancelling_into_a_rebooked_slot_conflicts() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let a = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    clinic.lifecycle.cancel(a.id).await.unwrap();
    let b = clinic.engine.book(&admin(), request(&clinic, "09:30", "10:30")).await.unwrap();

    assert_matches!(
        clinic.lifecycle.reschedule_to_scheduled(a.id).await,
        Err(SessionError::SlotConflict)
    );
    assert_matches!(clinic.lifecycle.complete(a.id).await, Err(SessionError::SlotConflict));

    let a = clinic.sessions.get(a.id).await.unwrap().unwrap();
    assert_eq!(a.status, SessionStatus::Cancelled);
    let live: Vec<_> = clinic
        .sessions
        .list_for_therapist_on(clinic.therapist_id, monday())
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.holds_slot())
        .collect();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, b.id);
    assert_eq!(used(&clinic).await, 0);
}

#[tokio::test]
async fn uncancelling_into_a_free_slot_succeeds() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let a = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    clinic.lifecycle.cancel(a.id).await.unwrap();
    // Back-to-back with the cancelled slot is not an overlap.
    clinic.engine.book(&admin(), request(&clinic, "10:00", "11:00")).await.unwrap();

    let restored = clinic.lifecycle.reschedule_to_scheduled(a.id).await.unwrap();
    assert_eq!(restored.status, SessionStatus::Scheduled);

    // Cancelled to cancelled never needs a free slot.
    clinic.lifecycle.cancel(a.id).await.unwrap();
    clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    assert_eq!(clinic.lifecycle.cancel(a.id).await.unwrap().status, SessionStatus::Cancelled);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;

    assert_matches!(
        clinic.lifecycle.complete(Uuid::new_v4()).await,
        Err(SessionError::SessionNotFound(_))
    );
    assert_matches!(
        clinic.lifecycle.delete_session(Uuid::new_v4()).await,
        Err(SessionError::SessionNotFound(_))
    );
}

#[tokio::test]
async fn status_change_on_deleted_patient_is_skipped() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let session = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();

    clinic.patients.delete_patient(clinic.patient_id).await.unwrap();

    let completed = clinic.lifecycle.complete(session.id).await.unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
}

#[tokio::test]
async fn deleting_completed_session_keeps_counter_by_default() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let session = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    clinic.lifecycle.complete(session.id).await.unwrap();

    clinic.lifecycle.delete_session(session.id).await.unwrap();

    assert_eq!(used(&clinic).await, 1);
    assert!(clinic.sessions.get(session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn compensating_policy_returns_deleted_completed_session() {
    let clinic = clinic(20, CompletedDeletionPolicy::Compensate).await;
    let done = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    let open = clinic.engine.book(&admin(), request(&clinic, "10:00", "11:00")).await.unwrap();
    clinic.lifecycle.complete(done.id).await.unwrap();

    clinic.lifecycle.delete_session(done.id).await.unwrap();
    assert_eq!(used(&clinic).await, 0);

    // Scheduled sessions never touched the counter.
    clinic.lifecycle.delete_session(open.id).await.unwrap();
    assert_eq!(used(&clinic).await, 0);
}

#[tokio::test]
async fn reconcile_recounts_completed_sessions() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let a = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    let b = clinic.engine.book(&admin(), request(&clinic, "10:00", "11:00")).await.unwrap();
    clinic.lifecycle.complete(a.id).await.unwrap();
    clinic.lifecycle.complete(b.id).await.unwrap();

    // Drift introduced by a deletion under the default policy.
    clinic.lifecycle.delete_session(b.id).await.unwrap();
    assert_eq!(used(&clinic).await, 2);

    let balance = clinic.lifecycle.reconcile_used_sessions(clinic.patient_id).await.unwrap();

    assert_eq!(balance.used, 1);
    assert_eq!(balance.remaining, 19);
}

#[tokio::test]
async fn dashboard_counts_by_period() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;
    let a = clinic.engine.book(&admin(), request(&clinic, "09:00", "10:00")).await.unwrap();
    let b = clinic.engine.book(&admin(), request(&clinic, "10:00", "11:00")).await.unwrap();
    let mut next_week = request(&clinic, "09:00", "10:00");
    next_week.date = monday() + Duration::days(7);
    let c = clinic.engine.book(&admin(), next_week).await.unwrap();

    clinic.lifecycle.complete(a.id).await.unwrap();
    clinic.lifecycle.cancel(b.id).await.unwrap();
    clinic.lifecycle.complete(c.id).await.unwrap();

    let stats = clinic.queries.dashboard_stats(monday()).await.unwrap();

    assert_eq!(stats.today_sessions, 1);
    assert_eq!(stats.today_completed, 1);
    assert_eq!(stats.week_sessions, 1);
    assert_eq!(stats.month_completed, 2);
}

#[tokio::test]
async fn reversed_range_is_rejected() {
    let clinic = clinic(20, CompletedDeletionPolicy::Keep).await;

    assert_matches!(
        clinic.queries.list_by_date_range(monday(), monday() - Duration::days(1)).await,
        Err(SessionError::ValidationError(_))
    );
}
