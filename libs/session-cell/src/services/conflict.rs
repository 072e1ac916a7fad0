// libs/session-cell/src/services/conflict.rs
use uuid::Uuid;

use shared_models::clock::ClockTime;
use therapist_cell::TimeSlot;

use crate::models::Session;

/// Sessions in `existing` that hold their slot and overlap `[start, end)`.
/// Callers pass the sessions of a single therapist on a single date.
pub fn find_conflicts<'a>(
    existing: &'a [Session],
    start: ClockTime,
    end: ClockTime,
    exclude_session_id: Option<Uuid>,
) -> Vec<&'a Session> {
    existing
        .iter()
        .filter(|s| Some(s.id) != exclude_session_id)
        .filter(|s| s.holds_slot() && s.overlaps(start, end))
        .collect()
}

pub fn has_conflict(existing: &[Session], start: ClockTime, end: ClockTime) -> bool {
    !find_conflicts(existing, start, end, None).is_empty()
}

/// Drop candidate slots already taken by a non-cancelled session.
pub fn remove_booked(slots: Vec<TimeSlot>, existing: &[Session]) -> Vec<TimeSlot> {
    slots
        .into_iter()
        .filter(|slot| !has_conflict(existing, slot.start_time, slot.end_time))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionStatus;
    use chrono::{NaiveDate, Utc};

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    fn session(start: &str, end: &str, status: SessionStatus) -> Session {
        Session {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "Anna".to_string(),
            therapist_id: Uuid::new_v4(),
            therapist_name: "Natalia".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            start_time: t(start),
            end_time: t(end),
            status,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn detects_all_overlap_shapes() {
        let existing = vec![session("09:30", "10:30", SessionStatus::Scheduled)];

        // New start inside existing.
        assert!(has_conflict(&existing, t("10:00"), t("11:00")));
        // New end inside existing.
        assert!(has_conflict(&existing, t("09:00"), t("10:00")));
        // New range contains existing.
        assert!(has_conflict(&existing, t("09:00"), t("11:00")));
        // Touching ranges do not conflict.
        assert!(!has_conflict(&existing, t("10:30"), t("11:30")));
        assert!(!has_conflict(&existing, t("08:30"), t("09:30")));
    }

    #[test]
    fn cancelled_and_excluded_sessions_are_ignored() {
        let cancelled = session("09:00", "10:00", SessionStatus::Cancelled);
        let completed = session("11:00", "12:00", SessionStatus::Completed);
        let existing = vec![cancelled, completed.clone()];

        assert!(!has_conflict(&existing, t("09:00"), t("10:00")));
        assert!(has_conflict(&existing, t("11:00"), t("12:00")));
        assert!(find_conflicts(&existing, t("11:00"), t("12:00"), Some(completed.id)).is_empty());
    }

    #[test]
    fn booked_slots_are_removed() {
        let slots = vec![
            TimeSlot { start_time: t("09:00"), end_time: t("10:00") },
            TimeSlot { start_time: t("10:00"), end_time: t("11:00") },
            TimeSlot { start_time: t("11:00"), end_time: t("12:00") },
        ];
        let existing = vec![session("10:00", "11:00", SessionStatus::NoShow)];

        let open = remove_booked(slots, &existing);

        assert_eq!(open.len(), 2);
        assert_eq!(open[1].start_time, t("11:00"));
    }
}
