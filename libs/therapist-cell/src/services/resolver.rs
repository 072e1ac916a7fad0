// libs/therapist-cell/src/services/resolver.rs
//! Pure availability arithmetic over a therapist's weekly windows.

use shared_models::clock::ClockTime;

use crate::models::{AvailabilityWindow, TimeSlot};

/// True when some active window on `day_of_week` contains `slot_start`.
/// Window ends are inclusive, so a 13:00 start is open in a 09:00-13:00 window.
pub fn is_slot_open(windows: &[AvailabilityWindow], day_of_week: u8, slot_start: ClockTime) -> bool {
    windows.iter().any(|w| w.covers(day_of_week, slot_start))
}

/// Walk every active window for the day in `slot_duration_minutes` steps,
/// emitting a slot only when it ends on or before the window end.
///
/// Overlapping windows produce duplicate slots; callers that care must dedupe.
pub fn enumerate_open_slots(
    windows: &[AvailabilityWindow],
    day_of_week: u8,
    slot_duration_minutes: u16,
) -> Vec<TimeSlot> {
    if slot_duration_minutes == 0 {
        return Vec::new();
    }

    let step = u32::from(slot_duration_minutes);
    let mut slots = Vec::new();

    for window in windows
        .iter()
        .filter(|w| w.is_active && w.day_of_week == day_of_week)
    {
        let end = u32::from(window.end_time.minutes());
        let mut current = u32::from(window.start_time.minutes());

        while current + step <= end {
            // Both bounds are <= window end, which is itself a valid clock time.
            if let (Some(start_time), Some(end_time)) = (
                ClockTime::from_minutes(current as u16),
                ClockTime::from_minutes((current + step) as u16),
            ) {
                slots.push(TimeSlot { start_time, end_time });
            }
            current += step;
        }
    }

    slots.sort_by_key(|slot| slot.start_time);
    slots
}
