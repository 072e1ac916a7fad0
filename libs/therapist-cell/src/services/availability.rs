// libs/therapist-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::{ClinicSeed, WindowSeed};
use shared_models::clock::{day_of_week, ClockTime};

use crate::models::{
    AvailabilityWindow, CreateAvailabilityRequest, Therapist, TherapistError, TimeSlot,
    UpdateAvailabilityRequest,
};
use crate::services::resolver;
use crate::services::store::{AvailabilityStore, TherapistStore};

#[derive(Clone)]
pub struct AvailabilityService {
    therapists: Arc<dyn TherapistStore>,
    windows: Arc<dyn AvailabilityStore>,
}

impl AvailabilityService {
    pub fn new(therapists: Arc<dyn TherapistStore>, windows: Arc<dyn AvailabilityStore>) -> Self {
        Self { therapists, windows }
    }

    pub async fn list_windows(&self, therapist_id: Uuid) -> Result<Vec<AvailabilityWindow>, TherapistError> {
        debug!("Listing availability for therapist: {}", therapist_id);
        Ok(self.windows.list_windows(therapist_id).await?)
    }

    pub async fn list_all_windows(&self) -> Result<Vec<AvailabilityWindow>, TherapistError> {
        Ok(self.windows.list_all_windows().await?)
    }

    pub async fn create_window(
        &self,
        therapist_id: Uuid,
        request: CreateAvailabilityRequest,
    ) -> Result<AvailabilityWindow, TherapistError> {
        debug!("Creating availability for therapist: {}", therapist_id);

        if self.therapists.get(therapist_id).await?.is_none() {
            return Err(TherapistError::NotFound(therapist_id));
        }

        let mut window = AvailabilityWindow::new(
            therapist_id,
            request.day_of_week,
            ClockTime::parse(&request.start_time)?,
            ClockTime::parse(&request.end_time)?,
        );
        window.is_active = request.is_active.unwrap_or(true);
        window.validate()?;

        let created = self.windows.create_window(&window).await?;
        info!(
            "Availability window {} created for therapist {} (day {}, {}-{})",
            created.id, therapist_id, created.day_of_week, created.start_time, created.end_time
        );
        Ok(created)
    }

    /// Apply only the fields present in `patch`, then re-validate the result.
    pub async fn update_window(
        &self,
        window_id: Uuid,
        patch: UpdateAvailabilityRequest,
    ) -> Result<AvailabilityWindow, TherapistError> {
        debug!("Updating availability window: {}", window_id);

        let mut window = self
            .windows
            .get_window(window_id)
            .await?
            .ok_or(TherapistError::WindowNotFound(window_id))?;

        if let Some(day) = patch.day_of_week {
            window.day_of_week = day;
        }
        if let Some(start) = patch.start_time.as_deref() {
            window.start_time = ClockTime::parse(start)?;
        }
        if let Some(end) = patch.end_time.as_deref() {
            window.end_time = ClockTime::parse(end)?;
        }
        if let Some(active) = patch.is_active {
            window.is_active = active;
        }
        window.validate()?;

        self.windows
            .update_window(&window)
            .await?
            .ok_or(TherapistError::WindowNotFound(window_id))
    }

    pub async fn set_window_active(
        &self,
        window_id: Uuid,
        is_active: bool,
    ) -> Result<AvailabilityWindow, TherapistError> {
        self.update_window(
            window_id,
            UpdateAvailabilityRequest {
                is_active: Some(is_active),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_window(&self, window_id: Uuid) -> Result<(), TherapistError> {
        if !self.windows.delete_window(window_id).await? {
            return Err(TherapistError::WindowNotFound(window_id));
        }
        info!("Availability window {} deleted", window_id);
        Ok(())
    }

    /// Whether `slot_start` on `date` falls inside one of the therapist's active windows.
    pub async fn is_slot_open(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        slot_start: ClockTime,
    ) -> Result<bool, TherapistError> {
        let windows = self.windows.list_windows(therapist_id).await?;
        Ok(resolver::is_slot_open(&windows, day_of_week(date), slot_start))
    }

    /// Candidate slots from the weekly schedule alone. Booked sessions are not
    /// subtracted here.
    pub async fn slots_for_date(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        slot_duration_minutes: u16,
    ) -> Result<Vec<TimeSlot>, TherapistError> {
        let windows = self.windows.list_windows(therapist_id).await?;
        Ok(resolver::enumerate_open_slots(
            &windows,
            day_of_week(date),
            slot_duration_minutes,
        ))
    }

    /// Give a therapist without any windows the roster schedule matching their
    /// name. Returns how many windows were created.
    pub async fn ensure_default_schedule(
        &self,
        therapist: &Therapist,
        seed: &ClinicSeed,
    ) -> Result<usize, TherapistError> {
        if !self.windows.list_windows(therapist.id).await?.is_empty() {
            return Ok(0);
        }

        let Some(schedule) = seed.schedule_for(&therapist.name) else {
            return Ok(0);
        };

        let mut created = 0;
        for entry in schedule {
            self.windows.create_window(&window_from_seed(therapist.id, entry)?).await?;
            created += 1;
        }

        if created > 0 {
            info!("Seeded {} availability windows for {}", created, therapist.name);
        }
        Ok(created)
    }
}

fn window_from_seed(therapist_id: Uuid, seed: &WindowSeed) -> Result<AvailabilityWindow, TherapistError> {
    let window = AvailabilityWindow::new(
        therapist_id,
        seed.day_of_week,
        ClockTime::parse(&seed.start_time)?,
        ClockTime::parse(&seed.end_time)?,
    );
    window.validate()?;
    Ok(window)
}
