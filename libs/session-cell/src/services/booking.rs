// libs/session-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use patient_cell::PatientService;
use shared_models::auth::Principal;
use shared_models::clock::ClockTime;
use therapist_cell::{AvailabilityService, TherapistService, TimeSlot};

use crate::models::{
    ensure_time_range, BookingRequest, NewSessionPayload, Session, SessionError, SessionStatus, SlotCheck,
};
use crate::services::conflict;
use crate::services::observer::SessionObserver;
use crate::services::store::SessionStore;

/// Validates booking requests and commits them without double-booking.
#[derive(Clone)]
pub struct BookingEngine {
    sessions: Arc<dyn SessionStore>,
    therapists: TherapistService,
    availability: AvailabilityService,
    patients: PatientService,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl BookingEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        therapists: TherapistService,
        availability: AvailabilityService,
        patients: PatientService,
    ) -> Self {
        Self {
            sessions,
            therapists,
            availability,
            patients,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub async fn book_payload(&self, principal: &Principal, payload: NewSessionPayload) -> Result<Session, SessionError> {
        let request = BookingRequest::try_from(payload)?;
        self.book(principal, request).await
    }

    pub async fn book(&self, principal: &Principal, request: BookingRequest) -> Result<Session, SessionError> {
        debug!(
            "Booking request by {} for patient {} with therapist {} on {} {}-{}",
            principal.uid,
            request.patient_id,
            request.therapist_id,
            request.date,
            request.start_time,
            request.end_time
        );

        if !principal.role.can_act_for_patient(request.patient_id) {
            warn!("User {} attempted to book for patient {}", principal.uid, request.patient_id);
            return Err(SessionError::Forbidden(
                "Patients may only book sessions for themselves".to_string(),
            ));
        }
        ensure_time_range(request.start_time, request.end_time)?;

        let therapist = self.therapists.get_therapist(request.therapist_id).await?;
        let patient = self.patients.get_patient(request.patient_id).await?;

        if !self
            .availability
            .is_slot_open(therapist.id, request.date, request.start_time)
            .await?
        {
            warn!(
                "Rejected booking: {} not available on {} at {}",
                therapist.name, request.date, request.start_time
            );
            return Err(SessionError::SlotNotAvailable {
                therapist_id: therapist.id,
                date: request.date,
                start_time: request.start_time,
            });
        }

        let same_day = self.sessions.list_for_therapist_on(therapist.id, request.date).await?;
        if conflict::has_conflict(&same_day, request.start_time, request.end_time) {
            warn!(
                "Rejected booking: {} already booked on {} within {}-{}",
                therapist.name, request.date, request.start_time, request.end_time
            );
            return Err(SessionError::SlotConflict);
        }

        let balance = patient.balance();
        if balance.exhausted {
            warn!("Rejected booking: package exhausted for patient {}", patient.id);
            return Err(SessionError::PackageExhausted {
                patient_id: patient.id,
                remaining: balance.remaining,
            });
        }

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            therapist_id: therapist.id,
            therapist_name: therapist.name.clone(),
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: SessionStatus::Scheduled,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        // The pre-check above can race with another booking; this one cannot.
        let created = self
            .sessions
            .insert_if_free(&session)
            .await?
            .ok_or_else(|| {
                warn!("Rejected booking: slot taken concurrently for {}", therapist.name);
                SessionError::SlotConflict
            })?;

        self.patients.append_history(patient.id, created.id).await;
        self.notify_created(&created).await;

        info!(
            "Session {} booked: {} with {} on {} {}-{}",
            created.id, created.patient_name, created.therapist_name, created.date, created.start_time, created.end_time
        );
        Ok(created)
    }

    /// Whether `[start, end)` could be booked, ignoring `exclude_session_id`
    /// so an existing session can be checked against its own slot.
    pub async fn check_slot(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        start: ClockTime,
        end: ClockTime,
        exclude_session_id: Option<Uuid>,
    ) -> Result<SlotCheck, SessionError> {
        ensure_time_range(start, end)?;

        let within_availability = self.availability.is_slot_open(therapist_id, date, start).await?;
        let same_day = self.sessions.list_for_therapist_on(therapist_id, date).await?;
        let conflicts: Vec<Session> = conflict::find_conflicts(&same_day, start, end, exclude_session_id)
            .into_iter()
            .cloned()
            .collect();

        Ok(SlotCheck {
            open: within_availability && conflicts.is_empty(),
            within_availability,
            conflicts,
        })
    }

    /// Slots from the weekly schedule minus those already held by a session.
    pub async fn open_slots(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        slot_duration_minutes: u16,
    ) -> Result<Vec<TimeSlot>, SessionError> {
        let candidates = self
            .availability
            .slots_for_date(therapist_id, date, slot_duration_minutes)
            .await?;
        let same_day = self.sessions.list_for_therapist_on(therapist_id, date).await?;

        Ok(conflict::remove_booked(candidates, &same_day))
    }

    async fn notify_created(&self, session: &Session) {
        let results = join_all(self.observers.iter().map(|o| o.session_created(session))).await;

        for err in results.into_iter().filter_map(Result::err) {
            warn!("Session observer failed for {}: {:#}", session.id, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::observer::MockSessionObserver;
    use crate::services::store::InMemorySessionStore;
    use patient_cell::services::store::InMemoryPatientStore;
    use patient_cell::CreatePatientRequest;
    use therapist_cell::services::store::{InMemoryAvailabilityStore, InMemoryTherapistStore};
    use therapist_cell::{CreateAvailabilityRequest, CreateTherapistRequest};

    async fn engine_with(observer: MockSessionObserver) -> (BookingEngine, Uuid, Uuid) {
        let therapist_store = Arc::new(InMemoryTherapistStore::new());
        let window_store = Arc::new(InMemoryAvailabilityStore::new());
        let therapists = TherapistService::new(therapist_store.clone(), window_store.clone());
        let availability = AvailabilityService::new(therapist_store, window_store);
        let patients = PatientService::new(Arc::new(InMemoryPatientStore::new()), 20);

        let therapist = therapists
            .create_therapist(CreateTherapistRequest {
                name: "Natalia Pucz".to_string(),
                specialization: "Terapeutka".to_string(),
                color: "#7c3aed".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();
        availability
            .create_window(
                therapist.id,
                CreateAvailabilityRequest {
                    day_of_week: 1,
                    start_time: "09:00".to_string(),
                    end_time: "12:00".to_string(),
                    is_active: None,
                },
            )
            .await
            .unwrap();
        let patient = patients
            .create_patient(CreatePatientRequest {
                name: "Anna Kowalska".to_string(),
                email: None,
                phone: None,
                notes: None,
                total_sessions: None,
                crm_patient_id: None,
            })
            .await
            .unwrap();

        let engine = BookingEngine::new(Arc::new(InMemorySessionStore::new()), therapists, availability, patients)
            .with_observer(Arc::new(observer));
        (engine, therapist.id, patient.id)
    }

    fn request(therapist_id: Uuid, patient_id: Uuid) -> BookingRequest {
        BookingRequest {
            patient_id,
            therapist_id,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            start_time: ClockTime::parse("09:00").unwrap(),
            end_time: ClockTime::parse("10:00").unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn observer_failure_does_not_fail_booking() {
        let mut observer = MockSessionObserver::new();
        observer
            .expect_session_created()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("mail relay unavailable")));

        let (engine, therapist_id, patient_id) = engine_with(observer).await;
        let admin = Principal::admin("uid", "admin@clinic.test");

        let session = engine.book(&admin, request(therapist_id, patient_id)).await.unwrap();

        assert_eq!(session.status, SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn observer_is_not_called_for_rejected_booking() {
        let mut observer = MockSessionObserver::new();
        observer.expect_session_created().times(0);

        let (engine, therapist_id, patient_id) = engine_with(observer).await;
        let stranger = Principal::patient("uid", "x@example.com", Some(Uuid::new_v4()));

        let result = engine.book(&stranger, request(therapist_id, patient_id)).await;

        assert!(matches!(result, Err(SessionError::Forbidden(_))));
    }
}
