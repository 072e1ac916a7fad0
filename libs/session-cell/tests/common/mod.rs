#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use patient_cell::services::store::InMemoryPatientStore;
use patient_cell::{CreatePatientRequest, PackageBalanceTracker, PatientService};
use session_cell::services::store::InMemorySessionStore;
use session_cell::{BookingEngine, BookingRequest, SessionLifecycleManager, SessionQueries, SessionStore};
use shared_config::CompletedDeletionPolicy;
use shared_models::auth::Principal;
use shared_models::clock::ClockTime;
use therapist_cell::services::store::{InMemoryAvailabilityStore, InMemoryTherapistStore};
use therapist_cell::{AvailabilityService, CreateAvailabilityRequest, CreateTherapistRequest, TherapistService};

pub struct Clinic {
    pub sessions: Arc<InMemorySessionStore>,
    pub therapists: TherapistService,
    pub availability: AvailabilityService,
    pub patients: PatientService,
    pub balance: PackageBalanceTracker,
    pub engine: BookingEngine,
    pub lifecycle: SessionLifecycleManager,
    pub queries: SessionQueries,
    pub therapist_id: Uuid,
    pub patient_id: Uuid,
}

/// 2025-03-10 is a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn t(s: &str) -> ClockTime {
    ClockTime::parse(s).unwrap()
}

pub fn admin() -> Principal {
    Principal::admin("admin-uid", "admin@clinic.test")
}

pub fn request(clinic: &Clinic, start: &str, end: &str) -> BookingRequest {
    BookingRequest {
        patient_id: clinic.patient_id,
        therapist_id: clinic.therapist_id,
        date: monday(),
        start_time: t(start),
        end_time: t(end),
        notes: None,
    }
}

/// One therapist available Monday 09:00-17:00 and one patient with a
/// package of `total_sessions`.
pub async fn clinic(total_sessions: i32, policy: CompletedDeletionPolicy) -> Clinic {
    let therapist_store = Arc::new(InMemoryTherapistStore::new());
    let window_store = Arc::new(InMemoryAvailabilityStore::new());
    let therapists = TherapistService::new(therapist_store.clone(), window_store.clone());
    let availability = AvailabilityService::new(therapist_store, window_store);

    let patient_store = Arc::new(InMemoryPatientStore::new());
    let patients = PatientService::new(patient_store.clone(), 20);
    let balance = PackageBalanceTracker::new(patient_store);

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
                end_time: "17:00".to_string(),
                is_active: None,
            },
        )
        .await
        .unwrap();

    let patient = patients
        .create_patient(CreatePatientRequest {
            name: "Anna Kowalska".to_string(),
            email: Some("anna@example.com".to_string()),
            phone: None,
            notes: None,
            total_sessions: Some(total_sessions),
            crm_patient_id: None,
        })
        .await
        .unwrap();

    let sessions = Arc::new(InMemorySessionStore::new());
    let store: Arc<dyn SessionStore> = sessions.clone();

    Clinic {
        engine: BookingEngine::new(store.clone(), therapists.clone(), availability.clone(), patients.clone()),
        lifecycle: SessionLifecycleManager::new(store.clone(), balance.clone(), policy),
        queries: SessionQueries::new(store),
        sessions,
        therapists,
        availability,
        patients,
        balance,
        therapist_id: therapist.id,
        patient_id: patient.id,
    }
}
