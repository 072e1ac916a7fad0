use std::sync::Arc;

use tracing::info;

use auth_cell::services::store::{InMemoryUserRoleStore, SupabaseUserRoleStore};
use auth_cell::{RoleResolver, UserRoleStore};
use patient_cell::services::store::{InMemoryPatientStore, SupabasePatientStore};
use patient_cell::{PackageBalanceTracker, PatientCellState, PatientService, PatientStore};
use session_cell::services::store::{InMemorySessionStore, SupabaseSessionStore};
use session_cell::{
    BookingEngine, LoggingObserver, SessionCellState, SessionLifecycleManager, SessionQueries, SessionStore,
};
use shared_config::{AppConfig, StoreBackend};
use shared_database::SupabaseClient;
use therapist_cell::services::store::{
    InMemoryAvailabilityStore, InMemoryTherapistStore, SupabaseAvailabilityStore, SupabaseTherapistStore,
};
use therapist_cell::{AvailabilityService, AvailabilityStore, TherapistCellState, TherapistService, TherapistStore};

/// One handle per table.
pub struct Stores {
    pub therapists: Arc<dyn TherapistStore>,
    pub windows: Arc<dyn AvailabilityStore>,
    pub patients: Arc<dyn PatientStore>,
    pub users: Arc<dyn UserRoleStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Stores {
    pub fn for_config(config: &AppConfig) -> Self {
        match config.store_backend {
            StoreBackend::Memory => Self::in_memory(),
            StoreBackend::Supabase => Self::supabase(Arc::new(SupabaseClient::new(config))),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            therapists: Arc::new(InMemoryTherapistStore::new()),
            windows: Arc::new(InMemoryAvailabilityStore::new()),
            patients: Arc::new(InMemoryPatientStore::new()),
            users: Arc::new(InMemoryUserRoleStore::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
        }
    }

    pub fn supabase(client: Arc<SupabaseClient>) -> Self {
        Self {
            therapists: Arc::new(SupabaseTherapistStore::new(client.clone())),
            windows: Arc::new(SupabaseAvailabilityStore::new(client.clone())),
            patients: Arc::new(SupabasePatientStore::new(client.clone())),
            users: Arc::new(SupabaseUserRoleStore::new(client.clone())),
            sessions: Arc::new(SupabaseSessionStore::new(client)),
        }
    }
}

/// Every cell's state, built over one set of stores.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<RoleResolver>,
    pub therapist: Arc<TherapistCellState>,
    pub patient: Arc<PatientCellState>,
    pub session: Arc<SessionCellState>,
}

impl AppState {
    pub fn build(config: Arc<AppConfig>, stores: Stores) -> Self {
        let therapists = TherapistService::new(stores.therapists.clone(), stores.windows.clone());
        let availability = AvailabilityService::new(stores.therapists, stores.windows);
        let patients = PatientService::new(stores.patients.clone(), config.default_package_sessions);
        let balance = PackageBalanceTracker::new(stores.patients);

        let engine = BookingEngine::new(
            stores.sessions.clone(),
            therapists.clone(),
            availability.clone(),
            patients.clone(),
        )
        .with_observer(Arc::new(LoggingObserver));
        let lifecycle = SessionLifecycleManager::new(
            stores.sessions.clone(),
            balance.clone(),
            config.completed_deletion_policy,
        );

        info!(
            "Services ready ({:?} backend, deletion policy {:?})",
            config.store_backend, config.completed_deletion_policy
        );

        Self {
            resolver: Arc::new(RoleResolver::new(config.clone(), stores.users, patients.clone())),
            therapist: Arc::new(TherapistCellState {
                therapists,
                availability,
            }),
            patient: Arc::new(PatientCellState { patients, balance }),
            session: Arc::new(SessionCellState {
                engine,
                lifecycle,
                queries: SessionQueries::new(stores.sessions),
                default_slot_minutes: config.slot_duration_minutes,
            }),
            config,
        }
    }
}
