// libs/therapist-cell/src/services/store/mod.rs
use async_trait::async_trait;
use uuid::Uuid;

use shared_database::StoreResult;

use crate::models::{AvailabilityWindow, Therapist};

pub mod memory;
pub mod supabase;

pub use memory::{InMemoryAvailabilityStore, InMemoryTherapistStore};
pub use supabase::{SupabaseAvailabilityStore, SupabaseTherapistStore};

#[async_trait]
pub trait TherapistStore: Send + Sync {
    /// All therapists ordered by name.
    async fn list(&self) -> StoreResult<Vec<Therapist>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Therapist>>;

    async fn create(&self, therapist: &Therapist) -> StoreResult<Therapist>;

    /// Replace the stored record; `None` when it does not exist.
    async fn update(&self, therapist: &Therapist) -> StoreResult<Option<Therapist>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Windows for one therapist ordered by day then start time.
    async fn list_windows(&self, therapist_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>>;

    async fn list_all_windows(&self) -> StoreResult<Vec<AvailabilityWindow>>;

    async fn get_window(&self, id: Uuid) -> StoreResult<Option<AvailabilityWindow>>;

    async fn create_window(&self, window: &AvailabilityWindow) -> StoreResult<AvailabilityWindow>;

    async fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<Option<AvailabilityWindow>>;

    async fn delete_window(&self, id: Uuid) -> StoreResult<bool>;

    /// Returns how many windows were removed.
    async fn delete_all_windows_for(&self, therapist_id: Uuid) -> StoreResult<usize>;
}

pub(crate) fn sort_windows(windows: &mut [AvailabilityWindow]) {
    windows.sort_by_key(|w| (w.day_of_week, w.start_time));
}
