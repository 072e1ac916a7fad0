use async_trait::async_trait;
use uuid::Uuid;

use shared_database::StoreResult;

use crate::models::Patient;

pub mod memory;
pub mod supabase;

pub use memory::InMemoryPatientStore;
pub use supabase::SupabasePatientStore;

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Patient>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Patient>>;

    /// `email` must already be lower-cased.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Patient>>;

    async fn create(&self, patient: &Patient) -> StoreResult<Patient>;

    async fn update(&self, patient: &Patient) -> StoreResult<Option<Patient>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Atomically add `delta` to `used_sessions`, flooring the result at 0.
    /// `None` when the patient does not exist.
    async fn adjust_used(&self, id: Uuid, delta: i32) -> StoreResult<Option<Patient>>;

    async fn set_used(&self, id: Uuid, used_sessions: i32) -> StoreResult<Option<Patient>>;

    async fn append_history(&self, id: Uuid, session_id: Uuid) -> StoreResult<Option<Patient>>;

    async fn increment_used(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        self.adjust_used(id, 1).await
    }

    /// No-op on the counter when it is already 0.
    async fn decrement_used(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        self.adjust_used(id, -1).await
    }
}
