use async_trait::async_trait;
use uuid::Uuid;

use shared_database::StoreResult;

use crate::models::UserRoleRecord;

pub mod memory;
pub mod supabase;

pub use memory::InMemoryUserRoleStore;
pub use supabase::SupabaseUserRoleStore;

#[async_trait]
pub trait UserRoleStore: Send + Sync {
    async fn get(&self, uid: &str) -> StoreResult<Option<UserRoleRecord>>;

    async fn create(&self, record: &UserRoleRecord) -> StoreResult<UserRoleRecord>;

    async fn set_patient(&self, uid: &str, patient_id: Uuid) -> StoreResult<Option<UserRoleRecord>>;
}
