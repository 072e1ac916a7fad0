pub mod store;
pub mod supabase;

pub use store::{StoreError, StoreResult};
pub use supabase::{ApiError, SupabaseClient};
