use thiserror::Error;

use crate::supabase::ApiError;

/// Failure surfaced by any store backend, in-memory or remote.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Malformed record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ApiError>() {
            // Unique or exclusion constraint violated by a concurrent writer.
            Some(api) if api.is_conflict() => StoreError::Conflict(api.body.clone()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
