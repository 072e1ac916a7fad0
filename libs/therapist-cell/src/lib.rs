pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::TherapistCellState;
pub use models::*;
pub use services::store::{AvailabilityStore, TherapistStore};
pub use services::*;
