pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::SessionCellState;
pub use models::*;
pub use services::store::{SessionStore, StatusUpdate};
pub use services::*;
