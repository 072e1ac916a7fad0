pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod observer;
pub mod queries;
pub mod store;

pub use booking::BookingEngine;
pub use lifecycle::{BalanceEffect, SessionLifecycleManager};
pub use observer::{LoggingObserver, SessionObserver};
pub use queries::SessionQueries;
