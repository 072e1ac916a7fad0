pub mod auth;
pub mod clock;
pub mod error;

pub use clock::{day_of_week, ranges_overlap, ClockTime, MalformedTimeError};
