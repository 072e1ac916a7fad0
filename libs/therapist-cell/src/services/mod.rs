pub mod availability;
pub mod resolver;
pub mod store;
pub mod therapist;

pub use availability::AvailabilityService;
pub use therapist::TherapistService;
