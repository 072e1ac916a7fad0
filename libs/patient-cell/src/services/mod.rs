pub mod balance;
pub mod patient;
pub mod store;

pub use balance::PackageBalanceTracker;
pub use patient::PatientService;
