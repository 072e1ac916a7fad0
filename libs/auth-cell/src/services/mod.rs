pub mod resolver;
pub mod store;

pub use resolver::RoleResolver;
