pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use middleware::role_middleware;
pub use models::*;
pub use services::store::UserRoleStore;
pub use services::RoleResolver;
