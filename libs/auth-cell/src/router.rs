use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::RoleResolver;

pub fn auth_routes(resolver: Arc<RoleResolver>) -> Router {
    Router::new()
        .route("/me", get(handlers::get_me))
        .route("/users/{uid}/link", post(handlers::link_user_to_patient))
        .with_state(resolver)
}
