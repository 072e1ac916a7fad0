use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use shared_models::error::AppError;
use shared_utils::extractor::extract_user;

use crate::services::RoleResolver;

/// Runs after `auth_middleware`: resolves the caller's clinic role once and
/// stores the `Principal` for the handlers.
pub async fn role_middleware(
    State(resolver): State<Arc<RoleResolver>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = extract_user(&request)?;
    let principal = resolver.principal_for(&user).await?;

    debug!("Request by {} resolved to {:?}", principal.uid, principal.role);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
