use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::database::SharedStore;
use crate::error::ApiError;

/// User resolved from the store for the current request
#[derive(Clone, Debug)]
pub struct ValidatedUser {
    pub id: Uuid,
    pub username: String,
}

/// Middleware that checks the JWT subject still exists. A token outliving
/// its account is treated like no token at all.
pub async fn validate_user_middleware(
    Extension(store): Extension<SharedStore>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = store.find_user(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!(
            "User validation failed: user '{}' ({}) no longer exists",
            auth_user.username,
            auth_user.user_id
        );
        ApiError::unauthorized("User no longer exists")
    })?;

    tracing::debug!("User validation successful: {} ({})", user.username, user.id);

    request.extensions_mut().insert(ValidatedUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}
