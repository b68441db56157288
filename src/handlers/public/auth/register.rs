// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::{rejection::JsonRejection, Extension, Json};

use super::Credentials;
use crate::config::config;
use crate::database::models::User;
use crate::database::SharedStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;

/// POST /auth/register - Register new user account
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string (8+ characters)" }
/// ```
///
/// Responds 201 with the created user, 409 when the username is taken and
/// 403 when registration is disabled for this environment.
pub async fn register_post(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<User> {
    if !config().security.allow_registration {
        return Err(ApiError::forbidden("Registration is disabled"));
    }

    let Json(credentials) = payload?;
    let user = UserService::new(store)
        .register(&credentials.username, &credentials.password)
        .await?;

    Ok(ApiResponse::created(user))
}
