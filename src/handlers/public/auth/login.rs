// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::{rejection::JsonRejection, Extension, Json};
use serde::Serialize;

use super::Credentials;
use crate::auth::{generate_jwt, Claims};
use crate::database::models::User;
use crate::database::SharedStore;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_in: i64,
}

/// POST /auth/login - Authenticate user and receive JWT token
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": "...", "username": "dana", "createdAt": "...", "updatedAt": "..." },
///     "expiresIn": 86400
///   }
/// }
/// ```
pub async fn login_post(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(credentials) = payload?;
    let user = UserService::new(store)
        .authenticate(&credentials.username, &credentials.password)
        .await?;

    let claims = Claims::for_user(&user);
    let token = generate_jwt(&claims)?;
    tracing::info!("User {} logged in", user.username);

    Ok(ApiResponse::success(LoginResponse {
        token,
        user,
        expires_in: claims.expires_in(),
    }))
}
