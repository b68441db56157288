// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::extract::Extension;

use crate::database::models::User;
use crate::database::SharedStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::UserService;

/// GET /api/auth/whoami - Current authenticated user
pub async fn whoami_get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<User> {
    let user = UserService::new(store)
        .find(user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
    Ok(ApiResponse::success(user))
}
