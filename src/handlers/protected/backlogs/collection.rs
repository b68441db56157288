use axum::extract::{rejection::JsonRejection, Extension, Json};

use crate::database::models::{Backlog, BacklogForm};
use crate::database::SharedStore;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::BacklogService;

/// GET /api/backlogs - backlogs owned by the current user, oldest update first
pub async fn get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Backlog>> {
    let backlogs = BacklogService::new(store).list(user.id).await?;
    Ok(ApiResponse::success(backlogs))
}

/// POST /api/backlogs - create a backlog owned by the current user
pub async fn post(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    payload: Result<Json<BacklogForm>, JsonRejection>,
) -> ApiResult<Backlog> {
    let Json(form) = payload?;
    let backlog = BacklogService::new(store).create(user.id, &form).await?;
    Ok(ApiResponse::created(backlog))
}
