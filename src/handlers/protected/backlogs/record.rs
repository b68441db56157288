use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Extension, Json, Path,
};
use uuid::Uuid;

use super::super::utils::{record_id, Deleted};
use crate::database::models::{Backlog, BacklogForm};
use crate::database::SharedStore;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::BacklogService;

/// GET /api/backlogs/:id
pub async fn get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Backlog> {
    let id = record_id(path)?;
    let backlog = BacklogService::new(store).get(user.id, id).await?;
    Ok(ApiResponse::success(backlog))
}

/// PUT /api/backlogs/:id - replace title and description
pub async fn put(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<BacklogForm>, JsonRejection>,
) -> ApiResult<Backlog> {
    let id = record_id(path)?;
    let Json(form) = payload?;
    let backlog = BacklogService::new(store).update(user.id, id, &form).await?;
    Ok(ApiResponse::success(backlog))
}

/// DELETE /api/backlogs/:id - also removes the backlog's epics and PBIs
pub async fn delete(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Deleted> {
    let id = record_id(path)?;
    BacklogService::new(store).delete(user.id, id).await?;
    Ok(ApiResponse::success(Deleted {
        message: "Backlog deleted successfully",
    }))
}
