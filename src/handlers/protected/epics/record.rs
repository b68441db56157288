use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Extension, Json, Path,
};
use uuid::Uuid;

use super::super::utils::{record_id, Deleted};
use crate::database::models::{Epic, EpicForm, EpicWithBacklog};
use crate::database::SharedStore;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::EpicService;

/// GET /api/epics/:id
pub async fn get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<EpicWithBacklog> {
    let id = record_id(path)?;
    let epic = EpicService::new(store).get(user.id, id).await?;
    Ok(ApiResponse::success(epic))
}

/// PUT /api/epics/:id - 403 when the epic's backlog belongs to someone else
pub async fn put(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EpicForm>, JsonRejection>,
) -> ApiResult<Epic> {
    let id = record_id(path)?;
    let Json(form) = payload?;
    let epic = EpicService::new(store).update(user.id, id, &form).await?;
    Ok(ApiResponse::success(epic))
}

/// DELETE /api/epics/:id - PBIs of the epic are kept without an epic
pub async fn delete(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Deleted> {
    let id = record_id(path)?;
    EpicService::new(store).delete(user.id, id).await?;
    Ok(ApiResponse::success(Deleted {
        message: "Epic deleted successfully",
    }))
}
