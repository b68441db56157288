use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Extension, Json, Path,
};
use uuid::Uuid;

use super::super::utils::{record_id, Deleted};
use crate::database::models::{Pbi, PbiForm, PbiWithDetails};
use crate::database::SharedStore;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::PbiService;

/// GET /api/pbis/:id
pub async fn get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<PbiWithDetails> {
    let id = record_id(path)?;
    let pbi = PbiService::new(store).get(user.id, id).await?;
    Ok(ApiResponse::success(pbi))
}

/// PUT /api/pbis/:id - replace every field except the parent backlog
pub async fn put(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PbiForm>, JsonRejection>,
) -> ApiResult<Pbi> {
    let id = record_id(path)?;
    let Json(form) = payload?;
    let pbi = PbiService::new(store).update(user.id, id, &form).await?;
    Ok(ApiResponse::success(pbi))
}

/// DELETE /api/pbis/:id
pub async fn delete(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Deleted> {
    let id = record_id(path)?;
    PbiService::new(store).delete(user.id, id).await?;
    Ok(ApiResponse::success(Deleted {
        message: "PBI deleted successfully",
    }))
}
