use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Extension, Json, Query,
};
use serde::Deserialize;

use crate::database::models::{Epic, EpicForm, EpicWithBacklog};
use crate::database::SharedStore;
use crate::filter::ListFilter;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::EpicService;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicListQuery {
    pub backlog_id: Option<String>,
}

/// GET /api/epics?backlogId= - epics of the user's backlogs with their backlog title
pub async fn get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    query: Result<Query<EpicListQuery>, QueryRejection>,
) -> ApiResult<Vec<EpicWithBacklog>> {
    let Query(query) = query?;
    let filter = ListFilter::from_query(query.backlog_id.as_deref(), None)?;
    let epics = EpicService::new(store).list(user.id, filter.backlog_id).await?;
    Ok(ApiResponse::success(epics))
}

/// POST /api/epics - requires `title` and `productBacklogListId`
pub async fn post(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    payload: Result<Json<EpicForm>, JsonRejection>,
) -> ApiResult<Epic> {
    let Json(form) = payload?;
    let epic = EpicService::new(store).create(user.id, &form).await?;
    Ok(ApiResponse::created(epic))
}
