use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Extension, Json, Query,
};
use serde::Deserialize;

use crate::database::models::{Pbi, PbiForm, PbiWithDetails};
use crate::database::SharedStore;
use crate::filter::{Filter, FilterOrder, ListFilter, PbiField};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::PbiService;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbiListQuery {
    pub backlog_id: Option<String>,
    /// A specific epic, or `null` for PBIs without one
    pub epic_id: Option<String>,
    /// Sort keys, e.g. `priority asc, storyPoint desc`
    pub order: Option<String>,
}

/// GET /api/pbis?backlogId=&epicId=&order= - the user's PBIs with backlog and epic titles
pub async fn get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    query: Result<Query<PbiListQuery>, QueryRejection>,
) -> ApiResult<Vec<PbiWithDetails>> {
    let Query(query) = query?;
    let where_clause = ListFilter::from_query(query.backlog_id.as_deref(), query.epic_id.as_deref())?;
    let order = match query.order.as_deref() {
        Some(order) => FilterOrder::validate_and_parse::<PbiField>(order)?,
        None => Vec::new(),
    };

    let pbis = PbiService::new(store)
        .list(user.id, &Filter::new(where_clause, order))
        .await?;
    Ok(ApiResponse::success(pbis))
}

/// POST /api/pbis - create a PBI in one of the user's backlogs
pub async fn post(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
    payload: Result<Json<PbiForm>, JsonRejection>,
) -> ApiResult<Pbi> {
    let Json(form) = payload?;
    let pbi = PbiService::new(store).create(user.id, &form).await?;
    Ok(ApiResponse::created(pbi))
}
