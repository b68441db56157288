// handlers/protected/dashboard.rs - GET /api/dashboard handler

use axum::extract::Extension;

use crate::database::models::DashboardStats;
use crate::database::SharedStore;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::UserService;

/// GET /api/dashboard - Totals of the user's backlogs, epics and PBIs
pub async fn dashboard_get(
    Extension(store): Extension<SharedStore>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<DashboardStats> {
    let stats = UserService::new(store).dashboard(user.id).await?;
    Ok(ApiResponse::success(stats))
}
