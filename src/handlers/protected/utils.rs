use axum::extract::{rejection::PathRejection, Path};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Record id from the path; malformed ids are a client error.
pub fn record_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: &'static str,
}
