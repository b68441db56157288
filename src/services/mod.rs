pub mod backlog_service;
pub mod epic_service;
pub mod pbi_service;
pub mod user_service;

pub use backlog_service::BacklogService;
pub use epic_service::EpicService;
pub use pbi_service::PbiService;
pub use user_service::{UserService, MIN_PASSWORD_LENGTH};

use crate::database::{DatabaseError, RecordError};

/// Failures of the ownership and referential rules enforced above the store
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] RecordError),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Database(other),
        }
    }
}
