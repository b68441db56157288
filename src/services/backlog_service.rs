use uuid::Uuid;

use crate::database::models::{Backlog, BacklogForm};
use crate::database::SharedStore;

use super::ServiceError;

pub const BACKLOG_NOT_FOUND: &str = "Backlog not found";

/// Backlog CRUD scoped to the owning user. Backlogs of other users are
/// reported as missing, never as forbidden.
pub struct BacklogService {
    store: SharedStore,
}

impl BacklogService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Backlog>, ServiceError> {
        Ok(self.store.list_backlogs(user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Backlog, ServiceError> {
        self.owned(user_id, id).await
    }

    pub async fn create(&self, user_id: Uuid, form: &BacklogForm) -> Result<Backlog, ServiceError> {
        let draft = form.validate()?;
        let backlog = self.store.insert_backlog(user_id, &draft).await?;
        tracing::info!("Created backlog {} for user {}", backlog.id, user_id);
        Ok(backlog)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, form: &BacklogForm) -> Result<Backlog, ServiceError> {
        let draft = form.validate()?;
        self.store
            .update_backlog(id, user_id, &draft)
            .await?
            .ok_or_else(|| ServiceError::NotFound(BACKLOG_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_backlog(id, user_id).await? {
            return Err(ServiceError::NotFound(BACKLOG_NOT_FOUND.to_string()));
        }
        tracing::info!("Deleted backlog {} with its epics and PBIs", id);
        Ok(())
    }

    /// The backlog, if it exists and belongs to `user_id`.
    pub(crate) async fn owned(&self, user_id: Uuid, id: Uuid) -> Result<Backlog, ServiceError> {
        match self.store.find_backlog(id).await? {
            Some(backlog) if backlog.user_id == user_id => Ok(backlog),
            _ => Err(ServiceError::NotFound(BACKLOG_NOT_FOUND.to_string())),
        }
    }
}
