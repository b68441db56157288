use uuid::Uuid;

use crate::database::models::{Epic, EpicForm, EpicWithBacklog};
use crate::database::SharedStore;

use super::backlog_service::BacklogService;
use super::ServiceError;

pub const EPIC_NOT_FOUND: &str = "Epic not found";

/// Epic CRUD. Every epic is reached through its parent backlog, so all
/// checks resolve the backlog owner first.
pub struct EpicService {
    store: SharedStore,
}

impl EpicService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn backlogs(&self) -> BacklogService {
        BacklogService::new(self.store.clone())
    }

    /// A `backlog_id` the user does not own yields an empty list.
    pub async fn list(&self, user_id: Uuid, backlog_id: Option<Uuid>) -> Result<Vec<EpicWithBacklog>, ServiceError> {
        Ok(self.store.list_epics(user_id, backlog_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<EpicWithBacklog, ServiceError> {
        let epic = self.find(id).await?;
        match self.backlogs().owned(user_id, epic.backlog_id).await {
            Ok(backlog) => Ok(EpicWithBacklog {
                epic,
                backlog_title: backlog.title,
            }),
            Err(_) => Err(ServiceError::NotFound(EPIC_NOT_FOUND.to_string())),
        }
    }

    pub async fn create(&self, user_id: Uuid, form: &EpicForm) -> Result<Epic, ServiceError> {
        let (backlog_id, draft) = form.validate_create()?;
        self.backlogs().owned(user_id, backlog_id).await?;
        let epic = self.store.insert_epic(backlog_id, &draft).await?;
        tracing::info!("Created epic {} in backlog {}", epic.id, backlog_id);
        Ok(epic)
    }

    /// The parent backlog is fixed; a backlog id in the form is ignored.
    pub async fn update(&self, user_id: Uuid, id: Uuid, form: &EpicForm) -> Result<Epic, ServiceError> {
        let draft = form.validate_update()?;
        self.authorize(user_id, id).await?;
        self.store
            .update_epic(id, &draft)
            .await?
            .ok_or_else(|| ServiceError::NotFound(EPIC_NOT_FOUND.to_string()))
    }

    /// PBIs of the epic survive with their epic cleared.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.authorize(user_id, id).await?;
        if !self.store.delete_epic(id).await? {
            return Err(ServiceError::NotFound(EPIC_NOT_FOUND.to_string()));
        }
        tracing::info!("Deleted epic {}", id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Epic, ServiceError> {
        self.store
            .find_epic(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(EPIC_NOT_FOUND.to_string()))
    }

    /// Existence then ownership, before anything is written.
    async fn authorize(&self, user_id: Uuid, id: Uuid) -> Result<Epic, ServiceError> {
        let epic = self.find(id).await?;
        if self.backlogs().owned(user_id, epic.backlog_id).await.is_err() {
            tracing::warn!("User {} tried to modify epic {} of a foreign backlog", user_id, id);
            return Err(ServiceError::Forbidden("Unauthorized".to_string()));
        }
        Ok(epic)
    }
}
