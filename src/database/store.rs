use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Backlog, BacklogDraft, DashboardStats, Epic, EpicDraft, EpicWithBacklog, Pbi, PbiDraft,
    PbiWithDetails, User,
};
use crate::filter::ListFilter;

/// Persistence operations behind the resource handlers.
///
/// Implementations only enforce the row-level rules the database would:
/// owner scoping where an owner is passed in, unique usernames, and the two
/// referential actions (deleting a backlog removes its epics and PBIs,
/// deleting an epic clears `epic_id` on its PBIs). Ownership of epics and
/// PBIs is checked by the services before calling in.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Users

    /// Fails with `DatabaseError::Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    // Backlogs

    /// Backlogs owned by `user_id`, oldest update first.
    async fn list_backlogs(&self, user_id: Uuid) -> Result<Vec<Backlog>, DatabaseError>;

    async fn find_backlog(&self, id: Uuid) -> Result<Option<Backlog>, DatabaseError>;

    async fn insert_backlog(&self, user_id: Uuid, draft: &BacklogDraft) -> Result<Backlog, DatabaseError>;

    /// `None` when no backlog with that id belongs to `user_id`.
    async fn update_backlog(
        &self,
        id: Uuid,
        user_id: Uuid,
        draft: &BacklogDraft,
    ) -> Result<Option<Backlog>, DatabaseError>;

    /// Cascades to the backlog's epics and PBIs.
    async fn delete_backlog(&self, id: Uuid, user_id: Uuid) -> Result<bool, DatabaseError>;

    // Epics

    async fn list_epics(
        &self,
        user_id: Uuid,
        backlog_id: Option<Uuid>,
    ) -> Result<Vec<EpicWithBacklog>, DatabaseError>;

    async fn find_epic(&self, id: Uuid) -> Result<Option<Epic>, DatabaseError>;

    async fn insert_epic(&self, backlog_id: Uuid, draft: &EpicDraft) -> Result<Epic, DatabaseError>;

    async fn update_epic(&self, id: Uuid, draft: &EpicDraft) -> Result<Option<Epic>, DatabaseError>;

    /// PBIs of the epic stay, with their epic reference cleared.
    async fn delete_epic(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // PBIs

    async fn list_pbis(&self, user_id: Uuid, filter: &ListFilter) -> Result<Vec<PbiWithDetails>, DatabaseError>;

    async fn find_pbi(&self, id: Uuid) -> Result<Option<PbiWithDetails>, DatabaseError>;

    async fn insert_pbi(&self, backlog_id: Uuid, draft: &PbiDraft) -> Result<Pbi, DatabaseError>;

    async fn update_pbi(&self, id: Uuid, draft: &PbiDraft) -> Result<Option<Pbi>, DatabaseError>;

    async fn delete_pbi(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn dashboard_stats(&self, user_id: Uuid) -> Result<DashboardStats, DatabaseError>;
}

pub type SharedStore = Arc<dyn Store>;
