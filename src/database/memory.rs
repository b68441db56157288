use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Backlog, BacklogDraft, DashboardStats, Epic, EpicDraft, EpicWithBacklog, Pbi, PbiDraft,
    PbiWithDetails, User,
};
use crate::database::store::Store;
use crate::filter::{Filterable, ListFilter};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    backlogs: Vec<Backlog>,
    epics: Vec<Epic>,
    pbis: Vec<Pbi>,
    last_tick: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing timestamps so `updated_at` ordering is total.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn owns_backlog(&self, backlog_id: Uuid, user_id: Uuid) -> bool {
        self.backlogs
            .iter()
            .any(|b| b.id == backlog_id && b.user_id == user_id)
    }

    fn detail(&self, pbi: &Pbi) -> Option<PbiWithDetails> {
        let backlog = self.backlogs.iter().find(|b| b.id == pbi.backlog_id)?;
        let epic_title = pbi
            .epic_id
            .and_then(|id| self.epics.iter().find(|e| e.id == id))
            .map(|e| e.title.clone());
        Some(PbiWithDetails {
            pbi: pbi.clone(),
            backlog_title: backlog.title.clone(),
            epic_title,
        })
    }

    fn remove_epic(&mut self, id: Uuid) -> bool {
        let before = self.epics.len();
        self.epics.retain(|e| e.id != id);
        if self.epics.len() == before {
            return false;
        }
        // ON DELETE SET NULL
        for pbi in self.pbis.iter_mut().filter(|p| p.epic_id == Some(id)) {
            pbi.epic_id = None;
        }
        true
    }
}

/// In-process store with the same semantics as the PostgreSQL schema,
/// including both referential actions. Used for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_updated_at<T>(mut rows: Vec<T>, key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == username) {
            return Err(DatabaseError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        let now = state.tick();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_backlogs(&self, user_id: Uuid) -> Result<Vec<Backlog>, DatabaseError> {
        let state = self.state.read().await;
        let rows = state
            .backlogs
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        Ok(by_updated_at(rows, |b: &Backlog| b.updated_at))
    }

    async fn find_backlog(&self, id: Uuid) -> Result<Option<Backlog>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.backlogs.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_backlog(&self, user_id: Uuid, draft: &BacklogDraft) -> Result<Backlog, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(DatabaseError::NotFound(format!("user {}", user_id)));
        }
        let now = state.tick();
        let backlog = Backlog {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        state.backlogs.push(backlog.clone());
        Ok(backlog)
    }

    async fn update_backlog(
        &self,
        id: Uuid,
        user_id: Uuid,
        draft: &BacklogDraft,
    ) -> Result<Option<Backlog>, DatabaseError> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let Some(backlog) = state
            .backlogs
            .iter_mut()
            .find(|b| b.id == id && b.user_id == user_id)
        else {
            return Ok(None);
        };
        backlog.title = draft.title.clone();
        backlog.description = draft.description.clone();
        backlog.updated_at = now;
        Ok(Some(backlog.clone()))
    }

    async fn delete_backlog(&self, id: Uuid, user_id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.owns_backlog(id, user_id) {
            return Ok(false);
        }
        // ON DELETE CASCADE for both children
        state.backlogs.retain(|b| b.id != id);
        state.epics.retain(|e| e.backlog_id != id);
        state.pbis.retain(|p| p.backlog_id != id);
        Ok(true)
    }

    async fn list_epics(
        &self,
        user_id: Uuid,
        backlog_id: Option<Uuid>,
    ) -> Result<Vec<EpicWithBacklog>, DatabaseError> {
        let state = self.state.read().await;
        let rows = state
            .epics
            .iter()
            .filter(|e| backlog_id.map_or(true, |id| e.backlog_id == id))
            .filter_map(|e| {
                let backlog = state
                    .backlogs
                    .iter()
                    .find(|b| b.id == e.backlog_id && b.user_id == user_id)?;
                Some(EpicWithBacklog {
                    epic: e.clone(),
                    backlog_title: backlog.title.clone(),
                })
            })
            .collect();
        Ok(by_updated_at(rows, |e: &EpicWithBacklog| e.epic.updated_at))
    }

    async fn find_epic(&self, id: Uuid) -> Result<Option<Epic>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.epics.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_epic(&self, backlog_id: Uuid, draft: &EpicDraft) -> Result<Epic, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.backlogs.iter().any(|b| b.id == backlog_id) {
            return Err(DatabaseError::NotFound(format!("backlog {}", backlog_id)));
        }
        let now = state.tick();
        let epic = Epic {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            backlog_id,
            created_at: now,
            updated_at: now,
        };
        state.epics.push(epic.clone());
        Ok(epic)
    }

    async fn update_epic(&self, id: Uuid, draft: &EpicDraft) -> Result<Option<Epic>, DatabaseError> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let Some(epic) = state.epics.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        epic.title = draft.title.clone();
        epic.description = draft.description.clone();
        epic.updated_at = now;
        Ok(Some(epic.clone()))
    }

    async fn delete_epic(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.remove_epic(id))
    }

    async fn list_pbis(&self, user_id: Uuid, filter: &ListFilter) -> Result<Vec<PbiWithDetails>, DatabaseError> {
        let state = self.state.read().await;
        let rows = state
            .pbis
            .iter()
            .filter(|p| state.owns_backlog(p.backlog_id, user_id))
            .filter_map(|p| state.detail(p))
            .filter(|p| p.matches(filter))
            .collect();
        Ok(by_updated_at(rows, |p: &PbiWithDetails| p.pbi.updated_at))
    }

    async fn find_pbi(&self, id: Uuid) -> Result<Option<PbiWithDetails>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .pbis
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| state.detail(p)))
    }

    async fn insert_pbi(&self, backlog_id: Uuid, draft: &PbiDraft) -> Result<Pbi, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.backlogs.iter().any(|b| b.id == backlog_id) {
            return Err(DatabaseError::NotFound(format!("backlog {}", backlog_id)));
        }
        if let Some(epic_id) = draft.epic_id {
            if !state.epics.iter().any(|e| e.id == epic_id) {
                return Err(DatabaseError::NotFound(format!("epic {}", epic_id)));
            }
        }
        let now = state.tick();
        let pbi = Pbi {
            id: Uuid::new_v4(),
            pic: draft.pic.clone(),
            title: draft.title.clone(),
            priority: draft.priority,
            story_point: draft.story_point,
            business_value: draft.business_value.clone(),
            user_story: draft.user_story.clone(),
            acceptance_criteria: draft.acceptance_criteria.clone(),
            notes: draft.notes.clone(),
            epic_id: draft.epic_id,
            backlog_id,
            created_at: now,
            updated_at: now,
        };
        state.pbis.push(pbi.clone());
        Ok(pbi)
    }

    async fn update_pbi(&self, id: Uuid, draft: &PbiDraft) -> Result<Option<Pbi>, DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(epic_id) = draft.epic_id {
            if !state.epics.iter().any(|e| e.id == epic_id) {
                return Err(DatabaseError::NotFound(format!("epic {}", epic_id)));
            }
        }
        let now = state.tick();
        let Some(pbi) = state.pbis.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        pbi.pic = draft.pic.clone();
        pbi.title = draft.title.clone();
        pbi.priority = draft.priority;
        pbi.story_point = draft.story_point;
        pbi.business_value = draft.business_value.clone();
        pbi.user_story = draft.user_story.clone();
        pbi.acceptance_criteria = draft.acceptance_criteria.clone();
        pbi.notes = draft.notes.clone();
        pbi.epic_id = draft.epic_id;
        pbi.updated_at = now;
        Ok(Some(pbi.clone()))
    }

    async fn delete_pbi(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let before = state.pbis.len();
        state.pbis.retain(|p| p.id != id);
        Ok(state.pbis.len() != before)
    }

    async fn dashboard_stats(&self, user_id: Uuid) -> Result<DashboardStats, DatabaseError> {
        let state = self.state.read().await;
        let owned: Vec<Uuid> = state
            .backlogs
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.id)
            .collect();
        Ok(DashboardStats {
            backlogs: owned.len() as i64,
            epics: state.epics.iter().filter(|e| owned.contains(&e.backlog_id)).count() as i64,
            pbis: state.pbis.iter().filter(|p| owned.contains(&p.backlog_id)).count() as i64,
        })
    }
}
