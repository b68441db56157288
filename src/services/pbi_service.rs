use uuid::Uuid;

use crate::database::models::{Pbi, PbiForm, PbiWithDetails};
use crate::database::SharedStore;
use crate::filter::{Filter, FilterOrder, PbiField};

use super::backlog_service::BacklogService;
use super::ServiceError;

pub const PBI_NOT_FOUND: &str = "PBI not found";
pub const EPIC_NOT_IN_BACKLOG: &str = "Epic not found in the specified backlog";

/// PBI CRUD with the cross-entity rule that a PBI's epic lives in the
/// PBI's own backlog.
pub struct PbiService {
    store: SharedStore,
}

impl PbiService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn backlogs(&self) -> BacklogService {
        BacklogService::new(self.store.clone())
    }

    /// Rows matching the filter, in store order unless the filter carries
    /// sort keys.
    pub async fn list(&self, user_id: Uuid, filter: &Filter<PbiField>) -> Result<Vec<PbiWithDetails>, ServiceError> {
        let mut rows = self.store.list_pbis(user_id, &filter.where_clause).await?;
        FilterOrder::sort(&mut rows, &filter.order);
        Ok(rows)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<PbiWithDetails, ServiceError> {
        let pbi = self.find(id).await?;
        self.backlogs()
            .owned(user_id, pbi.pbi.backlog_id)
            .await
            .map_err(|_| ServiceError::NotFound(PBI_NOT_FOUND.to_string()))?;
        Ok(pbi)
    }

    pub async fn create(&self, user_id: Uuid, form: &PbiForm) -> Result<Pbi, ServiceError> {
        let (backlog_id, draft) = form.validate_create()?;
        self.backlogs().owned(user_id, backlog_id).await?;
        if let Some(epic_id) = draft.epic_id {
            self.ensure_epic_in_backlog(epic_id, backlog_id).await?;
        }
        let pbi = self.store.insert_pbi(backlog_id, &draft).await?;
        tracing::info!("Created PBI {} in backlog {}", pbi.id, backlog_id);
        Ok(pbi)
    }

    /// Replaces every mutable field. The backlog id in the form is ignored.
    pub async fn update(&self, user_id: Uuid, id: Uuid, form: &PbiForm) -> Result<Pbi, ServiceError> {
        let draft = form.validate_update()?;
        let existing = self.authorize(user_id, id).await?;
        if let Some(epic_id) = draft.epic_id {
            self.ensure_epic_in_backlog(epic_id, existing.pbi.backlog_id).await?;
        }
        self.store
            .update_pbi(id, &draft)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PBI_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.authorize(user_id, id).await?;
        if !self.store.delete_pbi(id).await? {
            return Err(ServiceError::NotFound(PBI_NOT_FOUND.to_string()));
        }
        tracing::info!("Deleted PBI {}", id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<PbiWithDetails, ServiceError> {
        self.store
            .find_pbi(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PBI_NOT_FOUND.to_string()))
    }

    async fn authorize(&self, user_id: Uuid, id: Uuid) -> Result<PbiWithDetails, ServiceError> {
        let pbi = self.find(id).await?;
        if self.backlogs().owned(user_id, pbi.pbi.backlog_id).await.is_err() {
            tracing::warn!("User {} tried to modify PBI {} of a foreign backlog", user_id, id);
            return Err(ServiceError::Forbidden("Unauthorized".to_string()));
        }
        Ok(pbi)
    }

    async fn ensure_epic_in_backlog(&self, epic_id: Uuid, backlog_id: Uuid) -> Result<(), ServiceError> {
        match self.store.find_epic(epic_id).await? {
            Some(epic) if epic.backlog_id == backlog_id => Ok(()),
            _ => Err(ServiceError::NotFound(EPIC_NOT_IN_BACKLOG.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{BacklogDraft, EpicDraft};
    use crate::database::MemoryStore;
    use crate::filter::{EpicFilter, ListFilter, SortSpec};
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        service: PbiService,
        store: SharedStore,
        owner: Uuid,
        backlog: Uuid,
        epic: Uuid,
    }

    async fn fixture() -> Fixture {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let owner = store.create_user("owner", "hash").await.unwrap().id;
        let backlog = store
            .insert_backlog(owner, &BacklogDraft { title: "Sprint 1".to_string(), description: None })
            .await
            .unwrap()
            .id;
        let epic = store
            .insert_epic(backlog, &EpicDraft { title: "Auth".to_string(), description: None })
            .await
            .unwrap()
            .id;
        Fixture {
            service: PbiService::new(store.clone()),
            store,
            owner,
            backlog,
            epic,
        }
    }

    fn form(title: &str, priority: &str, backlog: Uuid, epic: Option<Uuid>) -> PbiForm {
        serde_json::from_value(json!({
            "pic": "dana",
            "title": title,
            "priority": priority,
            "storyPoint": 3,
            "businessValue": "High impact",
            "userStory": "As a user...",
            "acceptanceCriteria": "Given...",
            "epicId": epic.map(|id| id.to_string()),
            "productBacklogListId": backlog.to_string(),
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_decorates_with_titles() {
        let f = fixture().await;
        let pbi = f
            .service
            .create(f.owner, &form("Login", "High", f.backlog, Some(f.epic)))
            .await
            .unwrap();

        let shown = f.service.get(f.owner, pbi.id).await.unwrap();
        assert_eq!(shown.backlog_title, "Sprint 1");
        assert_eq!(shown.epic_title.as_deref(), Some("Auth"));
    }

    #[tokio::test]
    async fn epic_from_another_backlog_is_rejected() {
        let f = fixture().await;
        let second = f
            .store
            .insert_backlog(f.owner, &BacklogDraft { title: "Sprint 2".to_string(), description: None })
            .await
            .unwrap()
            .id;

        let err = f
            .service
            .create(f.owner, &form("Login", "High", second, Some(f.epic)))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == EPIC_NOT_IN_BACKLOG));
        assert!(f.service.list(f.owner, &Filter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_rejects_epic_outside_the_pbi_backlog() {
        let f = fixture().await;
        let pbi = f.service.create(f.owner, &form("Login", "Low", f.backlog, None)).await.unwrap();

        let err = f
            .service
            .update(f.owner, pbi.id, &form("Login", "Low", f.backlog, Some(Uuid::new_v4())))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn foreign_users_are_forbidden() {
        let f = fixture().await;
        let stranger = f.store.create_user("stranger", "hash").await.unwrap().id;
        let pbi = f.service.create(f.owner, &form("Login", "Low", f.backlog, None)).await.unwrap();

        assert!(matches!(
            f.service.update(stranger, pbi.id, &form("Mine", "Low", f.backlog, None)).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(f.service.delete(stranger, pbi.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(f.service.get(stranger, pbi.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_applies_filter_and_order() {
        let f = fixture().await;
        f.service.create(f.owner, &form("Low one", "Low", f.backlog, None)).await.unwrap();
        f.service.create(f.owner, &form("High one", "High", f.backlog, Some(f.epic))).await.unwrap();
        f.service.create(f.owner, &form("Medium one", "Medium", f.backlog, None)).await.unwrap();

        let by_priority = Filter::new(ListFilter::backlog(f.backlog), vec![SortSpec::asc(PbiField::Priority)]);
        let titles: Vec<_> = f
            .service
            .list(f.owner, &by_priority)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.pbi.title)
            .collect();
        assert_eq!(titles, vec!["High one", "Medium one", "Low one"]);

        let without_epic = Filter::new(
            ListFilter::backlog(f.backlog).with_epic(EpicFilter::Without),
            Vec::new(),
        );
        assert_eq!(f.service.list(f.owner, &without_epic).await.unwrap().len(), 2);
    }
}
