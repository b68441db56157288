use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::record::{FieldCheck, RecordError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "productBacklogListId")]
    pub backlog_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Epic row decorated with its parent backlog's title for list views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EpicWithBacklog {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub epic: Epic,
    pub backlog_title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only read on create; an epic never moves between backlogs.
    #[serde(
        rename = "productBacklogListId",
        alias = "backlogId",
        skip_serializing_if = "Option::is_none"
    )]
    pub backlog_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicDraft {
    pub title: String,
    pub description: Option<String>,
}

impl EpicForm {
    /// Validates a new epic, returning the parent backlog id alongside the fields.
    pub fn validate_create(&self) -> Result<(Uuid, EpicDraft), RecordError> {
        let mut check = FieldCheck::new();
        let title = check.required_text("title", &self.title);
        let backlog_id = check.required_uuid("productBacklogListId", &self.backlog_id);
        let description = check.optional_text(&self.description);
        check.finish("Title and backlog list are required")?;
        Ok((backlog_id, EpicDraft { title, description }))
    }

    pub fn validate_update(&self) -> Result<EpicDraft, RecordError> {
        let mut check = FieldCheck::new();
        let title = check.required_text("title", &self.title);
        let description = check.optional_text(&self.description);
        check.finish("Title is required")?;
        Ok(EpicDraft { title, description })
    }
}
