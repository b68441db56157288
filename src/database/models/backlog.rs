use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::record::{FieldCheck, RecordError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Backlog {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/edit form for a backlog. Every field is optional until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Validated backlog fields, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogDraft {
    pub title: String,
    pub description: Option<String>,
}

impl BacklogForm {
    pub fn validate(&self) -> Result<BacklogDraft, RecordError> {
        let mut check = FieldCheck::new();
        let title = check.required_text("title", &self.title);
        let description = check.optional_text(&self.description);
        check.finish("Title is required")?;
        Ok(BacklogDraft { title, description })
    }
}

impl From<&Backlog> for BacklogForm {
    fn from(backlog: &Backlog) -> Self {
        Self {
            title: Some(backlog.title.clone()),
            description: backlog.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_required() {
        let err = BacklogForm::default().validate().unwrap_err();
        assert_eq!(err.message, "Title is required");
    }

    #[test]
    fn blank_description_is_dropped() {
        let form = BacklogForm {
            title: Some(" Sprint 1 ".to_string()),
            description: Some("  ".to_string()),
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.title, "Sprint 1");
        assert_eq!(draft.description, None);
    }
}
