use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::record::{FieldCheck, RecordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "priority")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Position under ascending sort: High first, Low last.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pbi {
    pub id: Uuid,
    pub pic: String,
    pub title: String,
    pub priority: Priority,
    pub story_point: i32,
    pub business_value: String,
    pub user_story: String,
    pub acceptance_criteria: String,
    pub notes: Option<String>,
    pub epic_id: Option<Uuid>,
    #[serde(rename = "productBacklogListId")]
    pub backlog_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PBI row decorated with the titles of its backlog and epic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PbiWithDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pbi: Pbi,
    pub backlog_title: String,
    pub epic_title: Option<String>,
}

/// Create/edit form for a PBI.
///
/// `storyPoint` is kept as raw JSON so both `5` and `"5"` are accepted;
/// the validator decides whether the value is a usable count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbiForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_point: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_story: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<String>,
    #[serde(
        rename = "productBacklogListId",
        alias = "backlogId",
        skip_serializing_if = "Option::is_none"
    )]
    pub backlog_id: Option<String>,
}

/// Validated PBI fields. The parent backlog is carried separately because
/// it is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbiDraft {
    pub pic: String,
    pub title: String,
    pub priority: Priority,
    pub story_point: i32,
    pub business_value: String,
    pub user_story: String,
    pub acceptance_criteria: String,
    pub notes: Option<String>,
    pub epic_id: Option<Uuid>,
}

impl PbiForm {
    pub fn validate_create(&self) -> Result<(Uuid, PbiDraft), RecordError> {
        let mut check = FieldCheck::new();
        let backlog_id = check.required_uuid("productBacklogListId", &self.backlog_id);
        let draft = self.check_fields(&mut check);
        check.finish("Required fields are missing")?;
        Ok((backlog_id, draft))
    }

    pub fn validate_update(&self) -> Result<PbiDraft, RecordError> {
        let mut check = FieldCheck::new();
        let draft = self.check_fields(&mut check);
        check.finish("Required fields are missing")?;
        Ok(draft)
    }

    fn check_fields(&self, check: &mut FieldCheck) -> PbiDraft {
        PbiDraft {
            pic: check.required_text("pic", &self.pic),
            title: check.required_text("title", &self.title),
            priority: check
                .required_parsed("priority", &self.priority, "Low, Medium, High")
                .unwrap_or(Priority::Medium),
            story_point: check.required_count("storyPoint", &self.story_point),
            business_value: check.required_text("businessValue", &self.business_value),
            user_story: check.required_text("userStory", &self.user_story),
            acceptance_criteria: check.required_text("acceptanceCriteria", &self.acceptance_criteria),
            notes: check.optional_text(&self.notes),
            epic_id: check.optional_uuid("epicId", &self.epic_id),
        }
    }
}

impl From<&Pbi> for PbiForm {
    fn from(pbi: &Pbi) -> Self {
        Self {
            pic: Some(pbi.pic.clone()),
            title: Some(pbi.title.clone()),
            priority: Some(pbi.priority.to_string()),
            story_point: Some(Value::from(pbi.story_point)),
            business_value: Some(pbi.business_value.clone()),
            user_story: Some(pbi.user_story.clone()),
            acceptance_criteria: Some(pbi.acceptance_criteria.clone()),
            notes: pbi.notes.clone(),
            epic_id: pbi.epic_id.map(|id| id.to_string()),
            backlog_id: Some(pbi.backlog_id.to_string()),
        }
    }
}
