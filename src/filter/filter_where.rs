use uuid::Uuid;

use super::error::FilterError;
use super::types::{EpicFilter, Filterable, ListFilter};
use crate::database::models::{Backlog, EpicWithBacklog, PbiWithDetails};

/// Query value selecting rows without an epic.
pub const NO_EPIC: &str = "null";

impl ListFilter {
    pub fn backlog(backlog_id: Uuid) -> Self {
        Self {
            backlog_id: Some(backlog_id),
            epic: EpicFilter::Any,
        }
    }

    pub fn with_epic(mut self, epic: EpicFilter) -> Self {
        self.epic = epic;
        self
    }

    /// Parses `backlogId` / `epicId` query values. Empty values are ignored;
    /// `epicId=null` selects rows without an epic.
    pub fn from_query(backlog_id: Option<&str>, epic_id: Option<&str>) -> Result<Self, FilterError> {
        let backlog_id = match backlog_id.map(str::trim) {
            None | Some("") => None,
            Some(v) => Some(Uuid::parse_str(v).map_err(|_| FilterError::InvalidId {
                field: "backlogId",
                value: v.to_string(),
            })?),
        };

        let epic = match epic_id.map(str::trim) {
            None | Some("") => EpicFilter::Any,
            Some(v) if v == NO_EPIC || v.eq_ignore_ascii_case("none") => EpicFilter::Without,
            Some(v) => EpicFilter::Epic(Uuid::parse_str(v).map_err(|_| FilterError::InvalidId {
                field: "epicId",
                value: v.to_string(),
            })?),
        };

        Ok(Self { backlog_id, epic })
    }

    /// Inverse of `from_query`, for building request URLs.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.backlog_id {
            pairs.push(("backlogId", id.to_string()));
        }
        match self.epic {
            EpicFilter::Any => {}
            EpicFilter::Without => pairs.push(("epicId", NO_EPIC.to_string())),
            EpicFilter::Epic(id) => pairs.push(("epicId", id.to_string())),
        }
        pairs
    }
}

impl EpicFilter {
    pub fn matches(&self, epic_id: Option<Uuid>) -> bool {
        match self {
            EpicFilter::Any => true,
            EpicFilter::Without => epic_id.is_none(),
            EpicFilter::Epic(id) => epic_id == Some(*id),
        }
    }
}

impl Filterable for PbiWithDetails {
    fn matches(&self, filter: &ListFilter) -> bool {
        filter.backlog_id.map_or(true, |id| self.pbi.backlog_id == id) && filter.epic.matches(self.pbi.epic_id)
    }
}

impl Filterable for EpicWithBacklog {
    fn matches(&self, filter: &ListFilter) -> bool {
        let epic_ok = match filter.epic {
            EpicFilter::Any => true,
            EpicFilter::Without => false,
            EpicFilter::Epic(id) => self.epic.id == id,
        };
        epic_ok && filter.backlog_id.map_or(true, |id| self.epic.backlog_id == id)
    }
}

impl Filterable for Backlog {
    fn matches(&self, filter: &ListFilter) -> bool {
        filter.backlog_id.map_or(true, |id| self.id == id)
    }
}
