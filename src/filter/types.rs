use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::error::FilterError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Marker shown next to the sorted column header.
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "^",
            SortDirection::Desc => "v",
        }
    }
}

impl FromStr for SortDirection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidDirection(s.to_string()))
        }
    }
}

/// One sort key: the field and the direction it is ordered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + PartialEq> SortSpec<F> {
    pub fn asc(field: F) -> Self {
        Self { field, direction: SortDirection::Asc }
    }

    pub fn desc(field: F) -> Self {
        Self { field, direction: SortDirection::Desc }
    }

    /// Header-click behaviour: the same field flips direction, a new field starts ascending.
    pub fn select(self, field: F) -> Self {
        if self.field == field {
            Self { field, direction: self.direction.toggled() }
        } else {
            Self::asc(field)
        }
    }
}

/// Comparable projection of one field of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Rank(u8),
    Number(i64),
    Date(DateTime<Utc>),
    Text(&'a str),
    Missing,
}

/// Rows that can be ordered by a typed field list.
pub trait Sortable {
    type Field: Copy + PartialEq + FromStr<Err = FilterError>;

    fn sort_value(&self, field: Self::Field) -> SortValue<'_>;
}

/// Epic constraint of a list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EpicFilter {
    #[default]
    Any,
    /// Only rows that are not attached to any epic.
    Without,
    Epic(Uuid),
}

/// Optional parent constraints applied to a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub backlog_id: Option<Uuid>,
    pub epic: EpicFilter,
}

/// Rows that can be tested against a `ListFilter`.
pub trait Filterable {
    fn matches(&self, filter: &ListFilter) -> bool;
}
