use std::cmp::Ordering;
use std::str::FromStr;

use super::error::FilterError;
use super::types::{SortDirection, SortSpec, SortValue, Sortable};
use crate::database::models::{Backlog, EpicWithBacklog, PbiWithDetails};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `"priority desc, createdAt"` into typed sort keys. A key
    /// without a direction sorts ascending.
    pub fn validate_and_parse<F>(order: &str) -> Result<Vec<SortSpec<F>>, FilterError>
    where
        F: FromStr<Err = FilterError> + Copy + PartialEq,
    {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let field = col.parse::<F>()?;
                let direction = match it.next() {
                    Some(dir) => dir.parse::<SortDirection>()?,
                    None => SortDirection::Asc,
                };
                out.push(SortSpec { field, direction });
            }
        }
        Ok(out)
    }

    /// Missing values sort after present ones in both directions.
    pub fn compare_values(a: SortValue<'_>, b: SortValue<'_>, direction: SortDirection) -> Ordering {
        let ordering = match (a, b) {
            (SortValue::Missing, SortValue::Missing) => return Ordering::Equal,
            (SortValue::Missing, _) => return Ordering::Greater,
            (_, SortValue::Missing) => return Ordering::Less,
            (SortValue::Rank(x), SortValue::Rank(y)) => x.cmp(&y),
            (SortValue::Number(x), SortValue::Number(y)) => x.cmp(&y),
            (SortValue::Date(x), SortValue::Date(y)) => x.cmp(&y),
            (SortValue::Text(x), SortValue::Text(y)) => compare_text(x, y),
            _ => Ordering::Equal,
        };

        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn compare<T: Sortable>(a: &T, b: &T, specs: &[SortSpec<T::Field>]) -> Ordering {
        specs
            .iter()
            .map(|spec| Self::compare_values(a.sort_value(spec.field), b.sort_value(spec.field), spec.direction))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Stable in-place sort; rows equal under every key keep their order.
    pub fn sort<T: Sortable>(items: &mut [T], specs: &[SortSpec<T::Field>]) {
        if specs.is_empty() {
            return;
        }
        items.sort_by(|a, b| Self::compare(a, b, specs));
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn text(value: &str) -> SortValue<'_> {
    SortValue::Text(value)
}

fn optional_text(value: Option<&str>) -> SortValue<'_> {
    value.map_or(SortValue::Missing, SortValue::Text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbiField {
    Title,
    Priority,
    StoryPoint,
    Pic,
    BusinessValue,
    UserStory,
    AcceptanceCriteria,
    Notes,
    EpicTitle,
    BacklogTitle,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for PbiField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "title" => PbiField::Title,
            "priority" => PbiField::Priority,
            "storyPoint" | "story_point" => PbiField::StoryPoint,
            "pic" => PbiField::Pic,
            "businessValue" | "business_value" => PbiField::BusinessValue,
            "userStory" | "user_story" => PbiField::UserStory,
            "acceptanceCriteria" | "acceptance_criteria" => PbiField::AcceptanceCriteria,
            "notes" => PbiField::Notes,
            "epicTitle" | "epic_title" | "epic" => PbiField::EpicTitle,
            "backlogTitle" | "backlog_title" | "backlog" => PbiField::BacklogTitle,
            "createdAt" | "created_at" => PbiField::CreatedAt,
            "updatedAt" | "updated_at" => PbiField::UpdatedAt,
            other => return Err(FilterError::InvalidColumn(other.to_string())),
        })
    }
}

impl Sortable for PbiWithDetails {
    type Field = PbiField;

    fn sort_value(&self, field: PbiField) -> SortValue<'_> {
        let pbi = &self.pbi;
        match field {
            PbiField::Title => text(&pbi.title),
            PbiField::Priority => SortValue::Rank(pbi.priority.rank()),
            PbiField::StoryPoint => SortValue::Number(i64::from(pbi.story_point)),
            PbiField::Pic => text(&pbi.pic),
            PbiField::BusinessValue => text(&pbi.business_value),
            PbiField::UserStory => text(&pbi.user_story),
            PbiField::AcceptanceCriteria => text(&pbi.acceptance_criteria),
            PbiField::Notes => optional_text(pbi.notes.as_deref()),
            PbiField::EpicTitle => optional_text(self.epic_title.as_deref()),
            PbiField::BacklogTitle => text(&self.backlog_title),
            PbiField::CreatedAt => SortValue::Date(pbi.created_at),
            PbiField::UpdatedAt => SortValue::Date(pbi.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpicField {
    Title,
    Description,
    BacklogTitle,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for EpicField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "title" => EpicField::Title,
            "description" => EpicField::Description,
            "backlogTitle" | "backlog_title" | "backlog" => EpicField::BacklogTitle,
            "createdAt" | "created_at" => EpicField::CreatedAt,
            "updatedAt" | "updated_at" => EpicField::UpdatedAt,
            other => return Err(FilterError::InvalidColumn(other.to_string())),
        })
    }
}

impl Sortable for EpicWithBacklog {
    type Field = EpicField;

    fn sort_value(&self, field: EpicField) -> SortValue<'_> {
        match field {
            EpicField::Title => text(&self.epic.title),
            EpicField::Description => optional_text(self.epic.description.as_deref()),
            EpicField::BacklogTitle => text(&self.backlog_title),
            EpicField::CreatedAt => SortValue::Date(self.epic.created_at),
            EpicField::UpdatedAt => SortValue::Date(self.epic.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklogField {
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for BacklogField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "title" => BacklogField::Title,
            "description" => BacklogField::Description,
            "createdAt" | "created_at" => BacklogField::CreatedAt,
            "updatedAt" | "updated_at" => BacklogField::UpdatedAt,
            other => return Err(FilterError::InvalidColumn(other.to_string())),
        })
    }
}

impl Sortable for Backlog {
    type Field = BacklogField;

    fn sort_value(&self, field: BacklogField) -> SortValue<'_> {
        match field {
            BacklogField::Title => text(&self.title),
            BacklogField::Description => optional_text(self.description.as_deref()),
            BacklogField::CreatedAt => SortValue::Date(self.created_at),
            BacklogField::UpdatedAt => SortValue::Date(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Pbi, Priority};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn pbi(title: &str, priority: Priority, points: i32, epic: Option<&str>, minutes: i64) -> PbiWithDetails {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        PbiWithDetails {
            pbi: Pbi {
                id: Uuid::new_v4(),
                pic: "sam".to_string(),
                title: title.to_string(),
                priority,
                story_point: points,
                business_value: "value".to_string(),
                user_story: "story".to_string(),
                acceptance_criteria: "criteria".to_string(),
                notes: None,
                epic_id: epic.map(|_| Uuid::new_v4()),
                backlog_id: Uuid::nil(),
                created_at: base + Duration::minutes(minutes),
                updated_at: base + Duration::minutes(minutes),
            },
            backlog_title: "Sprint 1".to_string(),
            epic_title: epic.map(str::to_string),
        }
    }

    fn titles(items: &[PbiWithDetails]) -> Vec<&str> {
        items.iter().map(|p| p.pbi.title.as_str()).collect()
    }

    #[test]
    fn priority_ascending_is_high_medium_low() {
        let mut items = vec![
            pbi("a", Priority::Low, 1, None, 0),
            pbi("b", Priority::High, 1, None, 1),
            pbi("c", Priority::Medium, 1, None, 2),
            pbi("d", Priority::High, 1, None, 3),
        ];
        FilterOrder::sort(&mut items, &[SortSpec::asc(PbiField::Priority)]);
        assert_eq!(titles(&items), vec!["b", "d", "c", "a"]);

        FilterOrder::sort(&mut items, &[SortSpec::desc(PbiField::Priority)]);
        assert_eq!(items[0].pbi.priority, Priority::Low);
        assert_eq!(items[3].pbi.priority, Priority::High);
    }

    #[test]
    fn dates_sort_by_timestamp() {
        let mut items = vec![
            pbi("late", Priority::Low, 1, None, 30),
            pbi("early", Priority::Low, 1, None, -30),
            pbi("mid", Priority::Low, 1, None, 0),
        ];
        FilterOrder::sort(&mut items, &[SortSpec::asc(PbiField::CreatedAt)]);
        assert_eq!(titles(&items), vec!["early", "mid", "late"]);
        FilterOrder::sort(&mut items, &[SortSpec::desc(PbiField::CreatedAt)]);
        assert_eq!(titles(&items), vec!["late", "mid", "early"]);
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        let mut items = vec![
            pbi("none", Priority::Low, 1, None, 0),
            pbi("beta", Priority::Low, 1, Some("Beta"), 1),
            pbi("alpha", Priority::Low, 1, Some("alpha"), 2),
        ];
        FilterOrder::sort(&mut items, &[SortSpec::asc(PbiField::EpicTitle)]);
        assert_eq!(titles(&items), vec!["alpha", "beta", "none"]);
        FilterOrder::sort(&mut items, &[SortSpec::desc(PbiField::EpicTitle)]);
        assert_eq!(titles(&items), vec!["beta", "alpha", "none"]);
    }

    #[test]
    fn numbers_compare_numerically() {
        let mut items = vec![
            pbi("13", Priority::Low, 13, None, 0),
            pbi("2", Priority::Low, 2, None, 1),
            pbi("8", Priority::Low, 8, None, 2),
        ];
        FilterOrder::sort(&mut items, &[SortSpec::asc(PbiField::StoryPoint)]);
        assert_eq!(titles(&items), vec!["2", "8", "13"]);
    }

    #[test]
    fn secondary_keys_break_ties() {
        let mut items = vec![
            pbi("x", Priority::High, 3, None, 0),
            pbi("y", Priority::High, 8, None, 1),
            pbi("z", Priority::Low, 5, None, 2),
        ];
        let specs = FilterOrder::validate_and_parse::<PbiField>("priority, storyPoint desc").unwrap();
        FilterOrder::sort(&mut items, &specs);
        assert_eq!(titles(&items), vec!["y", "x", "z"]);
    }

    #[test]
    fn parse_rejects_unknown_fields_and_directions() {
        assert_eq!(
            FilterOrder::validate_and_parse::<PbiField>("colour asc").unwrap_err(),
            FilterError::InvalidColumn("colour".to_string())
        );
        assert!(FilterOrder::validate_and_parse::<PbiField>("title sideways").is_err());
        assert!(FilterOrder::validate_and_parse::<PbiField>("").unwrap().is_empty());
    }

    #[test]
    fn selecting_same_field_flips_direction() {
        let spec = SortSpec::desc(PbiField::CreatedAt);
        let flipped = spec.select(PbiField::CreatedAt);
        assert_eq!(flipped.direction, SortDirection::Asc);
        let other = flipped.select(PbiField::Title);
        assert_eq!(other, SortSpec::asc(PbiField::Title));
    }
}
