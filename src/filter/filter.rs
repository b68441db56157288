use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{Filterable, ListFilter, SortSpec, Sortable};

/// A list view: which rows to keep and how to order them.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    pub where_clause: ListFilter,
    pub order: Vec<SortSpec<F>>,
}

impl<F> Default for Filter<F> {
    fn default() -> Self {
        Self {
            where_clause: ListFilter::default(),
            order: Vec::new(),
        }
    }
}

impl<F> Filter<F>
where
    F: Copy + PartialEq + std::str::FromStr<Err = FilterError>,
{
    pub fn new(where_clause: ListFilter, order: Vec<SortSpec<F>>) -> Self {
        Self { where_clause, order }
    }

    pub fn with_order_str(mut self, order: &str) -> Result<Self, FilterError> {
        self.order = FilterOrder::validate_and_parse(order)?;
        Ok(self)
    }

    /// Recomputes the visible rows from scratch. Input order is preserved
    /// among rows the sort keys consider equal.
    pub fn apply<T>(&self, items: &[T]) -> Vec<T>
    where
        T: Sortable<Field = F> + Filterable + Clone,
    {
        let mut visible: Vec<T> = items
            .iter()
            .filter(|item| item.matches(&self.where_clause))
            .cloned()
            .collect();
        FilterOrder::sort(&mut visible, &self.order);
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Backlog;
    use crate::filter::BacklogField;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn backlog(title: &str, offset: i64) -> Backlog {
        let now = Utc::now();
        Backlog {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            user_id: Uuid::nil(),
            created_at: now + Duration::seconds(offset),
            updated_at: now + Duration::seconds(offset),
        }
    }

    #[test]
    fn apply_filters_then_sorts_without_touching_input() {
        let items = vec![backlog("b", 0), backlog("A", 1), backlog("c", 2)];
        let view = Filter::<BacklogField>::default().with_order_str("title desc").unwrap();
        let visible = view.apply(&items);
        let titles: Vec<_> = visible.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b", "A"]);
        assert_eq!(items[0].title, "b");

        let only = Filter::<BacklogField>::new(ListFilter::backlog(items[2].id), Vec::new());
        assert_eq!(only.apply(&items).len(), 1);
    }
}
