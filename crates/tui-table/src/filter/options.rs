//! Filter and sort options shown in the filter bar.

use super::SortOrder;
use crate::row::{label_of, TableRow};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A selectable category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
    /// Number of rows carrying this value, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl FilterOption {
    /// Option whose value equals its label.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: label.clone(),
            label,
            count: None,
        }
    }

    /// Set the row count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// A selectable sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub label: String,
    pub value: SortOrder,
}

impl SortOption {
    pub fn new(value: SortOrder) -> Self {
        Self {
            label: value.label().to_string(),
            value,
        }
    }
}

/// Latest, Oldest and Older.
pub fn default_sort_options() -> Vec<SortOption> {
    [SortOrder::Latest, SortOrder::Oldest, SortOrder::Older]
        .into_iter()
        .map(SortOption::new)
        .collect()
}

/// Filter options for the filter bar.
///
/// Options that already carry counts are returned as given. Otherwise every
/// object-valued field with a `label` is tallied across `data`, in order of
/// first appearance.
pub fn derive_filter_options<T: TableRow>(
    data: &[T],
    supplied: &[FilterOption],
) -> Vec<FilterOption> {
    if supplied.first().is_some_and(|o| o.count.is_some()) {
        return supplied.to_vec();
    }

    let mut options: Vec<FilterOption> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in data {
        for (_, value) in row.fields() {
            let Some(label) = label_of(&value) else {
                continue;
            };
            match positions.get(label) {
                Some(&pos) => {
                    if let Some(count) = options[pos].count.as_mut() {
                        *count += 1;
                    }
                }
                None => {
                    positions.insert(label.to_string(), options.len());
                    options.push(FilterOption::new(label).with_count(1));
                }
            }
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Record;
    use serde_json::json;

    fn merchants() -> Vec<Record> {
        vec![
            Record::new("1")
                .with("status", json!({"label": "Active"}))
                .with("risk", json!({"label": "Low"})),
            Record::new("2")
                .with("status", json!({"label": "Pending"}))
                .with("risk", json!({"label": "Low"})),
            Record::new("3")
                .with("status", json!({"label": "Active"}))
                .with("country", "NG"),
        ]
    }

    #[test]
    fn test_counts_labels() {
        let options = derive_filter_options(&merchants(), &[]);
        let counted: Vec<(&str, Option<usize>)> = options
            .iter()
            .map(|o| (o.label.as_str(), o.count))
            .collect();
        // Record fields iterate by name, so "risk" comes before "status".
        assert_eq!(
            counted,
            vec![("Low", Some(2)), ("Active", Some(2)), ("Pending", Some(1))]
        );
        assert!(options.iter().all(|o| o.label == o.value));
    }

    #[test]
    fn test_counted_options_pass_through() {
        let supplied = vec![FilterOption::new("Gold").with_count(9)];
        assert_eq!(derive_filter_options(&merchants(), &supplied), supplied);
    }

    #[test]
    fn test_uncounted_options_are_replaced() {
        let supplied = vec![FilterOption::new("Gold")];
        let options = derive_filter_options(&merchants(), &supplied);
        assert!(options.iter().all(|o| o.label != "Gold"));
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_no_labels_no_options() {
        let rows = vec![Record::new("1").with("name", "Amy")];
        assert!(derive_filter_options(&rows, &[]).is_empty());
    }

    #[test]
    fn test_default_sort_options() {
        let labels: Vec<String> = default_sort_options().into_iter().map(|o| o.label).collect();
        assert_eq!(labels, vec!["Latest", "Oldest", "Older"]);
    }
}
