//! Search, category filter and sort-order state over a list of rows.
//!
//! # Example
//!
//! ```ignore
//! use tui_table::{FilterUpdate, Record, SortOrder, TableFilters};
//!
//! let rows = vec![
//!     Record::new("3").with("name", "Bob"),
//!     Record::new("1").with("name", "Amy"),
//! ];
//!
//! let mut filters = TableFilters::new(["name"], SortOrder::Latest);
//! filters.update_filters(FilterUpdate::default().search("am"));
//! let visible = filters.apply(&rows);
//! ```

mod options;

pub use options::{default_sort_options, derive_filter_options, FilterOption, SortOption};

use crate::row::{label_of, search_text, string_form, TableRow};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Named ordering applied to the derived row list.
///
/// `Older` and `Oldest` both sort by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortOrder {
    /// Highest numeric id first
    #[default]
    Latest,
    /// Lowest numeric id first
    Oldest,
    /// Same ordering as `Oldest`
    Older,
    /// Keep the source order
    Unsorted,
}

impl SortOrder {
    /// Parse a sort key. Unknown keys leave the order unchanged.
    pub fn parse(key: &str) -> Self {
        match key {
            "latest" => Self::Latest,
            "oldest" => Self::Oldest,
            "older" => Self::Older,
            _ => Self::Unsorted,
        }
    }

    /// The key this order is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Oldest => "oldest",
            Self::Older => "older",
            Self::Unsorted => "none",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Latest => "Latest",
            Self::Oldest => "Oldest",
            Self::Older => "Older",
            Self::Unsorted => "Unsorted",
        }
    }

    /// Compare two row ids under this order.
    ///
    /// Ids that are not numbers sort after numeric ids in both directions.
    pub fn compare_ids(&self, a: &str, b: &str) -> Ordering {
        let descending = match self {
            Self::Latest => true,
            Self::Oldest | Self::Older => false,
            Self::Unsorted => return Ordering::Equal,
        };

        match (numeric_id(a), numeric_id(b)) {
            (Some(x), Some(y)) => {
                if descending {
                    y.total_cmp(&x)
                } else {
                    x.total_cmp(&y)
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Stable-sort row indices of `data` under this order.
    pub fn sort_indices<T: TableRow>(&self, data: &[T], indices: &mut [usize]) {
        if *self == Self::Unsorted {
            return;
        }
        let ids: Vec<String> = data.iter().map(TableRow::row_id).collect();
        indices.sort_by(|&a, &b| self.compare_ids(&ids[a], &ids[b]));
    }
}

impl From<String> for SortOrder {
    fn from(key: String) -> Self {
        Self::parse(&key)
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.key().to_string()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn numeric_id(id: &str) -> Option<f64> {
    id.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Current search, category filters and sort order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text search query
    pub search: String,
    /// Selected category values
    pub selected_filters: BTreeSet<String>,
    /// Active sort order
    pub sort_order: SortOrder,
}

impl FilterState {
    /// State with empty search and filters and the given sort order.
    pub fn with_sort(sort_order: SortOrder) -> Self {
        Self {
            sort_order,
            ..Self::default()
        }
    }
}

/// Partial update for [`TableFilters::update_filters`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub selected_filters: Option<BTreeSet<String>>,
    pub sort_order: Option<SortOrder>,
}

impl FilterUpdate {
    /// Replace the search query.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Replace the selected category values.
    pub fn selected_filters<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_filters = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the sort order.
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }
}

/// Predicate applied to every row while deriving the visible list.
pub type RowPredicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// Owns a [`FilterState`] and derives the filtered, sorted view of a row list.
#[derive(Debug, Clone)]
pub struct TableFilters {
    state: FilterState,
    search_fields: Vec<String>,
    default_sort: SortOrder,
    revision: u64,
}

impl TableFilters {
    /// Create filter state searching the given fields.
    pub fn new<I, S>(search_fields: I, default_sort: SortOrder) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: FilterState::with_sort(default_sort),
            search_fields: search_fields.into_iter().map(Into::into).collect(),
            default_sort,
            revision: 0,
        }
    }

    /// Current filter state.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Replace the searchable fields.
    pub fn set_search_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self.bump();
    }

    pub fn default_sort(&self) -> SortOrder {
        self.default_sort
    }

    /// Counter bumped by every mutation; used to memoize derived views.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Merge a partial update into the state.
    pub fn update_filters(&mut self, update: FilterUpdate) {
        if let Some(search) = update.search {
            self.state.search = search;
        }
        if let Some(selected) = update.selected_filters {
            self.state.selected_filters = selected;
        }
        if let Some(order) = update.sort_order {
            self.state.sort_order = order;
        }
        tracing::debug!(state = ?self.state, "filters updated");
        self.bump();
    }

    /// Add the value to the selected filters, or remove it if present.
    pub fn toggle_filter(&mut self, value: &str) {
        if !self.state.selected_filters.remove(value) {
            self.state.selected_filters.insert(value.to_string());
        }
        self.bump();
    }

    /// Clear the search query only.
    pub fn clear_search(&mut self) {
        self.state.search.clear();
        self.bump();
    }

    /// Reset search, filters and sort order to their defaults.
    pub fn clear_filters(&mut self) {
        self.state = FilterState::with_sort(self.default_sort);
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Row predicates for the current state, in application order.
    pub fn predicates<'a, T: TableRow + 'a>(&self) -> Vec<RowPredicate<'a, T>> {
        let mut predicates: Vec<RowPredicate<'a, T>> = Vec::new();

        if !self.state.search.is_empty() && !self.search_fields.is_empty() {
            let query = self.state.search.to_lowercase();
            let fields = self.search_fields.clone();
            predicates.push(Box::new(move |row: &T| {
                fields.iter().any(|name| {
                    row.field(name)
                        .and_then(|v| search_text(&v))
                        .is_some_and(|text| text.to_lowercase().contains(&query))
                })
            }));
        }

        if !self.state.selected_filters.is_empty() {
            let selected = self.state.selected_filters.clone();
            predicates.push(Box::new(move |row: &T| {
                let fields = row.fields();
                selected.iter().any(|wanted| {
                    fields.iter().any(|(_, value)| {
                        label_of(value) == Some(wanted.as_str())
                            || string_form(value).as_deref() == Some(wanted.as_str())
                    })
                })
            }));
        }

        predicates
    }

    /// Indices into `data` of the rows that pass, in display order.
    pub fn apply_indices<T: TableRow>(&self, data: &[T]) -> Vec<usize> {
        let predicates = self.predicates::<T>();
        let mut indices: Vec<usize> = (0..data.len()).collect();
        for predicate in &predicates {
            indices.retain(|&i| predicate(&data[i]));
        }
        self.state.sort_order.sort_indices(data, &mut indices);
        indices
    }

    /// The rows that pass, in display order.
    pub fn apply<'a, T: TableRow>(&self, data: &'a [T]) -> Vec<&'a T> {
        self.apply_indices(data).into_iter().map(|i| &data[i]).collect()
    }
}
