//! Row selection keyed by row id.

use std::collections::BTreeMap;

/// Map of row id to selected flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSelectionState {
    rows: BTreeMap<String, bool>,
}

impl RowSelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.rows.get(id).copied().unwrap_or(false)
    }

    /// Set the flag for one row.
    pub fn set(&mut self, id: impl Into<String>, selected: bool) {
        let id = id.into();
        if selected {
            self.rows.insert(id, true);
        } else {
            self.rows.remove(&id);
        }
    }

    /// Toggle one row.
    pub fn toggle(&mut self, id: &str) {
        let selected = self.is_selected(id);
        self.set(id, !selected);
    }

    /// Whether every id in `ids` is selected. False for an empty list.
    pub fn all_selected<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for id in ids {
            if !self.is_selected(id) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Select every id in `ids`, or clear them all if they are already selected.
    pub fn toggle_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str> + Clone) {
        let select = !self.all_selected(ids.clone());
        for id in ids {
            self.set(id, select);
        }
    }

    /// Get the count of selected rows.
    pub fn count(&self) -> usize {
        self.rows.values().filter(|selected| **selected).count()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Clear selection.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Drop ids not present in `ids`.
    pub fn retain_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = ids.into_iter().collect();
        self.rows.retain(|id, _| keep.contains(id.as_str()));
    }
}

impl FromIterator<(String, bool)> for RowSelectionState {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (id, selected) in iter {
            state.set(id, selected);
        }
        state
    }
}
