//! State management for DataTable.

use super::RowSelectionState;

use std::collections::BTreeMap;
use std::ops::Range;

/// Page size used when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Caller-supplied pagination settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Initial page size; [`DEFAULT_PAGE_SIZE`] when `None`
    pub page_size: Option<usize>,
    /// Sizes offered by the page-size control
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: None,
            page_size_options: vec![10, 20, 30, 40, 50],
        }
    }
}

impl PaginationConfig {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }
}

/// Current page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    /// `ceil(total_rows / page_size)`.
    pub fn page_count(&self, total_rows: usize) -> usize {
        if self.page_size == 0 {
            0
        } else {
            total_rows.div_ceil(self.page_size)
        }
    }

    /// Row range of the current page within `total_rows`.
    pub fn page_range(&self, total_rows: usize) -> Range<usize> {
        let start = (self.page_index * self.page_size).min(total_rows);
        let end = (start + self.page_size).min(total_rows);
        start..end
    }
}

/// Sort applied to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

/// When column width changes take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnResizeMode {
    /// Width updates while resizing
    #[default]
    Live,
}

/// Layout features the table exposes to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutFlags {
    pub columns_pinnable: bool,
    pub columns_movable: bool,
    pub columns_visibility: bool,
    pub cell_border: bool,
}

/// Which part of the table receives key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Rows,
    Search,
    Filters,
    Menu,
}

/// State for DataTable widget.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub pagination: PaginationState,
    /// Column sorts, applied in order
    pub sorting: Vec<ColumnSort>,
    pub row_selection: RowSelectionState,
    /// Columns explicitly hidden (`false`) or shown (`true`)
    pub column_visibility: BTreeMap<String, bool>,
    /// Explicit column order; unlisted columns keep their declared position after these
    pub column_order: Vec<String>,
    /// Columns pinned to the left edge
    pub column_pinning: Vec<String>,
    /// Logical width overrides
    pub column_sizing: BTreeMap<String, u16>,
    /// Cursor row within the current page
    pub cursor: usize,
    /// Focused column within the visible columns
    pub focused_column: usize,
    pub focus: Focus,
    /// Focused option in the filter bar
    pub filter_cursor: usize,
    /// Focused item in the open action menu
    pub menu_cursor: usize,
}

impl TableState {
    /// State with the configured initial page size.
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            pagination: PaginationState {
                page_index: 0,
                page_size: config.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            },
            ..Self::default()
        }
    }

    pub fn set_pagination(&mut self, pagination: PaginationState) {
        self.pagination = pagination;
        self.cursor = 0;
    }

    pub fn set_sorting(&mut self, sorting: Vec<ColumnSort>) {
        self.sorting = sorting;
    }

    pub fn set_row_selection(&mut self, selection: RowSelectionState) {
        self.row_selection = selection;
    }

    pub fn page_count(&self, total_rows: usize) -> usize {
        self.pagination.page_count(total_rows)
    }

    /// Keep the page index and cursor inside `total_rows`.
    pub fn clamp_to(&mut self, total_rows: usize) {
        let pages = self.page_count(total_rows);
        if pages == 0 {
            self.pagination.page_index = 0;
        } else if self.pagination.page_index >= pages {
            self.pagination.page_index = pages - 1;
        }
        let on_page = self.pagination.page_range(total_rows).len();
        if on_page == 0 {
            self.cursor = 0;
        } else if self.cursor >= on_page {
            self.cursor = on_page - 1;
        }
    }

    pub fn next_page(&mut self, total_rows: usize) -> bool {
        if self.pagination.page_index + 1 < self.page_count(total_rows) {
            self.pagination.page_index += 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.pagination.page_index > 0 {
            self.pagination.page_index -= 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    pub fn first_page(&mut self) {
        self.pagination.page_index = 0;
        self.cursor = 0;
    }

    pub fn last_page(&mut self, total_rows: usize) {
        self.pagination.page_index = self.page_count(total_rows).saturating_sub(1);
        self.cursor = 0;
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.pagination.page_size = page_size.max(1);
        self.first_page();
    }

    /// Step through `options` from the current page size.
    pub fn cycle_page_size(&mut self, options: &[usize], forward: bool) {
        if options.is_empty() {
            return;
        }
        let current = options
            .iter()
            .position(|&size| size == self.pagination.page_size);
        let next = match (current, forward) {
            (Some(i), true) => (i + 1).min(options.len() - 1),
            (Some(i), false) => i.saturating_sub(1),
            (None, _) => 0,
        };
        self.set_page_size(options[next]);
    }

    /// Sort direction of a column: `Some(true)` descending.
    pub fn sort_for(&self, column_id: &str) -> Option<bool> {
        self.sorting
            .iter()
            .find(|sort| sort.id == column_id)
            .map(|sort| sort.desc)
    }

    /// Cycle a column through ascending, descending and unsorted.
    pub fn toggle_sort(&mut self, column_id: &str) {
        self.sorting = match self.sort_for(column_id) {
            None => vec![ColumnSort {
                id: column_id.to_string(),
                desc: false,
            }],
            Some(false) => vec![ColumnSort {
                id: column_id.to_string(),
                desc: true,
            }],
            Some(true) => Vec::new(),
        };
        self.cursor = 0;
    }

    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.column_visibility.get(column_id).copied().unwrap_or(true)
    }

    pub fn toggle_column_visibility(&mut self, column_id: &str) {
        let visible = self.is_column_visible(column_id);
        self.column_visibility.insert(column_id.to_string(), !visible);
    }

    /// Show every column again.
    pub fn reset_column_visibility(&mut self) {
        self.column_visibility.clear();
    }

    pub fn is_pinned(&self, column_id: &str) -> bool {
        self.column_pinning.iter().any(|id| id == column_id)
    }

    pub fn toggle_column_pin(&mut self, column_id: &str) {
        if self.is_pinned(column_id) {
            self.column_pinning.retain(|id| id != column_id);
        } else {
            self.column_pinning.push(column_id.to_string());
        }
    }

    /// Move a column `delta` places within `current_order`.
    pub fn move_column(&mut self, column_id: &str, delta: isize, current_order: &[String]) {
        let mut order = current_order.to_vec();
        let Some(from) = order.iter().position(|id| id == column_id) else {
            return;
        };
        let to = (from as isize + delta).clamp(0, order.len() as isize - 1) as usize;
        let id = order.remove(from);
        order.insert(to, id);
        self.column_order = order;
    }

    /// Grow or shrink a column's logical width, applied immediately.
    pub fn resize_column(&mut self, column_id: &str, current_size: u16, delta: i32) {
        let size = (i32::from(current_size) + delta).clamp(30, 1_000) as u16;
        self.column_sizing.insert(column_id.to_string(), size);
    }

    /// Move the cursor by `delta` within a page of `page_len` rows.
    pub fn move_cursor(&mut self, delta: isize, page_len: usize) {
        if page_len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, page_len as isize - 1) as usize;
    }
}
