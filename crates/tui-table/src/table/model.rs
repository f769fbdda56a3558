//! Turns filtered rows, column declarations and table state into a
//! render-ready model.

use super::action::RowAction;
use super::column::{create_columns, ColumnDef, ColumnDescriptor};
use super::state::{ColumnResizeMode, LayoutFlags, PaginationState, TableState};
use crate::filter::FilterOption;
use crate::row::TableRow;

/// Everything needed to draw one pass of the table body.
#[derive(Debug)]
pub struct TableModel<'a, T> {
    /// Visible columns in display order; pinned columns first
    pub columns: Vec<ColumnDescriptor<T>>,
    /// Number of leading pinned columns
    pub pinned_count: usize,
    /// Rows of the current page
    pub rows: Vec<&'a T>,
    /// Ids of `rows`
    pub row_ids: Vec<String>,
    /// Rows across all pages after filtering
    pub total_rows: usize,
    pub page_count: usize,
    pub pagination: PaginationState,
    pub enable_row_selection: bool,
    pub column_resize_mode: ColumnResizeMode,
    pub filter_options: Vec<FilterOption>,
}

impl<'a, T: TableRow> TableModel<'a, T> {
    /// Row under the cursor.
    pub fn cursor_row(&self, state: &TableState) -> Option<&'a T> {
        self.rows.get(state.cursor).copied()
    }

    /// Column under the column cursor.
    pub fn focused_column(&self, state: &TableState) -> Option<&ColumnDescriptor<T>> {
        self.columns.get(state.focused_column)
    }

    /// Whether every row of the page is selected.
    pub fn page_selected(&self, state: &TableState) -> bool {
        state
            .row_selection
            .all_selected(self.row_ids.iter().map(String::as_str))
    }
}

/// Build the model for one render pass.
///
/// Column sorts from `state.sorting` are applied to `filtered` before
/// slicing out the current page; the page index is clamped when the data
/// shrank since the last pass.
pub fn configure<'a, T: TableRow>(
    mut filtered: Vec<&'a T>,
    columns: &[ColumnDef<T>],
    actions: &[RowAction<T>],
    selectable: bool,
    layout: LayoutFlags,
    state: &mut TableState,
) -> TableModel<'a, T> {
    let all_columns = create_columns(columns, selectable, actions);

    sort_rows(&mut filtered, &all_columns, state);

    let (columns, pinned_count) = arrange_columns(all_columns, layout, state);

    let total_rows = filtered.len();
    state.clamp_to(total_rows);
    if state.focused_column >= columns.len() {
        state.focused_column = columns.len().saturating_sub(1);
    }

    let range = state.pagination.page_range(total_rows);
    let rows: Vec<&'a T> = filtered[range].to_vec();
    let row_ids = rows.iter().map(|row| row.row_id()).collect();

    TableModel {
        columns,
        pinned_count,
        rows,
        row_ids,
        total_rows,
        page_count: state.page_count(total_rows),
        pagination: state.pagination,
        enable_row_selection: selectable,
        column_resize_mode: ColumnResizeMode::Live,
        filter_options: Vec::new(),
    }
}

fn sort_rows<T: TableRow>(rows: &mut [&T], columns: &[ColumnDescriptor<T>], state: &TableState) {
    let sorts: Vec<(&ColumnDescriptor<T>, bool)> = state
        .sorting
        .iter()
        .filter_map(|sort| {
            columns
                .iter()
                .find(|col| col.id == sort.id && col.enable_sorting)
                .map(|col| (col, sort.desc))
        })
        .collect();

    if sorts.is_empty() {
        return;
    }

    let mut keyed: Vec<(Vec<_>, &T)> = rows
        .iter()
        .map(|row| {
            let keys = sorts.iter().map(|(col, _)| col.value(row)).collect();
            (keys, *row)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        for (i, (_, desc)) in sorts.iter().enumerate() {
            let ord = a[i].cmp(&b[i]);
            let ord = if *desc { ord.reverse() } else { ord };
            if ord.is_ne() {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });

    for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
        *slot = row;
    }
}

fn arrange_columns<T>(
    mut columns: Vec<ColumnDescriptor<T>>,
    layout: LayoutFlags,
    state: &TableState,
) -> (Vec<ColumnDescriptor<T>>, usize) {
    for col in columns.iter_mut() {
        if col.enable_resizing {
            if let Some(size) = state.column_sizing.get(&col.id) {
                col.size = *size;
            }
        }
    }

    if layout.columns_visibility {
        columns.retain(|col| !col.enable_hiding || state.is_column_visible(&col.id));
    }

    if layout.columns_movable && !state.column_order.is_empty() {
        let rank = |id: &str| {
            state
                .column_order
                .iter()
                .position(|ordered| ordered == id)
                .unwrap_or(usize::MAX)
        };
        columns.sort_by_key(|col| rank(&col.id));
    }

    let mut pinned_count = 0;
    if layout.columns_pinnable && !state.column_pinning.is_empty() {
        let (pinned, rest): (Vec<_>, Vec<_>) = columns
            .into_iter()
            .partition(|col| state.is_pinned(&col.id));
        pinned_count = pinned.len();
        columns = pinned.into_iter().chain(rest).collect();
    }

    (columns, pinned_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Record;
    use crate::table::state::PaginationConfig;

    fn rows(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new(i.to_string())
                    .with("name", format!("Merchant {:02}", i))
                    .with("volume", (i * 37 % 11) as u64)
            })
            .collect()
    }

    fn columns() -> Vec<ColumnDef<Record>> {
        vec![
            ColumnDef::key("name", "Name"),
            ColumnDef::key("volume", "Volume"),
            ColumnDef::key("id", "Id").sortable(false).hideable(false),
        ]
    }

    fn ids<T: TableRow>(model: &TableModel<'_, T>) -> Vec<String> {
        model.row_ids.clone()
    }

    #[test]
    fn test_paginates() {
        let data = rows(25);
        let mut state = TableState::new(&PaginationConfig::default());
        let model = configure(
            data.iter().collect(),
            &columns(),
            &[],
            false,
            LayoutFlags::default(),
            &mut state,
        );
        assert_eq!(model.total_rows, 25);
        assert_eq!(model.page_count, 3);
        assert_eq!(model.rows.len(), 10);
        assert_eq!(model.row_ids[0], "1");
        assert_eq!(model.column_resize_mode, ColumnResizeMode::Live);
        assert!(!model.enable_row_selection);

        state.last_page(25);
        let model = configure(
            data.iter().collect(),
            &columns(),
            &[],
            true,
            LayoutFlags::default(),
            &mut state,
        );
        assert_eq!(ids(&model), vec!["21", "22", "23", "24", "25"]);
        assert!(model.enable_row_selection);
        assert_eq!(model.columns[0].id, "select");
    }

    #[test]
    fn test_page_index_clamps() {
        let data = rows(25);
        let mut state = TableState::default();
        state.last_page(25);
        let model = configure(
            data[..4].iter().collect(),
            &columns(),
            &[],
            false,
            LayoutFlags::default(),
            &mut state,
        );
        assert_eq!(model.pagination.page_index, 0);
        assert_eq!(model.rows.len(), 4);
    }

    #[test]
    fn test_column_sort() {
        let data = rows(5);
        let mut state = TableState::default();
        state.toggle_sort("volume");
        state.toggle_sort("volume");
        let model = configure(
            data.iter().collect(),
            &columns(),
            &[],
            false,
            LayoutFlags::default(),
            &mut state,
        );
        let volumes: Vec<u64> = model
            .rows
            .iter()
            .map(|r| r.get("volume").and_then(|v| v.as_u64()).unwrap())
            .collect();
        let mut expected = volumes.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(volumes, expected);
    }

    #[test]
    fn test_sort_ignored_for_unsortable_column() {
        let data = rows(5);
        let mut state = TableState::default();
        state.sorting = vec![crate::table::state::ColumnSort { id: "id".into(), desc: true }];
        let model = configure(
            data.iter().collect(),
            &columns(),
            &[],
            false,
            LayoutFlags::default(),
            &mut state,
        );
        assert_eq!(ids(&model), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_layout_flags() {
        let data = rows(3);
        let mut state = TableState::default();
        state.toggle_column_visibility("volume");
        state.toggle_column_visibility("id");
        state.toggle_column_pin("id");
        state.column_order = vec!["id".into(), "name".into()];

        let off = configure(
            data.iter().collect(),
            &columns(),
            &[],
            false,
            LayoutFlags::default(),
            &mut state,
        );
        let col_ids: Vec<&str> = off.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(col_ids, vec!["name", "volume", "id"]);

        let layout = LayoutFlags {
            columns_pinnable: true,
            columns_movable: true,
            columns_visibility: true,
            cell_border: false,
        };
        let on = configure(data.iter().collect(), &columns(), &[], false, layout, &mut state);
        let col_ids: Vec<&str> = on.columns.iter().map(|c| c.id.as_str()).collect();
        // "volume" is hidden; "id" is not hideable, so it stays and is pinned first.
        assert_eq!(col_ids, vec!["id", "name"]);
        assert_eq!(on.pinned_count, 1);
    }

    #[test]
    fn test_resize_applies_immediately() {
        let data = rows(1);
        let mut state = TableState::default();
        state.resize_column("name", 180, 50);
        let model = configure(
            data.iter().collect(),
            &columns(),
            &[],
            false,
            LayoutFlags::default(),
            &mut state,
        );
        assert_eq!(model.columns[0].size, 230);
    }
}
