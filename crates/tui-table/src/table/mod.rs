//! DataTable widget - searchable, filterable, paginated table with row actions.
//!
//! # Example
//!
//! ```ignore
//! use tui_table::{ColumnDef, DataTable, Record, RowAction, SortOrder};
//!
//! let rows = vec![
//!     Record::new("1").with("name", "Amy").with("status", json!({"label": "Active"})),
//!     Record::new("2").with("name", "Bob").with("status", json!({"label": "Pending"})),
//! ];
//!
//! let table = DataTable::new(
//!     vec![ColumnDef::key("name", "Name"), ColumnDef::key("status", "Status")],
//!     rows,
//! )
//! .title("Merchants")
//! .search_fields(["name"])
//! .default_sort(SortOrder::Latest)
//! .actions(vec![RowAction::new("View", |row: &Record| open(row))])
//! .selectable(true);
//!
//! let mut state = table.initial_state();
//! frame.render_stateful_widget(&table, area, &mut state);
//! ```

mod action;
mod cell;
mod column;
mod model;
mod selection;
mod state;

pub use action::{build_action_menu, ActionMenu, ActionVariant, MenuEntry, MenuItem, RowAction};
pub use cell::CellContent;
pub use column::{
    create_columns, Accessor, ColumnDef, ColumnDescriptor, ColumnKind, ColumnMeta, HeaderContext,
    HeaderDef, HeaderRenderer,
};
pub use model::TableModel;
pub use selection::RowSelectionState;
pub use state::{
    ColumnResizeMode, ColumnSort, Focus, LayoutFlags, PaginationConfig, PaginationState,
    TableState,
};

use crate::filter::{
    default_sort_options, derive_filter_options, FilterOption, FilterUpdate, SortOption,
    SortOrder, TableFilters,
};
use crate::format::truncate;
use crate::row::TableRow;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

use std::cell::{Cell, RefCell};

/// What the table shows on a given pass.
pub enum TableView<'a, T> {
    /// `loading` is set; no rows were processed
    Loading,
    /// There is no data at all
    Empty { description: &'a str },
    /// Filtered, sorted and paginated rows ready to draw
    Ready(TableModel<'a, T>),
}

/// Memoized output of the filter state.
struct Derived {
    data_revision: u64,
    filter_revision: u64,
    indices: Vec<usize>,
}

/// Snapshot of the current page taken before handling a key, so that the
/// handler can mutate the table without holding a borrow of its rows.
struct PageInfo {
    row_ids: Vec<String>,
    total_rows: usize,
    column_ids: Vec<String>,
    focused: Option<FocusedColumn>,
    filter_values: Vec<String>,
}

struct FocusedColumn {
    id: String,
    enable_sorting: bool,
    enable_hiding: bool,
    enable_resizing: bool,
    size: u16,
}

/// Composite table: filter bar, toolbar, body, and pagination footer.
pub struct DataTable<T> {
    data: Vec<T>,
    data_revision: u64,
    columns: Vec<ColumnDef<T>>,
    actions: Vec<RowAction<T>>,
    filters: TableFilters,
    title: Option<String>,
    subtitle: Option<String>,
    enable_search: bool,
    search_placeholder: String,
    enable_filter: bool,
    filter_options: Vec<FilterOption>,
    enable_sort: bool,
    sort_options: Vec<SortOption>,
    selectable: bool,
    pagination: PaginationConfig,
    toolbar: Option<Line<'static>>,
    layout: LayoutFlags,
    loading: bool,
    empty_description: String,
    on_row_click: Option<Box<dyn Fn(&T)>>,
    style: Style,
    block: Option<Block<'static>>,
    derived: RefCell<Option<Derived>>,
    derivations: Cell<usize>,
}

impl<T: TableRow> DataTable<T> {
    /// Create a new DataTable with columns and data.
    pub fn new(columns: Vec<ColumnDef<T>>, data: Vec<T>) -> Self {
        Self {
            data,
            data_revision: 0,
            columns,
            actions: Vec::new(),
            filters: TableFilters::new(Vec::<String>::new(), SortOrder::default()),
            title: None,
            subtitle: None,
            enable_search: true,
            search_placeholder: "Search...".to_string(),
            enable_filter: true,
            filter_options: Vec::new(),
            enable_sort: true,
            sort_options: default_sort_options(),
            selectable: false,
            pagination: PaginationConfig::default(),
            toolbar: None,
            layout: LayoutFlags::default(),
            loading: false,
            empty_description: "No records to display.".to_string(),
            on_row_click: None,
            style: Style::default(),
            block: None,
            derived: RefCell::new(None),
            derivations: Cell::new(0),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Fields matched by the search box.
    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.set_search_fields(fields);
        self
    }

    /// Show or hide the search box.
    pub fn search(mut self, enabled: bool) -> Self {
        self.enable_search = enabled;
        self
    }

    pub fn search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    /// Show or hide the category filters.
    pub fn filter(mut self, enabled: bool) -> Self {
        self.enable_filter = enabled;
        self
    }

    /// Category filters. Options without counts are replaced by options
    /// derived from the data.
    pub fn filter_options(mut self, options: Vec<FilterOption>) -> Self {
        self.filter_options = options;
        self
    }

    /// Show or hide the sort selector.
    pub fn sort(mut self, enabled: bool) -> Self {
        self.enable_sort = enabled;
        self
    }

    pub fn sort_options(mut self, options: Vec<SortOption>) -> Self {
        self.sort_options = options;
        self
    }

    /// Sort order used initially and restored by clearing the filters.
    pub fn default_sort(mut self, order: SortOrder) -> Self {
        self.filters = TableFilters::new(self.filters.search_fields().to_vec(), order);
        self
    }

    pub fn actions(mut self, actions: Vec<RowAction<T>>) -> Self {
        self.actions = actions;
        self
    }

    /// Add a checkbox column for row selection.
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn pagination(mut self, config: PaginationConfig) -> Self {
        self.pagination = config;
        self
    }

    /// Content shown under the filter bar.
    pub fn toolbar(mut self, toolbar: Line<'static>) -> Self {
        self.toolbar = Some(toolbar);
        self
    }

    pub fn layout(mut self, layout: LayoutFlags) -> Self {
        self.layout = layout;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Message shown when there is no data.
    pub fn empty_description(mut self, description: impl Into<String>) -> Self {
        self.empty_description = description.into();
        self
    }

    /// Set row click callback (Enter on the cursor row).
    pub fn on_row_click(mut self, f: impl Fn(&T) + 'static) -> Self {
        self.on_row_click = Some(Box::new(f));
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the block wrapper.
    pub fn block(mut self, block: Block<'static>) -> Self {
        self.block = Some(block);
        self
    }

    /// A fresh [`TableState`] honoring the pagination config.
    pub fn initial_state(&self) -> TableState {
        TableState::new(&self.pagination)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Replace the rows.
    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        self.data_revision = self.data_revision.wrapping_add(1);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filters(&self) -> &TableFilters {
        &self.filters
    }

    /// Filter mutators for callers wiring their own controls.
    pub fn filters_mut(&mut self) -> &mut TableFilters {
        &mut self.filters
    }

    pub fn row_actions(&self) -> &[RowAction<T>] {
        &self.actions
    }

    /// Find a row by id.
    pub fn row(&self, id: &str) -> Option<&T> {
        self.data.iter().find(|row| row.row_id() == id)
    }

    /// Drop selected ids that are no longer in the data.
    pub fn sync_selection(&self, state: &mut TableState) {
        if state.row_selection.is_empty() {
            return;
        }
        let ids: Vec<String> = self.data.iter().map(|row| row.row_id()).collect();
        let before = state.row_selection.count();
        state.row_selection.retain_ids(ids.iter().map(String::as_str));
        if state.row_selection.count() != before {
            tracing::debug!(
                dropped = before - state.row_selection.count(),
                "pruned selection of removed rows"
            );
        }
    }

    /// How many times the filtered view has been recomputed.
    pub fn derivation_count(&self) -> usize {
        self.derivations.get()
    }

    fn derived_indices(&self) -> Vec<usize> {
        let filter_revision = self.filters.revision();
        let mut cache = self.derived.borrow_mut();
        if let Some(derived) = cache.as_ref() {
            if derived.data_revision == self.data_revision
                && derived.filter_revision == filter_revision
            {
                return derived.indices.clone();
            }
        }

        let indices = self.filters.apply_indices(&self.data);
        self.derivations.set(self.derivations.get() + 1);
        tracing::debug!(
            rows = self.data.len(),
            visible = indices.len(),
            "derived table view"
        );
        *cache = Some(Derived {
            data_revision: self.data_revision,
            filter_revision,
            indices: indices.clone(),
        });
        indices
    }

    /// Decide what to show and build the model for it.
    pub fn view(&self, state: &mut TableState) -> TableView<'_, T> {
        if self.loading {
            return TableView::Loading;
        }
        self.sync_selection(state);
        if self.data.is_empty() {
            return TableView::Empty {
                description: &self.empty_description,
            };
        }

        let filtered: Vec<&T> = self
            .derived_indices()
            .into_iter()
            .map(|i| &self.data[i])
            .collect();

        let mut model = model::configure(
            filtered,
            &self.columns,
            &self.actions,
            self.selectable,
            self.layout,
            state,
        );
        if self.enable_filter {
            model.filter_options = derive_filter_options(&self.data, &self.filter_options);
        }
        TableView::Ready(model)
    }

    fn page_info(&self, state: &mut TableState) -> Option<PageInfo> {
        let TableView::Ready(model) = self.view(state) else {
            return None;
        };
        let focused = model.focused_column(state).map(|col| FocusedColumn {
            id: col.id.clone(),
            enable_sorting: col.enable_sorting,
            enable_hiding: col.enable_hiding,
            enable_resizing: col.enable_resizing,
            size: col.size,
        });
        Some(PageInfo {
            row_ids: model.row_ids.clone(),
            total_rows: model.total_rows,
            column_ids: model.columns.iter().map(|col| col.id.clone()).collect(),
            focused,
            filter_values: model
                .filter_options
                .iter()
                .map(|opt| opt.value.clone())
                .collect(),
        })
    }

    /// Handle a key event. Returns whether the table consumed it.
    pub fn handle_key(&mut self, key: KeyEvent, state: &mut TableState) -> bool {
        let Some(page) = self.page_info(state) else {
            return false;
        };

        match state.focus {
            Focus::Rows => self.handle_row_key(key, state, page),
            Focus::Search => self.handle_search_key(key, state),
            Focus::Filters => self.handle_filter_key(key, state, page),
            Focus::Menu => self.handle_menu_key(key, state, page),
        }
    }

    fn handle_row_key(&mut self, key: KeyEvent, state: &mut TableState, page: PageInfo) -> bool {
        let page_len = page.row_ids.len();
        let cursor_id = page.row_ids.get(state.cursor).cloned();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => state.move_cursor(-1, page_len),
            KeyCode::Down | KeyCode::Char('j') => state.move_cursor(1, page_len),
            KeyCode::Left => {
                state.previous_page();
            }
            KeyCode::Right => {
                state.next_page(page.total_rows);
            }
            KeyCode::Home => state.first_page(),
            KeyCode::End => state.last_page(page.total_rows),
            KeyCode::Char('<') => state.focused_column = state.focused_column.saturating_sub(1),
            KeyCode::Char('>') => {
                if state.focused_column + 1 < page.column_ids.len() {
                    state.focused_column += 1;
                }
            }
            KeyCode::Char('/') if self.enable_search => state.focus = Focus::Search,
            KeyCode::Char('f') if self.enable_filter && !page.filter_values.is_empty() => {
                state.focus = Focus::Filters;
                state.filter_cursor = state.filter_cursor.min(page.filter_values.len() - 1);
            }
            KeyCode::Char('s') if self.enable_sort && !self.sort_options.is_empty() => {
                self.cycle_sort_order();
                state.first_page();
            }
            KeyCode::Char('o') => match page.focused {
                Some(col) if col.enable_sorting => state.toggle_sort(&col.id),
                _ => return false,
            },
            KeyCode::Char(' ') if self.selectable => match cursor_id {
                Some(id) => state.row_selection.toggle(&id),
                None => return false,
            },
            KeyCode::Char('A') if self.selectable => {
                state
                    .row_selection
                    .toggle_all(page.row_ids.iter().map(String::as_str));
            }
            KeyCode::Enter => {
                let row = cursor_id.as_deref().and_then(|id| self.row(id));
                match (row, &self.on_row_click) {
                    (Some(row), Some(callback)) => callback(row),
                    _ => return false,
                }
            }
            KeyCode::Char('m') => {
                let has_menu = cursor_id
                    .as_deref()
                    .and_then(|id| self.row(id))
                    .and_then(|row| build_action_menu(&self.actions, row))
                    .is_some();
                if !has_menu {
                    return false;
                }
                state.focus = Focus::Menu;
                state.menu_cursor = 0;
            }
            KeyCode::Char('+') => state.cycle_page_size(&self.pagination.page_size_options, true),
            KeyCode::Char('-') => state.cycle_page_size(&self.pagination.page_size_options, false),
            KeyCode::Char('h') if self.layout.columns_visibility => match page.focused {
                Some(col) if col.enable_hiding => state.toggle_column_visibility(&col.id),
                _ => return false,
            },
            KeyCode::Char('H') if self.layout.columns_visibility => state.reset_column_visibility(),
            KeyCode::Char('p') if self.layout.columns_pinnable => match page.focused {
                Some(col) => state.toggle_column_pin(&col.id),
                None => return false,
            },
            KeyCode::Char('[') | KeyCode::Char(']') if self.layout.columns_movable => {
                let delta = if key.code == KeyCode::Char('[') { -1 } else { 1 };
                match page.focused {
                    Some(col) => {
                        state.move_column(&col.id, delta, &page.column_ids);
                        state.focused_column = (state.focused_column as isize + delta)
                            .clamp(0, page.column_ids.len() as isize - 1)
                            as usize;
                    }
                    None => return false,
                }
            }
            KeyCode::Char('{') | KeyCode::Char('}') => {
                let delta = if key.code == KeyCode::Char('{') { -10 } else { 10 };
                match page.focused {
                    Some(col) if col.enable_resizing => {
                        state.resize_column(&col.id, col.size, delta)
                    }
                    _ => return false,
                }
            }
            KeyCode::Esc => {
                let filters = self.filters.state();
                if !filters.search.is_empty() {
                    self.filters.clear_search();
                } else if !filters.selected_filters.is_empty()
                    || filters.sort_order != self.filters.default_sort()
                {
                    self.filters.clear_filters();
                } else {
                    return false;
                }
                state.first_page();
            }
            _ => return false,
        }
        true
    }

    fn cycle_sort_order(&mut self) {
        let current = self.filters.state().sort_order;
        let next = match self.sort_options.iter().position(|opt| opt.value == current) {
            Some(i) => (i + 1) % self.sort_options.len(),
            None => 0,
        };
        let order = self.sort_options[next].value;
        self.filters
            .update_filters(FilterUpdate::default().sort_order(order));
    }

    fn handle_search_key(&mut self, key: KeyEvent, state: &mut TableState) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut search = self.filters.state().search.clone();
                search.push(c);
                self.filters.update_filters(FilterUpdate::default().search(search));
                state.first_page();
            }
            KeyCode::Backspace => {
                let mut search = self.filters.state().search.clone();
                if search.pop().is_none() {
                    return true;
                }
                self.filters.update_filters(FilterUpdate::default().search(search));
                state.first_page();
            }
            KeyCode::Enter | KeyCode::Down => state.focus = Focus::Rows,
            KeyCode::Esc => {
                self.filters.clear_search();
                state.first_page();
                state.focus = Focus::Rows;
            }
            _ => return false,
        }
        true
    }

    fn handle_filter_key(&mut self, key: KeyEvent, state: &mut TableState, page: PageInfo) -> bool {
        let count = page.filter_values.len();
        if count == 0 {
            state.focus = Focus::Rows;
            return false;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                state.filter_cursor = state.filter_cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                state.filter_cursor = (state.filter_cursor + 1).min(count - 1);
            }
            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => {
                if let Some(value) = page.filter_values.get(state.filter_cursor) {
                    self.filters.toggle_filter(value);
                    state.first_page();
                }
            }
            KeyCode::Char('c') => {
                self.filters
                    .update_filters(FilterUpdate::default().selected_filters(Vec::<String>::new()));
                state.first_page();
            }
            KeyCode::Esc | KeyCode::Char('f') | KeyCode::Down => state.focus = Focus::Rows,
            _ => return false,
        }
        true
    }

    fn handle_menu_key(&mut self, key: KeyEvent, state: &mut TableState, page: PageInfo) -> bool {
        let row = page
            .row_ids
            .get(state.cursor)
            .and_then(|id| self.row(id));
        let Some(row) = row else {
            state.focus = Focus::Rows;
            return false;
        };
        let Some(menu) = build_action_menu(&self.actions, row) else {
            state.focus = Focus::Rows;
            return false;
        };
        let count = menu.item_count();

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                state.menu_cursor = (state.menu_cursor + 1).min(count - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                state.menu_cursor = state.menu_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                if menu.activate(state.menu_cursor, &self.actions, row) {
                    state.focus = Focus::Rows;
                }
            }
            KeyCode::Esc | KeyCode::Char('m') => state.focus = Focus::Rows,
            _ => return false,
        }
        true
    }
}

impl<T: TableRow> StatefulWidget for &DataTable<T> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Render block if present
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width < 3 || inner.height < 2 {
            return;
        }
        buf.set_style(inner, self.style);

        match self.view(state) {
            TableView::Loading => {
                let dim = Style::default().fg(Color::DarkGray);
                render_centered(inner, buf, &[("Loading...", dim)]);
            }
            TableView::Empty { description } => self.render_empty(inner, buf, description),
            TableView::Ready(model) => self.render_ready(&model, inner, buf, state),
        }
    }
}

impl<T: TableRow> DataTable<T> {
    fn render_empty(&self, area: Rect, buf: &mut Buffer, description: &str) {
        let mut body = area;
        if let Some(title) = &self.title {
            buf.set_string(area.x, area.y, title, Style::default().add_modifier(Modifier::BOLD));
            body.y += 1;
            body.height -= 1;
        }
        render_centered(
            body,
            buf,
            &[
                ("No data", Style::default().add_modifier(Modifier::BOLD)),
                (description, Style::default().fg(Color::DarkGray)),
            ],
        );
    }

    fn render_ready(
        &self,
        model: &TableModel<'_, T>,
        area: Rect,
        buf: &mut Buffer,
        state: &mut TableState,
    ) {
        let header_height = u16::from(self.title.is_some()) + u16::from(self.subtitle.is_some());
        let filter_bar = self.enable_search || self.enable_sort || !model.filter_options.is_empty();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Length(u16::from(filter_bar)),
                Constraint::Length(u16::from(self.toolbar.is_some())),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        if filter_bar {
            self.render_filter_bar(model, chunks[1], buf, state);
        }
        if let Some(toolbar) = &self.toolbar {
            buf.set_line(chunks[2].x, chunks[2].y, toolbar, chunks[2].width);
        }
        self.render_body(model, chunks[3], buf, state);
        render_footer(model, chunks[4], buf, state);
        if state.focus == Focus::Menu {
            self.render_menu(model, chunks[3], buf, state);
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let mut y = area.y;
        if let Some(title) = &self.title {
            let bold = Style::default().add_modifier(Modifier::BOLD);
            buf.set_stringn(area.x, y, title, area.width as usize, bold);
            y += 1;
        }
        if let Some(subtitle) = &self.subtitle {
            let dim = Style::default().fg(Color::DarkGray);
            buf.set_stringn(area.x, y, subtitle, area.width as usize, dim);
        }
    }

    fn render_filter_bar(
        &self,
        model: &TableModel<'_, T>,
        area: Rect,
        buf: &mut Buffer,
        state: &TableState,
    ) {
        let filters = self.filters.state();
        let mut spans: Vec<Span> = Vec::new();

        if self.enable_search {
            spans.push(Span::raw("/ "));
            if filters.search.is_empty() && state.focus != Focus::Search {
                spans.push(Span::styled(
                    self.search_placeholder.clone(),
                    Style::default().fg(Color::DarkGray),
                ));
            } else {
                spans.push(Span::raw(filters.search.clone()));
            }
            if state.focus == Focus::Search {
                spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
            }
            spans.push(Span::raw("  "));
        }

        for (i, option) in model.filter_options.iter().enumerate() {
            let checked = filters.selected_filters.contains(&option.value);
            let mut text = format!("[{}] {}", if checked { "x" } else { " " }, option.label);
            if let Some(count) = option.count {
                text.push_str(&format!(" ({})", count));
            }
            let mut style = Style::default();
            if checked {
                style = style.fg(Color::Cyan);
            }
            if state.focus == Focus::Filters && state.filter_cursor == i {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }

        if self.enable_sort {
            spans.push(Span::raw(" Sort: "));
            spans.push(Span::styled(
                filters.sort_order.label(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }

    fn render_body(
        &self,
        model: &TableModel<'_, T>,
        area: Rect,
        buf: &mut Buffer,
        state: &mut TableState,
    ) {
        if area.height == 0 {
            return;
        }

        let visible_height = area.height.saturating_sub(1) as usize;

        let placed = place_columns(model, area, state.focused_column);

        // Header row
        let page_selected = model.page_selected(state);
        for &(col_idx, x, width) in &placed {
            let col = &model.columns[col_idx];
            let ctx = HeaderContext {
                sorted_desc: state.sort_for(&col.id),
            };
            let header = col.header.render(&ctx, page_selected);
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if state.focus == Focus::Rows && col_idx == state.focused_column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            put_aligned(buf, x, area.y, width, &header, col.meta.align, style);
        }

        if model.rows.is_empty() {
            let body = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
            let dim = Style::default().fg(Color::DarkGray);
            render_centered(body, buf, &[("No matching results", dim)]);
            return;
        }

        let offset = row_offset(state.cursor, visible_height);
        for (row_offset, (row, id)) in model
            .rows
            .iter()
            .zip(&model.row_ids)
            .skip(offset)
            .take(visible_height)
            .enumerate()
        {
            let y = area.y + 1 + row_offset as u16;
            let display_idx = offset + row_offset;
            let is_cursor = display_idx == state.cursor && state.focus != Focus::Search;
            let selected = state.row_selection.is_selected(id);

            // Determine row style
            let row_style = if is_cursor {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if display_idx % 2 == 0 {
                Style::default()
            } else {
                Style::default().bg(Color::Rgb(30, 30, 30))
            };
            let row_style = if selected {
                row_style.add_modifier(Modifier::BOLD)
            } else {
                row_style
            };

            // Clear row background
            buf.set_style(Rect::new(area.x, y, area.width, 1), row_style);

            for &(col_idx, x, width) in &placed {
                let col = &model.columns[col_idx];
                let cell = col.render_cell(row, selected);
                let style = match cell.color() {
                    Some(color) if !is_cursor && color != Color::Reset => row_style.fg(color),
                    _ => row_style,
                };
                put_aligned(buf, x, y, width, &cell.to_string(), col.meta.align, style);
            }
        }

        if self.layout.cell_border {
            let rows = (model.rows.len().saturating_sub(offset)).min(visible_height) as u16;
            for &(_, x, width) in placed.iter().take(placed.len().saturating_sub(1)) {
                let sep_x = x + width;
                if sep_x >= area.right() {
                    continue;
                }
                for y in area.y..area.y + 1 + rows {
                    buf[(sep_x, y)].set_char('\u{2502}');
                }
            }
        }
    }

    fn render_menu(
        &self,
        model: &TableModel<'_, T>,
        body: Rect,
        buf: &mut Buffer,
        state: &TableState,
    ) {
        let Some(row) = model.cursor_row(state) else {
            return;
        };
        let Some(menu) = build_action_menu(&self.actions, row) else {
            return;
        };

        let label_width = menu
            .items()
            .map(|item| item.label.width())
            .max()
            .unwrap_or(0) as u16;
        let width = (label_width + 4).max(12).min(body.width);
        let height = (menu.entries.len() as u16 + 2).min(body.height);

        let visible_height = body.height.saturating_sub(1) as usize;
        let offset = row_offset(state.cursor, visible_height);
        let cursor_y = body.y + 1 + (state.cursor - offset) as u16;
        let mut y = cursor_y + 1;
        if y + height > body.bottom() {
            y = body.bottom().saturating_sub(height);
        }
        let popup = Rect::new(body.right().saturating_sub(width + 1), y, width, height);

        Clear.render(popup, buf);
        let block = Block::default().borders(Borders::ALL).title(" Actions ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut item_index = 0;
        for (i, entry) in menu.entries.iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.bottom() {
                break;
            }
            match entry {
                MenuEntry::Separator => {
                    let line = "\u{2500}".repeat(inner.width as usize);
                    buf.set_string(inner.x, y, line, Style::default().fg(Color::DarkGray));
                }
                MenuEntry::Item(item) => {
                    let mut style = if item.disabled {
                        Style::default().fg(Color::DarkGray)
                    } else if item.destructive {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default()
                    };
                    if item_index == state.menu_cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    let text = truncate(&format!(" {}", item.label), inner.width as usize);
                    let w = inner.width as usize;
                    buf.set_stringn(inner.x, y, format!("{:<w$}", text), w, style);
                    item_index += 1;
                }
            }
        }
    }
}

fn render_footer<T>(model: &TableModel<'_, T>, area: Rect, buf: &mut Buffer, state: &TableState) {
    let range = model.pagination.page_range(model.total_rows);
    let mut left = if model.total_rows == 0 {
        "No matching rows".to_string()
    } else {
        format!("Showing {}-{} of {}", range.start + 1, range.end, model.total_rows)
    };
    let selected = state.row_selection.count();
    if model.enable_row_selection && selected > 0 {
        left.push_str(&format!(" \u{b7} {} selected", selected));
    }

    let right = format!(
        "Page {} of {} \u{b7} {} / page",
        model.pagination.page_index + 1,
        model.page_count.max(1),
        model.pagination.page_size
    );

    let dim = Style::default().fg(Color::DarkGray);
    buf.set_stringn(area.x, area.y, &left, area.width as usize, dim);
    let right_width = right.width() as u16;
    if right_width + left.width() as u16 + 2 <= area.width {
        buf.set_string(area.right() - right_width, area.y, &right, dim);
    }
}

/// First page row drawn so that the cursor stays visible.
fn row_offset(cursor: usize, visible_height: usize) -> usize {
    if visible_height == 0 || cursor < visible_height {
        0
    } else {
        cursor + 1 - visible_height
    }
}

/// Place columns left to right as `(column index, x, width)`.
///
/// Pinned columns always come first; the remaining columns scroll so that
/// the focused one is on screen.
fn place_columns<T: TableRow>(
    model: &TableModel<'_, T>,
    area: Rect,
    focused: usize,
) -> Vec<(usize, u16, u16)> {
    let widths: Vec<u16> = model.columns.iter().map(|col| col.width()).collect();
    let pinned = model.pinned_count.min(widths.len());
    let pinned_width: u16 = widths[..pinned].iter().map(|w| w + 1).sum();

    let mut start = pinned;
    if focused >= pinned && focused < widths.len() {
        loop {
            let span: u16 = widths[start..=focused].iter().map(|w| w + 1).sum();
            if pinned_width + span <= area.width || start == focused {
                break;
            }
            start += 1;
        }
    }

    let mut placed = Vec::new();
    let mut x = area.x;
    for idx in (0..pinned).chain(start..widths.len()) {
        if x >= area.right() {
            break;
        }
        let width = widths[idx].min(area.right() - x);
        placed.push((idx, x, width));
        x = x.saturating_add(width + 1);
    }
    placed
}

fn put_aligned(
    buf: &mut Buffer,
    x: u16,
    y: u16,
    width: u16,
    text: &str,
    align: Alignment,
    style: Style,
) {
    let text = truncate(text, width as usize);
    let text_width = text.width() as u16;
    let pad = width.saturating_sub(text_width);
    let x = match align {
        Alignment::Left => x,
        Alignment::Center => x + pad / 2,
        Alignment::Right => x + pad,
    };
    buf.set_string(x, y, &text, style);
}

fn render_centered(area: Rect, buf: &mut Buffer, lines: &[(&str, Style)]) {
    let top = area.y + area.height.saturating_sub(lines.len() as u16) / 2;
    for (i, (text, style)) in lines.iter().enumerate() {
        let y = top + i as u16;
        if y >= area.bottom() {
            break;
        }
        let text = truncate(text, area.width as usize);
        let x = area.x + area.width.saturating_sub(text.width() as u16) / 2;
        buf.set_string(x, y, &text, *style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Record;
    use serde_json::json;
    use std::rc::Rc;

    fn people() -> Vec<Record> {
        vec![
            Record::new("3").with("name", "Bob").with("status", json!({"label": "Active"})),
            Record::new("1").with("name", "Amy").with("status", json!({"label": "Pending"})),
            Record::new("2").with("name", "Cid").with("status", json!({"label": "Active"})),
        ]
    }

    fn table(data: Vec<Record>) -> DataTable<Record> {
        DataTable::new(
            vec![ColumnDef::key("name", "Name"), ColumnDef::key("status", "Status")],
            data,
        )
        .title("People")
        .search_fields(["name"])
        .default_sort(SortOrder::Latest)
    }

    fn ready_ids(table: &DataTable<Record>, state: &mut TableState) -> Vec<String> {
        match table.view(state) {
            TableView::Ready(model) => model.row_ids,
            _ => panic!("expected rows"),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(table: &mut DataTable<Record>, state: &mut TableState, text: &str) {
        for c in text.chars() {
            table.handle_key(key(KeyCode::Char(c)), state);
        }
    }

    fn render_lines(
        table: &DataTable<Record>,
        state: &mut TableState,
        width: u16,
        height: u16,
    ) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        StatefulWidget::render(table, area, &mut buf, state);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_latest_order() {
        let table = table(people());
        let mut state = table.initial_state();
        assert_eq!(ready_ids(&table, &mut state), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_search_narrows() {
        let mut table = table(people());
        table
            .filters_mut()
            .update_filters(FilterUpdate::default().search("am"));
        let mut state = table.initial_state();
        match table.view(&mut state) {
            TableView::Ready(model) => {
                assert_eq!(model.rows.len(), 1);
                let amy = Record::new("1")
                    .with("name", "Amy")
                    .with("status", json!({"label": "Pending"}));
                assert_eq!(model.rows[0], &amy);
            }
            _ => panic!("expected rows"),
        }
    }

    #[test]
    fn test_loading_skips_derivation() {
        let table = table(people()).loading(true);
        let mut state = table.initial_state();
        assert!(matches!(table.view(&mut state), TableView::Loading));
        assert_eq!(table.derivation_count(), 0);

        let lines = render_lines(&table, &mut state, 40, 6);
        assert!(lines.iter().any(|l| l.contains("Loading...")));
        assert!(!lines.iter().any(|l| l.contains("Bob")));
        assert_eq!(table.derivation_count(), 0);
    }

    #[test]
    fn test_empty_state() {
        let table = table(Vec::new())
            .empty_description("No merchants yet.")
            .toolbar(Line::from("TOOLBAR"));
        let mut state = table.initial_state();
        match table.view(&mut state) {
            TableView::Empty { description } => assert_eq!(description, "No merchants yet."),
            _ => panic!("expected empty state"),
        }

        let lines = render_lines(&table, &mut state, 40, 8);
        assert!(lines.iter().any(|l| l.contains("No merchants yet.")));
        assert!(!lines.iter().any(|l| l.contains("TOOLBAR")));
        assert!(!lines.iter().any(|l| l.contains("Search...")));
        assert_eq!(table.derivation_count(), 0);
    }

    #[test]
    fn test_view_is_memoized() {
        let mut table = table(people());
        let mut state = table.initial_state();
        table.view(&mut state);
        table.view(&mut state);
        assert_eq!(table.derivation_count(), 1);

        table.filters_mut().toggle_filter("Active");
        table.view(&mut state);
        assert_eq!(table.derivation_count(), 2);

        table.set_data(people());
        table.view(&mut state);
        assert_eq!(table.derivation_count(), 3);
    }

    #[test]
    fn test_filter_options_come_from_unfiltered_data() {
        let mut table = table(people());
        table
            .filters_mut()
            .update_filters(FilterUpdate::default().search("amy"));
        let mut state = table.initial_state();
        let TableView::Ready(model) = table.view(&mut state) else {
            panic!("expected rows");
        };
        assert_eq!(model.rows.len(), 1);
        let active = model.filter_options.iter().find(|o| o.label == "Active").unwrap();
        assert_eq!(active.count, Some(2));
    }

    #[test]
    fn test_search_keys() {
        let mut table = table(people());
        let mut state = table.initial_state();
        assert!(table.handle_key(key(KeyCode::Char('/')), &mut state));
        assert_eq!(state.focus, Focus::Search);
        type_text(&mut table, &mut state, "ci");
        assert_eq!(table.filters().state().search, "ci");
        assert_eq!(ready_ids(&table, &mut state), vec!["2"]);

        table.handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(table.filters().state().search, "c");

        table.handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.focus, Focus::Rows);
        assert_eq!(table.filters().state().search, "");
    }

    #[test]
    fn test_filter_bar_keys() {
        let mut table = table(people());
        let mut state = table.initial_state();
        assert!(table.handle_key(key(KeyCode::Char('f')), &mut state));
        assert_eq!(state.focus, Focus::Filters);
        // Options: Active (2), Pending (1)
        table.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(ready_ids(&table, &mut state), vec!["3", "2"]);

        table.handle_key(key(KeyCode::Right), &mut state);
        table.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(ready_ids(&table, &mut state), vec!["3", "2", "1"]);

        table.handle_key(key(KeyCode::Esc), &mut state);
        table.handle_key(key(KeyCode::Esc), &mut state);
        assert!(table.filters().state().selected_filters.is_empty());
    }

    #[test]
    fn test_sort_key_cycles_orders() {
        let mut table = table(people());
        let mut state = table.initial_state();
        table.handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(table.filters().state().sort_order, SortOrder::Oldest);
        assert_eq!(ready_ids(&table, &mut state), vec!["1", "2", "3"]);
        table.handle_key(key(KeyCode::Char('s')), &mut state);
        table.handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(table.filters().state().sort_order, SortOrder::Latest);
    }

    #[test]
    fn test_column_sort_key() {
        let mut table = table(people());
        let mut state = table.initial_state();
        table.handle_key(key(KeyCode::Char('o')), &mut state);
        assert_eq!(ready_ids(&table, &mut state), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_row_click_and_selection() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicked);
        let mut table = table(people())
            .selectable(true)
            .on_row_click(move |row: &Record| sink.borrow_mut().push(row.row_id()));
        let mut state = table.initial_state();

        table.handle_key(key(KeyCode::Down), &mut state);
        table.handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(*clicked.borrow(), vec!["2".to_string()]);

        table.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert!(state.row_selection.is_selected("2"));
        table.handle_key(key(KeyCode::Char('A')), &mut state);
        assert_eq!(state.row_selection.count(), 3);
        table.handle_key(key(KeyCode::Char('A')), &mut state);
        assert!(state.row_selection.is_empty());
    }

    #[test]
    fn test_action_menu_keys() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let view_log = Rc::clone(&log);
        let delete_log = Rc::clone(&log);
        let mut table = table(people()).actions(vec![
            RowAction::new("View", move |row: &Record| {
                view_log.borrow_mut().push(format!("view {}", row.row_id()))
            }),
            RowAction::new("Delete", move |row: &Record| {
                delete_log.borrow_mut().push(format!("delete {}", row.row_id()))
            })
            .destructive()
            .disabled_when(|row: &Record| row.row_id() == "3"),
        ]);
        let mut state = table.initial_state();

        assert!(table.handle_key(key(KeyCode::Char('m')), &mut state));
        assert_eq!(state.focus, Focus::Menu);
        table.handle_key(key(KeyCode::Down), &mut state);
        table.handle_key(key(KeyCode::Enter), &mut state);
        // Delete is disabled for row 3: nothing runs and the menu stays open.
        assert!(log.borrow().is_empty());
        assert_eq!(state.focus, Focus::Menu);

        table.handle_key(key(KeyCode::Up), &mut state);
        table.handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(*log.borrow(), vec!["view 3".to_string()]);
        assert_eq!(state.focus, Focus::Rows);
    }

    #[test]
    fn test_menu_not_opened_when_all_hidden() {
        let mut table = table(people()).actions(vec![
            RowAction::new("Activate", |_: &Record| {}).hidden_when(|_| true),
        ]);
        let mut state = table.initial_state();
        assert!(!table.handle_key(key(KeyCode::Char('m')), &mut state));
        assert_eq!(state.focus, Focus::Rows);
    }

    #[test]
    fn test_paging_keys() {
        let data: Vec<Record> = (1..=25).map(|i| Record::new(i.to_string())).collect();
        let mut table = DataTable::new(vec![ColumnDef::key("id", "Id")], data)
            .pagination(PaginationConfig::with_page_size(10));
        let mut state = table.initial_state();

        table.handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(ready_ids(&table, &mut state)[0], "15");
        table.handle_key(key(KeyCode::End), &mut state);
        assert_eq!(ready_ids(&table, &mut state).len(), 5);
        table.handle_key(key(KeyCode::Char('+')), &mut state);
        assert_eq!(state.pagination, PaginationState { page_index: 0, page_size: 20 });
    }

    #[test]
    fn test_render_ready() {
        let table = table(people()).subtitle("All people").selectable(true);
        let mut state = table.initial_state();
        let lines = render_lines(&table, &mut state, 60, 10);
        assert!(lines[0].starts_with("People"));
        assert!(lines[1].starts_with("All people"));
        assert!(lines[2].contains("Search..."));
        assert!(lines[2].contains("[ ] Active (2)"));
        assert!(lines[2].contains("Sort: Latest"));
        assert!(lines[3].contains("Name"));
        assert!(lines[4].contains("Bob"));
        assert!(lines[5].contains("Cid"));
        assert!(lines[6].contains("Amy"));
        assert!(lines[9].contains("Showing 1-3 of 3"));
        assert!(lines[9].contains("Page 1 of 1"));
    }

    fn layout_table() -> DataTable<Record> {
        table(people()).layout(LayoutFlags {
            columns_pinnable: true,
            columns_movable: true,
            columns_visibility: true,
            cell_border: false,
        })
    }

    fn column_ids(table: &DataTable<Record>, state: &mut TableState) -> Vec<String> {
        match table.view(state) {
            TableView::Ready(model) => model.columns.iter().map(|col| col.id.clone()).collect(),
            _ => panic!("expected rows"),
        }
    }

    #[test]
    fn test_hide_and_pin_keys() {
        let mut table = layout_table();
        let mut state = table.initial_state();
        assert_eq!(column_ids(&table, &mut state), vec!["name", "status"]);

        assert!(table.handle_key(key(KeyCode::Char('>')), &mut state));
        assert!(table.handle_key(key(KeyCode::Char('h')), &mut state));
        assert_eq!(column_ids(&table, &mut state), vec!["name"]);
        assert!(table.handle_key(key(KeyCode::Char('H')), &mut state));
        assert_eq!(column_ids(&table, &mut state), vec!["name", "status"]);

        // Status is still focused; pinning moves it to the front.
        assert!(table.handle_key(key(KeyCode::Char('p')), &mut state));
        assert_eq!(column_ids(&table, &mut state), vec!["status", "name"]);
        match table.view(&mut state) {
            TableView::Ready(model) => assert_eq!(model.pinned_count, 1),
            _ => panic!("expected rows"),
        }
    }

    #[test]
    fn test_move_column_keys() {
        let mut table = layout_table();
        let mut state = table.initial_state();

        assert!(table.handle_key(key(KeyCode::Char(']')), &mut state));
        assert_eq!(column_ids(&table, &mut state), vec!["status", "name"]);
        assert_eq!(state.focused_column, 1);

        assert!(table.handle_key(key(KeyCode::Char('[')), &mut state));
        assert_eq!(column_ids(&table, &mut state), vec!["name", "status"]);
        assert_eq!(state.focused_column, 0);
    }

    #[test]
    fn test_resize_keys() {
        let mut table = layout_table();
        let mut state = table.initial_state();

        assert!(table.handle_key(key(KeyCode::Char('}')), &mut state));
        assert_eq!(state.column_sizing.get("name"), Some(&190));
        table.handle_key(key(KeyCode::Char('{')), &mut state);
        table.handle_key(key(KeyCode::Char('{')), &mut state);
        assert_eq!(state.column_sizing.get("name"), Some(&170));
        match table.view(&mut state) {
            TableView::Ready(model) => assert_eq!(model.columns[0].size, 170),
            _ => panic!("expected rows"),
        }
    }

    #[test]
    fn test_layout_keys_need_flags() {
        let mut table = table(people());
        let mut state = table.initial_state();
        for c in ['h', 'p', ']'] {
            assert!(!table.handle_key(key(KeyCode::Char(c)), &mut state));
        }
        assert_eq!(column_ids(&table, &mut state), vec!["name", "status"]);
        assert!(state.column_visibility.is_empty());
        assert!(state.column_pinning.is_empty());
        assert!(state.column_order.is_empty());
    }

    #[test]
    fn test_render_cell_border() {
        let plain = table(people());
        let mut state = plain.initial_state();
        let lines = render_lines(&plain, &mut state, 60, 8);
        assert!(lines.iter().all(|l| !l.contains('\u{2502}')));

        let mut bordered = table(people()).layout(LayoutFlags {
            columns_pinnable: false,
            columns_movable: false,
            columns_visibility: false,
            cell_border: true,
        });
        let mut state = bordered.initial_state();
        let border_at = |lines: &[String], needle: &str| {
            let line = lines.iter().find(|l| l.contains(needle)).expect("line");
            line.chars().position(|c| c == '\u{2502}')
        };
        // Default size 180 draws 18 cells, then the border.
        let lines = render_lines(&bordered, &mut state, 60, 8);
        assert_eq!(border_at(&lines, "Name"), Some(18));
        assert_eq!(border_at(&lines, "Bob"), Some(18));

        bordered.handle_key(key(KeyCode::Char('}')), &mut state);
        let lines = render_lines(&bordered, &mut state, 60, 8);
        assert_eq!(border_at(&lines, "Bob"), Some(19));
    }

    #[test]
    fn test_selection_drops_removed_rows() {
        let mut table = table(people()).selectable(true);
        let mut state = table.initial_state();
        assert!(table.handle_key(key(KeyCode::Char(' ')), &mut state));
        assert!(state.row_selection.is_selected("3"));

        let remaining: Vec<Record> = people().into_iter().filter(|r| r.row_id() != "3").collect();
        table.set_data(remaining);
        assert_eq!(ready_ids(&table, &mut state), vec!["2", "1"]);
        assert!(state.row_selection.is_empty());
    }

    #[test]
    fn test_render_no_results_keeps_filter_bar() {
        let mut table = table(people());
        table
            .filters_mut()
            .update_filters(FilterUpdate::default().search("zzz"));
        let mut state = table.initial_state();
        let lines = render_lines(&table, &mut state, 60, 8);
        assert!(lines.iter().any(|l| l.contains("No matching results")));
        assert!(lines.iter().any(|l| l.contains("zzz")));
        assert!(lines[7].contains("No matching rows"));
    }

    #[test]
    fn test_render_menu_popup() {
        let mut table = table(people()).actions(vec![
            RowAction::new("View", |_: &Record| {}),
            RowAction::new("Delete", |_: &Record| {}).destructive(),
        ]);
        let mut state = table.initial_state();
        table.handle_key(key(KeyCode::Char('m')), &mut state);
        let lines = render_lines(&table, &mut state, 60, 12);
        assert!(lines.iter().any(|l| l.contains("Actions")));
        assert!(lines.iter().any(|l| l.contains(" View")));
        assert!(lines.iter().any(|l| l.contains(" Delete")));
    }
}
