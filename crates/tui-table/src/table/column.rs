//! Column declarations and the descriptors built from them.

use super::action::{build_action_menu, RowAction};
use super::CellContent;
use crate::row::TableRow;

use ratatui::layout::Alignment;
use std::fmt;
use std::rc::Rc;

/// Logical width of a data column when none is declared.
pub const DEFAULT_COLUMN_SIZE: u16 = 180;
/// Logical width of the row-selection column.
pub const SELECT_COLUMN_SIZE: u16 = 40;
/// Logical width of the actions column.
pub const ACTIONS_COLUMN_SIZE: u16 = 60;
/// Column id of the row-selection column.
pub const SELECT_COLUMN_ID: &str = "select";
/// Column id of the actions column.
pub const ACTIONS_COLUMN_ID: &str = "actions";

/// Logical units per terminal cell.
const UNITS_PER_CELL: u16 = 10;

/// Terminal cells occupied by a column of the given logical size.
pub fn cell_width(size: u16) -> u16 {
    (size / UNITS_PER_CELL).max(3)
}

type CellFn<T> = Rc<dyn Fn(&T) -> CellContent>;
type HeaderFn = Rc<dyn Fn(&HeaderContext) -> String>;

/// How a column reads its value from a row.
pub enum Accessor<T> {
    /// Read a named field through [`TableRow::field`]
    Key(String),
    /// Compute the value
    Fn(CellFn<T>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Key(key) => Self::Key(key.clone()),
            Self::Fn(f) => Self::Fn(Rc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "Key({})", key),
            Self::Fn(_) => write!(f, "Fn"),
        }
    }
}

/// What a header renderer knows about its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderContext {
    /// `Some(true)` when sorted descending, `Some(false)` ascending
    pub sorted_desc: Option<bool>,
}

/// Declared header.
pub enum HeaderDef {
    Title(String),
    Custom(HeaderFn),
}

impl From<&str> for HeaderDef {
    fn from(title: &str) -> Self {
        Self::Title(title.to_string())
    }
}

impl From<String> for HeaderDef {
    fn from(title: String) -> Self {
        Self::Title(title)
    }
}

/// Presentation hints carried through to rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMeta {
    pub align: Alignment,
}

/// A column as declared by the caller.
pub struct ColumnDef<T> {
    pub id: String,
    pub accessor: Accessor<T>,
    pub header: HeaderDef,
    pub cell: Option<CellFn<T>>,
    pub enable_sorting: Option<bool>,
    pub enable_hiding: Option<bool>,
    pub enable_resizing: Option<bool>,
    pub size: Option<u16>,
    pub meta: ColumnMeta,
}

impl<T> ColumnDef<T> {
    /// Column reading the field named `key`, titled `header`.
    pub fn key(key: impl Into<String>, header: impl Into<HeaderDef>) -> Self {
        let key = key.into();
        Self {
            id: key.clone(),
            accessor: Accessor::Key(key),
            header: header.into(),
            cell: None,
            enable_sorting: None,
            enable_hiding: None,
            enable_resizing: None,
            size: None,
            meta: ColumnMeta::default(),
        }
    }

    /// Column computing its value with `accessor`.
    pub fn computed(
        id: impl Into<String>,
        header: impl Into<HeaderDef>,
        accessor: impl Fn(&T) -> CellContent + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            accessor: Accessor::Fn(Rc::new(accessor)),
            header: header.into(),
            cell: None,
            enable_sorting: None,
            enable_hiding: None,
            enable_resizing: None,
            size: None,
            meta: ColumnMeta::default(),
        }
    }

    /// Replace the header with a custom renderer.
    pub fn header_with(mut self, f: impl Fn(&HeaderContext) -> String + 'static) -> Self {
        self.header = HeaderDef::Custom(Rc::new(f));
        self
    }

    /// Render cells with `f` instead of the accessor's value.
    pub fn cell(mut self, f: impl Fn(&T) -> CellContent + 'static) -> Self {
        self.cell = Some(Rc::new(f));
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.enable_sorting = Some(sortable);
        self
    }

    pub fn hideable(mut self, hideable: bool) -> Self {
        self.enable_hiding = Some(hideable);
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.enable_resizing = Some(resizable);
        self
    }

    /// Set the logical width.
    pub fn size(mut self, size: u16) -> Self {
        self.size = Some(size);
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.meta.align = align;
        self
    }
}

/// Header renderer of a built column.
pub enum HeaderRenderer {
    /// "Select all" control of the selection column
    SelectAll,
    /// Title with a sort indicator
    Sortable { title: String },
    Custom(HeaderFn),
    /// No header (actions column)
    None,
}

impl HeaderRenderer {
    /// Header text for the given sort state.
    pub fn render(&self, ctx: &HeaderContext, all_selected: bool) -> String {
        match self {
            Self::SelectAll => if all_selected { "[x]" } else { "[ ]" }.to_string(),
            Self::Sortable { title } => match ctx.sorted_desc {
                Some(false) => format!("{} \u{25b2}", title),
                Some(true) => format!("{} \u{25bc}", title),
                None => title.clone(),
            },
            Self::Custom(f) => f(ctx),
            Self::None => String::new(),
        }
    }
}

impl Clone for HeaderRenderer {
    fn clone(&self) -> Self {
        match self {
            Self::SelectAll => Self::SelectAll,
            Self::Sortable { title } => Self::Sortable {
                title: title.clone(),
            },
            Self::Custom(f) => Self::Custom(Rc::clone(f)),
            Self::None => Self::None,
        }
    }
}

impl fmt::Debug for HeaderRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectAll => write!(f, "SelectAll"),
            Self::Sortable { title } => write!(f, "Sortable({})", title),
            Self::Custom(_) => write!(f, "Custom"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Role of a built column.
pub enum ColumnKind<T> {
    Selection,
    Data {
        accessor: Accessor<T>,
        cell: Option<CellFn<T>>,
    },
    Actions(Rc<[RowAction<T>]>),
}

impl<T> Clone for ColumnKind<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Selection => Self::Selection,
            Self::Data { accessor, cell } => Self::Data {
                accessor: accessor.clone(),
                cell: cell.clone(),
            },
            Self::Actions(actions) => Self::Actions(Rc::clone(actions)),
        }
    }
}

/// A normalized column, rebuilt on every render pass.
pub struct ColumnDescriptor<T> {
    pub id: String,
    pub kind: ColumnKind<T>,
    pub header: HeaderRenderer,
    pub enable_sorting: bool,
    pub enable_hiding: bool,
    pub enable_resizing: bool,
    pub size: u16,
    pub meta: ColumnMeta,
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind.clone(),
            header: self.header.clone(),
            enable_sorting: self.enable_sorting,
            enable_hiding: self.enable_hiding,
            enable_resizing: self.enable_resizing,
            size: self.size,
            meta: self.meta,
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ColumnKind::Selection => "selection",
            ColumnKind::Data { .. } => "data",
            ColumnKind::Actions(_) => "actions",
        };
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("kind", &kind)
            .field("header", &self.header)
            .field("enable_sorting", &self.enable_sorting)
            .field("enable_hiding", &self.enable_hiding)
            .field("enable_resizing", &self.enable_resizing)
            .field("size", &self.size)
            .finish()
    }
}

impl<T: TableRow> ColumnDescriptor<T> {
    fn selection() -> Self {
        Self {
            id: SELECT_COLUMN_ID.to_string(),
            kind: ColumnKind::Selection,
            header: HeaderRenderer::SelectAll,
            enable_sorting: false,
            enable_hiding: false,
            enable_resizing: false,
            size: SELECT_COLUMN_SIZE,
            meta: ColumnMeta {
                align: Alignment::Center,
            },
        }
    }

    fn actions(actions: Rc<[RowAction<T>]>) -> Self {
        Self {
            id: ACTIONS_COLUMN_ID.to_string(),
            kind: ColumnKind::Actions(actions),
            header: HeaderRenderer::None,
            enable_sorting: false,
            enable_hiding: false,
            enable_resizing: false,
            size: ACTIONS_COLUMN_SIZE,
            meta: ColumnMeta {
                align: Alignment::Center,
            },
        }
    }

    fn from_def(def: &ColumnDef<T>) -> Self {
        let header = match &def.header {
            HeaderDef::Title(title) => HeaderRenderer::Sortable {
                title: title.clone(),
            },
            HeaderDef::Custom(f) => HeaderRenderer::Custom(Rc::clone(f)),
        };
        Self {
            id: def.id.clone(),
            kind: ColumnKind::Data {
                accessor: def.accessor.clone(),
                cell: def.cell.clone(),
            },
            header,
            enable_sorting: def.enable_sorting.unwrap_or(true),
            enable_hiding: def.enable_hiding.unwrap_or(true),
            enable_resizing: def.enable_resizing.unwrap_or(true),
            size: def.size.unwrap_or(DEFAULT_COLUMN_SIZE),
            meta: def.meta,
        }
    }

    /// The raw value of the column for `row`, used for sorting.
    pub fn value(&self, row: &T) -> CellContent {
        match &self.kind {
            ColumnKind::Data { accessor, .. } => match accessor {
                Accessor::Key(key) => row
                    .field(key)
                    .map(CellContent::from)
                    .unwrap_or(CellContent::Empty),
                Accessor::Fn(f) => f(row),
            },
            _ => CellContent::Empty,
        }
    }

    /// What the cell shows for `row`.
    pub fn render_cell(&self, row: &T, selected: bool) -> CellContent {
        match &self.kind {
            ColumnKind::Selection => CellContent::Checkbox(selected),
            ColumnKind::Data { cell: Some(f), .. } => f(row),
            ColumnKind::Data { cell: None, .. } => self.value(row),
            ColumnKind::Actions(actions) => match build_action_menu(actions, row) {
                Some(_) => CellContent::text("\u{22ef}"),
                None => CellContent::Empty,
            },
        }
    }

    /// Width in terminal cells.
    pub fn width(&self) -> u16 {
        cell_width(self.size)
    }
}

/// Build `[selection?] + columns + [actions?]`.
pub fn create_columns<T: TableRow>(
    columns: &[ColumnDef<T>],
    selectable: bool,
    actions: &[RowAction<T>],
) -> Vec<ColumnDescriptor<T>> {
    let mut built = Vec::with_capacity(columns.len() + 2);
    if selectable {
        built.push(ColumnDescriptor::selection());
    }
    built.extend(columns.iter().map(ColumnDescriptor::from_def));
    if !actions.is_empty() {
        built.push(ColumnDescriptor::actions(actions.iter().cloned().collect()));
    }
    built
}
