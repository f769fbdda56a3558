//! # tui-table
//!
//! Reusable data table for the Merchant Console screens.
//!
//! The crate is split so that the filtering, column and pagination logic can
//! be exercised without a terminal; only [`DataTable`]'s `StatefulWidget`
//! implementation touches Ratatui buffers.
//!
//! ## Components
//!
//! - [`TableFilters`] - search text, category filters and sort order over a row list
//! - [`create_columns`] - turns [`ColumnDef`] declarations and [`RowAction`]s into
//!   [`ColumnDescriptor`]s
//! - [`TableState`] - pagination, column sorting, row selection and layout state
//! - [`DataTable`] - the composite component: loading/empty branches, filter bar,
//!   toolbar, body and pagination footer
//! - [`format`] - currency, date and text helpers used by cells

pub mod format;

mod filter;
mod row;
mod table;

pub use filter::{
    default_sort_options, derive_filter_options, FilterOption, FilterState, FilterUpdate,
    RowPredicate, SortOption, SortOrder, TableFilters,
};
pub use row::{Record, TableRow};
pub use table::{
    build_action_menu, create_columns, Accessor, ActionMenu, ActionVariant, CellContent,
    ColumnDef, ColumnDescriptor, ColumnKind, ColumnMeta, ColumnResizeMode, ColumnSort, DataTable,
    Focus, HeaderContext, HeaderDef, HeaderRenderer, LayoutFlags, MenuEntry, MenuItem,
    PaginationConfig, PaginationState, RowAction, RowSelectionState, TableModel, TableState,
    TableView,
};
