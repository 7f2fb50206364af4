//! Prelude module for Horizon Grid.
//!
//! ```ignore
//! use horizon_grid::prelude::*;
//! ```
//!
//! This provides access to:
//! - Views and their state (`ListView`, `AsyncListView`, `DataSourceState`)
//! - Row types (`DataRowProps`, `ListProps`)
//! - Column configuration (`ColumnsConfig`, `ColumnsConfiguration`)
//! - Change notification (`Signal`, `SharedTaskQueue`)

// ============================================================================
// Views
// ============================================================================

pub use crate::data::{
    AsyncListView, AsyncListViewProps, DataSourceView, ListView, ListViewProps, LoadState,
    TreeIndex,
};

// ============================================================================
// State and Rows
// ============================================================================

pub use crate::data::{
    DataRowProps, DataSourceState, Editable, ListProps, PinPosition, RowKey, SortDirection,
    SortingOption,
};

// ============================================================================
// Columns
// ============================================================================

pub use crate::columns::{
    ColumnConfig, ColumnGroup, ColumnPinPosition, ColumnsConfig, ColumnsConfiguration,
    DataColumn, DropPosition,
};

// ============================================================================
// Signals and Errors
// ============================================================================

pub use crate::{Error, Result, SharedTaskQueue, Signal};
