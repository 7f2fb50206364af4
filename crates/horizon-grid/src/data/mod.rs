//! Row projection for list and tree data.
//!
//! This module turns an item collection plus caller-owned view state into the
//! rows a virtualized list renders.
//!
//! # Core Components
//!
//! - [`TreeIndex`]: Immutable structural index (lookup by id, children, counts)
//! - [`DataSourceState`]: Caller-owned state (filter, sort, search, window, ...)
//! - [`DataSourceView`]: The row-query interface renderers consume
//! - [`ListView`]: Synchronous view over an in-memory array
//! - [`AsyncListView`]: View over a single asynchronous bulk fetch
//!
//! # Data Flow
//!
//! ```text
//! items + DataSourceState --update()--> ListView --get_visible_rows()--> renderer
//!                                          |
//!                     interaction <--- on_value_change(new state)
//! ```
//!
//! Views never mutate the state they are given. Interactions propose a new
//! state through the [`Editable`] change handler; the caller commits it and
//! passes it back on the next update.

mod async_view;
mod list_view;
mod row;
mod state;
mod tree;
mod view;

pub use async_view::{AsyncListView, AsyncListViewProps, FetchFn, LoadState};
pub use list_view::{CompareFn, FilterFn, ListView, ListViewProps, SearchFieldsFn};
pub use row::{DataRowProps, ListProps, RowKey, RowKind, SelectAllState};
pub use state::{
    DataSourceState, Editable, OnValueChange, PinPosition, SortDirection, SortingOption,
};
pub use tree::{GetIdFn, GetParentIdFn, Record, TreeIndex};
pub use view::{DataSourceView, ViewSignals};
