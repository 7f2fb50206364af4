//! Column configuration engine.
//!
//! Users can show, hide, pin and reorder the columns of a table. Their choices
//! are stored as a [`ColumnsConfig`], a serializable map from column key to
//! [`ColumnConfig`]. Policy flags on [`DataColumn`] (always visible, always
//! pinned, hidden in configuration) are applied whenever a configuration is
//! read, so stale or hand-edited configurations can never break them.
//!
//! # Core Components
//!
//! - [`order_between`]: Fractional order keys, so a move rewrites one entry
//! - [`sort_columns_and_add_group_key`]: Group and sort columns for display
//! - Toggle and move functions: Pure transitions from one config to the next
//! - [`ColumnsConfiguration`]: Stateful controller for a settings dialog
//!
//! # Example
//!
//! ```
//! use horizon_grid::columns::{
//!     ColumnsConfig, DataColumn, sort_columns_and_add_group_key, toggle_single_column_visibility,
//! };
//!
//! let columns = vec![DataColumn::new("name", "Name"), DataColumn::new("size", "Size")];
//! let config = ColumnsConfig::from_columns(&columns);
//! let sorted = sort_columns_and_add_group_key(&columns, &config);
//!
//! let next = toggle_single_column_visibility(&config, &sorted, "size");
//! assert!(!next.get("size").unwrap().is_visible);
//! assert!(config.get("size").unwrap().is_visible);
//! ```

mod actions;
mod config;
mod configuration;
mod order;
mod utils;

pub use actions::{
    move_column_relative_to_another_column, toggle_all_columns_visibility,
    toggle_single_column_pin, toggle_single_column_visibility,
};
pub use config::{ColumnConfig, ColumnPinPosition, ColumnsConfig, DataColumn};
pub use configuration::{ColumnSearchFieldsFn, ColumnsConfiguration};
pub use order::{initial_orders, order_between, validate_order_key};
pub use utils::{
    ColumnGroup, ColumnGroups, DndColumn, DropPosition, GroupedColumn, can_accept_drop,
    column_group, effective_config, group_and_filter_sorted_columns, group_neighbours,
    is_column_always_hidden_in_configuration, is_column_always_pinned,
    sort_columns_and_add_group_key,
};
