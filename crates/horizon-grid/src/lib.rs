//! Horizon Grid - view engine for virtualized lists, trees and tables.
//!
//! This crate turns item collections into the rows a renderer shows, and
//! keeps the user's column layout. It does no rendering itself.
//!
//! - [`data`]: Tree index, view state, synchronous and asynchronous list views
//! - [`columns`]: Column visibility, pinning and ordering
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_grid::prelude::*;
//!
//! #[derive(Clone)]
//! struct File {
//!     id: u32,
//!     name: &'static str,
//! }
//!
//! let items = Arc::new(vec![File { id: 1, name: "a.txt" }, File { id: 2, name: "b.txt" }]);
//! let view = ListView::<File, u32, ()>::new();
//! view.update(
//!     Editable::new(DataSourceState::with_window(0, 10), |_| {}),
//!     ListViewProps::new(items, |f: &File| f.id),
//! );
//!
//! let rows = view.get_visible_rows();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].value.as_ref().unwrap().name, "b.txt");
//! ```

pub mod columns;
pub mod data;
mod error;
pub mod prelude;

pub use error::{Error, Result};

pub use horizon_grid_core::logging;
pub use horizon_grid_core::{ConnectionId, ConnectionType, SharedTaskQueue, Signal};
