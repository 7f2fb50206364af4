//! Core systems for Horizon Grid.
//!
//! This crate provides the foundational pieces shared by the Horizon Grid
//! view engine:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Task Queue**: Deferred tasks that run on the host's next turn
//! - **Logging**: Tracing targets and span names per subsystem
//!
//! # Signal Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Deferred Task Example
//!
//! ```
//! use horizon_grid_core::SharedTaskQueue;
//!
//! let queue = SharedTaskQueue::new();
//! queue.post(|| println!("runs on the next turn"));
//!
//! // The host drains the queue once its current update batch is done.
//! assert_eq!(queue.process_all(), 1);
//! ```

pub mod logging;
pub mod signal;
mod task;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, ConnectionType, Signal};
pub use task::SharedTaskQueue;
