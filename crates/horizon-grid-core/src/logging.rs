//! Logging facilities for Horizon Grid.
//!
//! Horizon Grid uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_grid=debug")
//!         .init();
//! }
//! ```
//!
//! The constants below name the targets and spans used by each subsystem, so
//! filters can be written against them.

/// Span names used throughout Horizon Grid for tracing.
pub mod span_names {
    /// Tree index construction span.
    pub const TREE_BUILD: &str = "horizon_grid::tree_build";
    /// Row projection rebuild span.
    pub const PROJECTION: &str = "horizon_grid::projection";
    /// Asynchronous bulk fetch span.
    pub const FETCH: &str = "horizon_grid::fetch";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_grid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Deferred task queue target.
    pub const TASK: &str = "horizon_grid_core::task";
    /// Tree index target.
    pub const TREE: &str = "horizon_grid::data::tree";
    /// Synchronous list view target.
    pub const LIST_VIEW: &str = "horizon_grid::data::list_view";
    /// Asynchronous list view target.
    pub const ASYNC_VIEW: &str = "horizon_grid::data::async_view";
    /// Column configuration target.
    pub const COLUMNS: &str = "horizon_grid::columns";
}

/// A guard that keeps a performance span entered until dropped.
///
/// ```
/// use horizon_grid_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("rebuild_rows");
///     // timed work
/// }
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_grid::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
