//! The row-query interface shared by all views.

use horizon_grid_core::Signal;

use super::row::{DataRowProps, ListProps};
use super::state::PinPosition;

/// Signals emitted by views.
///
/// Renderers connect to `rows_changed` and re-query rows when it fires.
pub struct ViewSignals {
    /// Emitted after the row projection or the row flags changed.
    pub rows_changed: Signal<()>,

    /// Emitted when an asynchronous fetch fails.
    /// Args: error message
    pub load_failed: Signal<String>,
}

impl Default for ViewSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSignals {
    /// Creates a new set of view signals.
    pub fn new() -> Self {
        Self {
            rows_changed: Signal::new(),
            load_failed: Signal::new(),
        }
    }
}

/// The interface a rendering layer uses to pull rows from a view.
///
/// Returned rows are snapshots. They stay valid until the next
/// `rows_changed` notification.
///
/// Interaction methods never touch the view's state directly. They build the
/// next [`DataSourceState`](super::DataSourceState) and hand it to the change
/// handler supplied with the last update; the caller commits it and feeds it
/// back through the view's `update`.
pub trait DataSourceView<TItem, TId>: Send + Sync {
    /// Rows in the current window, pinned rows included.
    fn get_visible_rows(&self) -> Vec<DataRowProps<TItem, TId>>;

    /// Resolves a row for any id, reporting it at `index`.
    ///
    /// Ids that have no item yield an unknown row.
    fn get_by_id(&self, id: &TId, index: usize) -> DataRowProps<TItem, TId>;

    /// Aggregate counts and flags for sizing scroll containers.
    fn get_list_props(&self) -> ListProps;

    /// Drops cached indexes and rows.
    fn reload(&self);

    /// The signals of this view.
    fn signals(&self) -> &ViewSignals;

    // -------------------------------------------------------------------------
    // State proposals
    // -------------------------------------------------------------------------

    /// Proposes `id` checked or unchecked.
    fn set_checked(&self, id: &TId, checked: bool);

    /// Proposes `id` as the selected row, or no selection.
    fn set_selected(&self, id: Option<&TId>);

    /// Proposes the fold flag of `id` flipped.
    fn toggle_fold(&self, id: &TId);

    /// Proposes `id` pinned at `position`, or unpinned.
    fn set_pinned(&self, id: &TId, position: Option<PinPosition>);

    /// Proposes every row of the projection checked or unchecked.
    fn select_all(&self, checked: bool);

    /// Proposes the window moved to `top_index`.
    fn scroll_to(&self, top_index: usize);

    /// Number of rows [`get_visible_rows`](Self::get_visible_rows) would return.
    fn visible_row_count(&self) -> usize {
        self.get_visible_rows().len()
    }
}
