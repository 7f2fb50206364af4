//! List view over items fetched once, asynchronously.
//!
//! [`AsyncListView`] wraps a [`ListView`] and adds a load state machine:
//!
//! ```text
//! NotLoaded --load_data()--> Loading --Ok--> Loaded
//!                               |
//!                               +---Err--> Failed
//! Loaded / Failed --reload()--> NotLoaded
//! ```
//!
//! Until the fetch resolves the view answers with placeholder rows sized to
//! the requested window, so scroll containers keep their height. When it
//! resolves, the base projection and the flags are updated together and the
//! `rows_changed` notification is posted to the host's task queue, so slots
//! never observe the loaded flag with stale rows.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use horizon_grid_core::logging::{span_names, targets};
use horizon_grid_core::{SharedTaskQueue, Signal};
use parking_lot::Mutex;
use tracing::Instrument;

use super::list_view::{ListView, ListViewProps};
use super::row::{DataRowProps, ListProps, SelectAllState};
use super::state::{DataSourceState, Editable, OnValueChange, PinPosition, SortingOption};
use super::view::{DataSourceView, ViewSignals};
use crate::error::{Error, Result};

/// Type alias for the bulk fetch function.
///
/// Called at most once per load; expected to return the complete item set.
pub type FetchFn<TItem> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<TItem>>> + Send + Sync>;

/// Configuration of an [`AsyncListView`].
///
/// Holds the fetch function and the base props; the base items are replaced
/// by the fetched ones.
pub struct AsyncListViewProps<TItem, TId, TFilter> {
    pub api: FetchFn<TItem>,
    pub base: ListViewProps<TItem, TId, TFilter>,
}

impl<TItem, TId, TFilter> Clone for AsyncListViewProps<TItem, TId, TFilter> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            base: self.base.clone(),
        }
    }
}

impl<TItem, TId, TFilter> AsyncListViewProps<TItem, TId, TFilter> {
    /// Props fetching items with `api`, identified by `get_id`.
    pub fn new<A, Fut, G>(api: A, get_id: G) -> Self
    where
        A: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<TItem>>> + Send + 'static,
        G: Fn(&TItem) -> TId + Send + Sync + 'static,
    {
        Self {
            api: Arc::new(move || api().boxed()),
            base: ListViewProps::new(Arc::new(Vec::new()), get_id),
        }
    }

    /// Nests items under their parent id.
    pub fn with_parent_id<F>(mut self, get_parent_id: F) -> Self
    where
        F: Fn(&TItem) -> Option<TId> + Send + Sync + 'static,
    {
        self.base = self.base.with_parent_id(get_parent_id);
        self
    }

    /// Sets the filter predicate applied with the state's filter value.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&TItem, &TFilter) -> bool + Send + Sync + 'static,
    {
        self.base = self.base.with_filter(filter);
        self
    }

    /// Sets the comparator used for the state's sorting options.
    pub fn with_sort<F>(mut self, compare: F) -> Self
    where
        F: Fn(&TItem, &TItem, &SortingOption) -> std::cmp::Ordering + Send + Sync + 'static,
    {
        self.base = self.base.with_sort(compare);
        self
    }

    /// Sets the text fields matched by the state's search string.
    pub fn with_search_fields<F>(mut self, fields: F) -> Self
    where
        F: Fn(&TItem) -> Vec<String> + Send + Sync + 'static,
    {
        self.base = self.base.with_search_fields(fields);
        self
    }

    /// Offers a "select all" checkbox in the list props.
    pub fn with_select_all(mut self, enabled: bool) -> Self {
        self.base = self.base.with_select_all(enabled);
        self
    }

    /// Folds parents that have no explicit fold flag.
    pub fn with_folded_by_default(mut self, folded: bool) -> Self {
        self.base = self.base.with_folded_by_default(folded);
        self
    }
}

/// Load state of an [`AsyncListView`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    /// The fetch failed with this message. No automatic retry happens;
    /// call [`reload`](DataSourceView::reload) to allow another fetch.
    Failed(String),
}

impl LoadState {
    /// Whether the view shows placeholders.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::NotLoaded | Self::Loading)
    }
}

struct AsyncState<TItem, TId, TFilter> {
    load_state: LoadState,
    is_reloading: bool,
    /// Bumped on every fetch start and reload; a fetch result is only
    /// applied if the epoch is still the one it started in.
    epoch: u64,
    value: DataSourceState<TFilter, TId>,
    on_value_change: Option<OnValueChange<DataSourceState<TFilter, TId>>>,
    props: Option<AsyncListViewProps<TItem, TId, TFilter>>,
    items: Arc<Vec<TItem>>,
}

impl<TItem, TId, TFilter> AsyncState<TItem, TId, TFilter>
where
    TFilter: Clone,
    TId: Clone + Eq + Hash,
{
    fn editable(&self) -> Editable<DataSourceState<TFilter, TId>> {
        Editable {
            value: self.value.clone(),
            on_value_change: self
                .on_value_change
                .clone()
                .unwrap_or_else(|| Arc::new(|_: DataSourceState<TFilter, TId>| {})),
        }
    }

    fn base_props(&self) -> Option<ListViewProps<TItem, TId, TFilter>> {
        self.props
            .as_ref()
            .map(|props| props.base.clone().with_items(self.items.clone()))
    }

    fn loading_rows(&self) -> Vec<DataRowProps<TItem, TId>> {
        (0..self.value.visible_count)
            .map(|i| DataRowProps::loading(self.value.top_index + i))
            .collect()
    }
}

/// A list view whose items come from a single asynchronous fetch.
///
/// At most one fetch is in flight per view, and a successful load happens
/// once until [`reload`](DataSourceView::reload) is called.
pub struct AsyncListView<TItem, TId: Eq + Hash, TFilter> {
    base: ListView<TItem, TId, TFilter>,
    inner: Mutex<AsyncState<TItem, TId, TFilter>>,
    /// Deferred hop from load completion to `rows_changed`.
    loaded: Signal<()>,
    signals: Arc<ViewSignals>,
}

impl<TItem, TId, TFilter> AsyncListView<TItem, TId, TFilter>
where
    TItem: Clone + Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
    TFilter: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a view that posts its load-completion notification to `queue`.
    pub fn new(queue: Arc<SharedTaskQueue>) -> Self {
        let base = ListView::new();
        let signals = Arc::new(ViewSignals::new());

        let forward = signals.clone();
        base.signals()
            .rows_changed
            .connect(move |_| forward.rows_changed.emit(()));

        let loaded = Signal::<()>::new();
        let forward = signals.clone();
        loaded.connect_deferred(queue, move |_| forward.rows_changed.emit(()));

        Self {
            base,
            inner: Mutex::new(AsyncState {
                load_state: LoadState::NotLoaded,
                is_reloading: false,
                epoch: 0,
                value: DataSourceState::default(),
                on_value_change: None,
                props: None,
                items: Arc::new(Vec::new()),
            }),
            loaded,
            signals,
        }
    }

    /// The current load state.
    pub fn load_state(&self) -> LoadState {
        self.inner.lock().load_state.clone()
    }

    /// Returns `true` once the fetched items are projected.
    pub fn is_loaded(&self) -> bool {
        self.inner.lock().load_state == LoadState::Loaded
    }

    /// Returns `true` while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.lock().load_state == LoadState::Loading
    }

    /// The wrapped synchronous view.
    pub fn base(&self) -> &ListView<TItem, TId, TFilter> {
        &self.base
    }

    /// Feeds the latest state and props.
    ///
    /// Before the load completes only the state is recorded; afterwards the
    /// base view is updated with the fetched items.
    pub fn update(
        &self,
        editable: Editable<DataSourceState<TFilter, TId>>,
        props: AsyncListViewProps<TItem, TId, TFilter>,
    ) {
        let (base_update, window_changed) = {
            let mut inner = self.inner.lock();
            let window_changed = inner.value.top_index != editable.value.top_index
                || inner.value.visible_count != editable.value.visible_count;
            inner.value = editable.value;
            inner.on_value_change = Some(editable.on_value_change);
            inner.props = Some(props);

            let base_update = match inner.load_state {
                LoadState::Loaded => inner.base_props().map(|props| (inner.editable(), props)),
                _ => None,
            };
            (base_update, window_changed)
        };

        match base_update {
            Some((editable, props)) => self.base.update(editable, props),
            // Placeholders follow the window.
            None if window_changed => self.signals.rows_changed.emit(()),
            None => {}
        }
    }

    /// Fetches the items if no load has happened yet.
    ///
    /// Returns immediately while a fetch is in flight or after a successful
    /// load. After a failure the stored error is returned without fetching
    /// again.
    pub async fn load_data(&self) -> Result<()> {
        let (api, epoch) = {
            let mut inner = self.inner.lock();
            match &inner.load_state {
                LoadState::Loading | LoadState::Loaded => {
                    tracing::trace!(target: targets::ASYNC_VIEW, state = ?inner.load_state, "load already requested");
                    return Ok(());
                }
                LoadState::Failed(message) => return Err(Error::fetch(message.clone())),
                LoadState::NotLoaded => {}
            }
            let Some(props) = &inner.props else {
                tracing::warn!(target: targets::ASYNC_VIEW, "load requested before the first update");
                return Ok(());
            };
            let api = props.api.clone();
            inner.epoch += 1;
            inner.load_state = LoadState::Loading;
            (api, inner.epoch)
        };

        tracing::debug!(target: targets::ASYNC_VIEW, epoch, "fetch started");
        let span = tracing::debug_span!(
            target: targets::ASYNC_VIEW,
            "perf",
            operation = span_names::FETCH,
            epoch
        );
        match api().instrument(span).await {
            Ok(items) => {
                self.complete(epoch, items);
                Ok(())
            }
            Err(err) => {
                let message = match err {
                    Error::Fetch { message } => message,
                    other => other.to_string(),
                };
                self.fail(epoch, &message);
                Err(Error::fetch(message))
            }
        }
    }

    fn complete(&self, epoch: u64, items: Vec<TItem>) {
        {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch || inner.load_state != LoadState::Loading {
                tracing::debug!(target: targets::ASYNC_VIEW, epoch, "discarding stale fetch result");
                return;
            }
            let count = items.len();
            inner.items = Arc::new(items);

            // Flags and rows change in one step, under the lock.
            if let Some(props) = inner.base_props() {
                let rows_changed = &self.base.signals().rows_changed;
                rows_changed.set_blocked(true);
                self.base.update(inner.editable(), props);
                rows_changed.set_blocked(false);
            }
            inner.load_state = LoadState::Loaded;
            inner.is_reloading = false;
            tracing::debug!(target: targets::ASYNC_VIEW, epoch, items = count, "fetch completed");
        }

        self.loaded.emit(());
    }

    fn fail(&self, epoch: u64, message: &str) {
        {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch || inner.load_state != LoadState::Loading {
                tracing::debug!(target: targets::ASYNC_VIEW, epoch, "discarding stale fetch error");
                return;
            }
            inner.load_state = LoadState::Failed(message.to_owned());
            inner.is_reloading = false;
        }
        tracing::error!(target: targets::ASYNC_VIEW, epoch, error = %message, "fetch failed");
        self.signals.load_failed.emit(message.to_owned());
        self.signals.rows_changed.emit(());
    }

    /// Builds the next state from the recorded one and hands it to the
    /// change handler, outside the lock.
    fn propose<F>(&self, next: F)
    where
        F: FnOnce(&AsyncState<TItem, TId, TFilter>) -> Option<DataSourceState<TFilter, TId>>,
    {
        let proposal = {
            let inner = self.inner.lock();
            inner
                .on_value_change
                .clone()
                .and_then(|handler| next(&inner).map(|value| (handler, value)))
        };
        if let Some((handler, value)) = proposal {
            handler(value);
        }
    }
}

impl<TItem, TId, TFilter> DataSourceView<TItem, TId> for AsyncListView<TItem, TId, TFilter>
where
    TItem: Clone + Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
    TFilter: Clone + PartialEq + Send + Sync + 'static,
{
    fn get_visible_rows(&self) -> Vec<DataRowProps<TItem, TId>> {
        let inner = self.inner.lock();
        match inner.load_state {
            LoadState::NotLoaded | LoadState::Loading => inner.loading_rows(),
            LoadState::Loaded => self.base.get_visible_rows(),
            LoadState::Failed(_) => Vec::new(),
        }
    }

    fn get_by_id(&self, id: &TId, index: usize) -> DataRowProps<TItem, TId> {
        let inner = self.inner.lock();
        match inner.load_state {
            LoadState::Loading => DataRowProps::loading(index),
            LoadState::Loaded => self.base.get_by_id(id, index),
            LoadState::NotLoaded | LoadState::Failed(_) => DataRowProps::unknown(id.clone(), index),
        }
    }

    fn get_list_props(&self) -> ListProps {
        let inner = self.inner.lock();
        match &inner.load_state {
            LoadState::NotLoaded | LoadState::Loading => {
                // The real total is unknown; report the window so scroll UI keeps its size.
                let visible_count = inner.value.visible_count;
                ListProps {
                    rows_count: visible_count,
                    known_rows_count: visible_count,
                    exact_rows_count: false,
                    total_count: visible_count,
                    select_all: inner
                        .props
                        .as_ref()
                        .filter(|props| props.base.select_all)
                        .map(|_| SelectAllState::default()),
                    is_reloading: inner.is_reloading,
                    is_loading: true,
                    load_error: None,
                }
            }
            LoadState::Loaded => ListProps {
                is_reloading: inner.is_reloading,
                ..self.base.get_list_props()
            },
            LoadState::Failed(message) => ListProps {
                exact_rows_count: true,
                is_reloading: inner.is_reloading,
                load_error: Some(message.clone()),
                ..ListProps::default()
            },
        }
    }

    fn reload(&self) {
        {
            let mut inner = self.inner.lock();
            inner.load_state = LoadState::NotLoaded;
            inner.is_reloading = true;
            inner.epoch += 1;
        }
        tracing::debug!(target: targets::ASYNC_VIEW, "reload requested");
        self.base.reload();
    }

    fn signals(&self) -> &ViewSignals {
        &self.signals
    }

    fn set_checked(&self, id: &TId, checked: bool) {
        self.propose(|inner| Some(inner.value.set_checked(id, checked)));
    }

    fn set_selected(&self, id: Option<&TId>) {
        self.propose(|inner| Some(inner.value.set_selected(id)));
    }

    fn toggle_fold(&self, id: &TId) {
        self.propose(|inner| {
            let folded_by_default = inner.props.as_ref()?.base.folded_by_default;
            let folded = inner.value.is_folded(id, folded_by_default);
            Some(inner.value.set_folded(id, !folded))
        });
    }

    fn set_pinned(&self, id: &TId, position: Option<PinPosition>) {
        self.propose(|inner| Some(inner.value.set_pinned(id, position)));
    }

    fn select_all(&self, checked: bool) {
        // Only loaded rows can be checked.
        if self.is_loaded() {
            self.base.select_all(checked);
        }
    }

    fn scroll_to(&self, top_index: usize) {
        self.propose(|inner| Some(inner.value.scroll_to(top_index)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RowKind;

    type View = AsyncListView<u32, u32, ()>;

    fn props(items: Vec<u32>) -> AsyncListViewProps<u32, u32, ()> {
        AsyncListViewProps::new(
            move || {
                let items = items.clone();
                async move { Ok(items) }
            },
            |n: &u32| *n,
        )
    }

    fn failing() -> AsyncListViewProps<u32, u32, ()> {
        AsyncListViewProps::new(|| async { Err(Error::fetch("backend unavailable")) }, |n: &u32| *n)
    }

    #[test]
    fn test_placeholders_before_load() {
        let view = View::new(Arc::new(SharedTaskQueue::new()));
        view.update(Editable::new(DataSourceState::with_window(20, 3), |_| {}), props(vec![1, 2]));

        let rows = view.get_visible_rows();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.kind == RowKind::Loading));
        assert_eq!(rows[0].index, 20);

        let list = view.get_list_props();
        assert_eq!(list.rows_count, 3);
        assert_eq!(list.total_count, 3);
        assert!(list.is_loading);
        assert!(!list.exact_rows_count);

        // Nothing is in flight yet, so ids resolve against the empty tree.
        let row = view.get_by_id(&1, 5);
        assert!(row.is_unknown());
        assert_eq!(row.index, 5);
        assert_eq!(view.load_state(), LoadState::NotLoaded);
    }

    #[tokio::test]
    async fn test_load_applies_rows() {
        let queue = Arc::new(SharedTaskQueue::new());
        let view = View::new(queue.clone());
        view.update(Editable::new(DataSourceState::with_window(0, 10), |_| {}), props(vec![7, 8]));

        assert_eq!(view.load_data().await, Ok(()));
        assert!(view.is_loaded());
        let ids: Vec<_> = view.get_visible_rows().iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(queue.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_visible_and_not_retried() {
        let view = View::new(Arc::new(SharedTaskQueue::new()));
        view.update(Editable::new(DataSourceState::with_window(0, 4), |_| {}), failing());

        let err = view.load_data().await;
        assert_eq!(err, Err(Error::fetch("backend unavailable")));
        assert_eq!(view.load_state(), LoadState::Failed("backend unavailable".into()));
        assert!(view.get_visible_rows().is_empty());

        let list = view.get_list_props();
        assert_eq!(list.rows_count, 0);
        assert_eq!(list.load_error.as_deref(), Some("backend unavailable"));
        assert!(view.get_by_id(&3, 1).is_unknown());

        // A second call reports the stored error without fetching.
        assert!(view.load_data().await.is_err());

        view.reload();
        assert_eq!(view.load_state(), LoadState::NotLoaded);
        assert!(view.get_list_props().is_reloading);
    }

    #[tokio::test]
    async fn test_load_before_update_is_noop() {
        let view = View::new(Arc::new(SharedTaskQueue::new()));
        assert_eq!(view.load_data().await, Ok(()));
        assert_eq!(view.load_state(), LoadState::NotLoaded);
    }
}
