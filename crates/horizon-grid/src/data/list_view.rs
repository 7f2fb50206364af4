//! Synchronous list view over an in-memory item array.
//!
//! `ListView` turns items plus a [`DataSourceState`] into a row projection:
//! filtered, searched, sorted, folded and pinned. Each stage is memoized on
//! the inputs it depends on, so an update that only moves the window or
//! checks a row does not rebuild the tree.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::{span_names, targets};
use parking_lot::{RwLock, RwLockWriteGuard};

use super::row::{DataRowProps, ListProps, RowKey, RowKind, SelectAllState};
use super::state::{DataSourceState, Editable, OnValueChange, PinPosition, SortingOption};
use super::tree::{GetIdFn, GetParentIdFn, TreeIndex};
use super::view::{DataSourceView, ViewSignals};

/// Type alias for a filter function.
///
/// Returns `true` if the item passes the current filter value.
pub type FilterFn<TItem, TFilter> = Arc<dyn Fn(&TItem, &TFilter) -> bool + Send + Sync>;

/// Type alias for a compare function.
///
/// Compares two items ascending on `option.field`. The view applies the
/// option's direction itself.
pub type CompareFn<TItem> =
    Arc<dyn Fn(&TItem, &TItem, &SortingOption) -> Ordering + Send + Sync>;

/// Type alias for a function returning the searchable text of an item.
pub type SearchFieldsFn<TItem> = Arc<dyn Fn(&TItem) -> Vec<String> + Send + Sync>;

/// Configuration of a [`ListView`].
///
/// Items are memoized by `Arc` identity: pass the same `Arc` to skip the tree
/// rebuild, a new one to force it.
pub struct ListViewProps<TItem, TId, TFilter> {
    pub items: Arc<Vec<TItem>>,
    pub get_id: GetIdFn<TItem, TId>,
    pub get_parent_id: Option<GetParentIdFn<TItem, TId>>,
    pub filter: Option<FilterFn<TItem, TFilter>>,
    pub sort: Option<CompareFn<TItem>>,
    pub search_fields: Option<SearchFieldsFn<TItem>>,
    pub select_all: bool,
    pub folded_by_default: bool,
}

impl<TItem, TId, TFilter> Clone for ListViewProps<TItem, TId, TFilter> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            get_id: self.get_id.clone(),
            get_parent_id: self.get_parent_id.clone(),
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            search_fields: self.search_fields.clone(),
            select_all: self.select_all,
            folded_by_default: self.folded_by_default,
        }
    }
}

impl<TItem, TId, TFilter> ListViewProps<TItem, TId, TFilter> {
    /// Props for `items`, identified by `get_id`.
    pub fn new<F>(items: Arc<Vec<TItem>>, get_id: F) -> Self
    where
        F: Fn(&TItem) -> TId + Send + Sync + 'static,
    {
        Self {
            items,
            get_id: Arc::new(get_id),
            get_parent_id: None,
            filter: None,
            sort: None,
            search_fields: None,
            select_all: false,
            folded_by_default: false,
        }
    }

    /// Replaces the items, keeping every other setting.
    pub fn with_items(mut self, items: Arc<Vec<TItem>>) -> Self {
        self.items = items;
        self
    }

    /// Nests items under their parent id.
    pub fn with_parent_id<F>(mut self, get_parent_id: F) -> Self
    where
        F: Fn(&TItem) -> Option<TId> + Send + Sync + 'static,
    {
        self.get_parent_id = Some(Arc::new(get_parent_id));
        self
    }

    /// Sets the filter predicate applied with the state's filter value.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&TItem, &TFilter) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Sets the comparator used for the state's sorting options.
    pub fn with_sort<F>(mut self, compare: F) -> Self
    where
        F: Fn(&TItem, &TItem, &SortingOption) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(compare));
        self
    }

    /// Sets the text fields matched by the state's search string.
    pub fn with_search_fields<F>(mut self, fields: F) -> Self
    where
        F: Fn(&TItem) -> Vec<String> + Send + Sync + 'static,
    {
        self.search_fields = Some(Arc::new(fields));
        self
    }

    /// Offers a "select all" checkbox in the list props.
    pub fn with_select_all(mut self, enabled: bool) -> Self {
        self.select_all = enabled;
        self
    }

    /// Folds parents that have no explicit fold flag.
    pub fn with_folded_by_default(mut self, folded: bool) -> Self {
        self.folded_by_default = folded;
        self
    }
}

/// Inputs the visible tree depends on.
#[derive(PartialEq)]
struct VisibleKey<TFilter> {
    full_generation: u64,
    filter: Option<TFilter>,
    search: Option<String>,
    sorting: Vec<SortingOption>,
}

/// Inputs the row projection depends on.
#[derive(PartialEq)]
struct ProjectionKey<TId: Eq + Hash> {
    visible_generation: u64,
    folded: HashMap<TId, bool>,
    pinned: HashMap<TId, PinPosition>,
    folded_by_default: bool,
}

struct ProjectedRow<TId> {
    id: TId,
    depth: usize,
    path: Vec<TId>,
    pin: Option<PinPosition>,
    is_foldable: bool,
    is_folded: bool,
}

/// The ordered row sequence: top-pinned, body, bottom-pinned.
struct Projection<TId> {
    top: Vec<ProjectedRow<TId>>,
    body: Vec<ProjectedRow<TId>>,
    bottom: Vec<ProjectedRow<TId>>,
    /// Every id reachable in the visible tree, folded or not.
    checkable: Vec<TId>,
    /// Items reachable in the full, unfiltered tree.
    total_count: usize,
    /// Absolute row index by id.
    positions: HashMap<TId, usize>,
}

impl<TId> Projection<TId> {
    fn rows_count(&self) -> usize {
        self.top.len() + self.body.len() + self.bottom.len()
    }
}

struct ListViewState<TItem, TId: Eq + Hash, TFilter> {
    props: Option<ListViewProps<TItem, TId, TFilter>>,
    value: DataSourceState<TFilter, TId>,
    on_value_change: Option<OnValueChange<DataSourceState<TFilter, TId>>>,
    /// Items the full tree was built from. Holding the `Arc` keeps its
    /// address from being reused by a different array.
    items: Option<Arc<Vec<TItem>>>,
    full_tree: Option<TreeIndex<TItem, TId>>,
    visible_key: Option<VisibleKey<TFilter>>,
    visible_tree: Option<TreeIndex<TItem, TId>>,
    projection_key: Option<ProjectionKey<TId>>,
    projection: Option<Projection<TId>>,
    /// Checkable ids that are checked, tallied on each rebuild.
    checked_count: usize,
    is_reloading: bool,
}

impl<TItem, TId, TFilter> ListViewState<TItem, TId, TFilter>
where
    TItem: Clone + Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
    TFilter: Clone + PartialEq + Send + Sync + 'static,
{
    fn new() -> Self {
        Self {
            props: None,
            value: DataSourceState::default(),
            on_value_change: None,
            items: None,
            full_tree: None,
            visible_key: None,
            visible_tree: None,
            projection_key: None,
            projection: None,
            checked_count: 0,
            is_reloading: false,
        }
    }

    fn is_current(&self) -> bool {
        self.props.is_none() || self.projection.is_some()
    }

    fn invalidate(&mut self) {
        self.items = None;
        self.full_tree = None;
        self.visible_key = None;
        self.visible_tree = None;
        self.projection_key = None;
        self.projection = None;
    }

    /// Brings every stage up to date. Returns `true` if any stage was rebuilt.
    fn rebuild(&mut self) -> bool {
        let Some(props) = &self.props else {
            return false;
        };
        let mut rebuilt = false;

        let cached = match (&self.full_tree, &self.items) {
            (Some(tree), Some(items)) if Arc::ptr_eq(items, &props.items) => Some(tree.clone()),
            _ => None,
        };
        let full_tree = match cached {
            Some(tree) => tree,
            None => {
                let tree = TreeIndex::build(
                    props.items.iter().cloned(),
                    props.get_id.clone(),
                    props.get_parent_id.clone(),
                );
                tracing::debug!(
                    target: targets::LIST_VIEW,
                    generation = tree.generation(),
                    items = props.items.len(),
                    "full tree rebuilt"
                );
                self.items = Some(props.items.clone());
                self.full_tree = Some(tree.clone());
                rebuilt = true;
                tree
            }
        };

        let visible_key = VisibleKey {
            full_generation: full_tree.generation(),
            filter: self.value.filter.clone(),
            search: self.value.search_text().map(str::to_owned),
            sorting: self.value.sorting.clone(),
        };
        let cached = self
            .visible_tree
            .as_ref()
            .filter(|_| self.visible_key.as_ref() == Some(&visible_key))
            .cloned();
        let visible_tree = match cached {
            Some(tree) => tree,
            None => {
                let tree = derive_visible_tree(&full_tree, props, &visible_key);
                tracing::debug!(
                    target: targets::LIST_VIEW,
                    generation = tree.generation(),
                    reachable = tree.get_total_recursive_count(),
                    "visible tree rebuilt"
                );
                self.visible_key = Some(visible_key);
                self.visible_tree = Some(tree.clone());
                rebuilt = true;
                tree
            }
        };

        let projection_key = ProjectionKey {
            visible_generation: visible_tree.generation(),
            folded: self.value.folded.clone(),
            pinned: self.value.pinned.clone(),
            folded_by_default: props.folded_by_default,
        };
        if self.projection.is_none() || self.projection_key.as_ref() != Some(&projection_key) {
            let searching = self
                .visible_key
                .as_ref()
                .is_some_and(|key| key.search.is_some());
            let projection = project(
                &visible_tree,
                &self.value,
                props.folded_by_default,
                searching,
                full_tree.get_total_recursive_count(),
            );
            tracing::debug!(
                target: targets::LIST_VIEW,
                rows = projection.rows_count(),
                top_pinned = projection.top.len(),
                bottom_pinned = projection.bottom.len(),
                "row projection rebuilt"
            );
            self.projection_key = Some(projection_key);
            self.projection = Some(projection);
            rebuilt = true;
        }

        if props.select_all
            && let Some(projection) = &self.projection
        {
            self.checked_count = projection
                .checkable
                .iter()
                .filter(|id| self.value.checked.contains(id))
                .count();
        }

        rebuilt
    }

    fn materialize(&self, row: &ProjectedRow<TId>, index: usize) -> DataRowProps<TItem, TId> {
        let value = self
            .visible_tree
            .as_ref()
            .and_then(|tree| tree.get_by_id(&row.id).item().cloned());
        DataRowProps {
            key: RowKey::Id(row.id.clone()),
            id: Some(row.id.clone()),
            index,
            kind: if value.is_some() { RowKind::Item } else { RowKind::Unknown },
            value,
            depth: row.depth,
            path: row.path.clone(),
            pin: row.pin,
            is_checked: self.value.checked.contains(&row.id),
            is_selected: self.value.selected_id.as_ref() == Some(&row.id),
            is_foldable: row.is_foldable,
            is_folded: row.is_folded,
        }
    }

    fn visible_rows(&self) -> Vec<DataRowProps<TItem, TId>> {
        let Some(projection) = &self.projection else {
            return Vec::new();
        };
        let visible_count = self.value.visible_count;
        let top_len = projection.top.len();
        let body_len = projection.body.len();

        let top_take = top_len.min(visible_count);
        let remaining = visible_count - top_take;
        let bottom_take = projection.bottom.len().min(remaining);
        let body_slots = remaining - bottom_take;
        let start = self.value.top_index.min(body_len);
        let end = start.saturating_add(body_slots).min(body_len);

        tracing::trace!(
            target: targets::LIST_VIEW,
            top_index = self.value.top_index,
            visible_count,
            body_start = start,
            body_end = end,
            "resolving window"
        );

        let mut rows = Vec::with_capacity(top_take + (end - start) + bottom_take);
        rows.extend(
            projection.top[..top_take]
                .iter()
                .enumerate()
                .map(|(i, row)| self.materialize(row, i)),
        );
        rows.extend(
            projection.body[start..end]
                .iter()
                .enumerate()
                .map(|(i, row)| self.materialize(row, top_len + start + i)),
        );
        rows.extend(
            projection.bottom[..bottom_take]
                .iter()
                .enumerate()
                .map(|(i, row)| self.materialize(row, top_len + body_len + i)),
        );
        rows
    }

    fn row_by_id(&self, id: &TId, index: usize) -> DataRowProps<TItem, TId> {
        if let Some(projection) = &self.projection
            && let Some(&position) = projection.positions.get(id)
        {
            let top_len = projection.top.len();
            let body_len = projection.body.len();
            let row = if position < top_len {
                &projection.top[position]
            } else if position < top_len + body_len {
                &projection.body[position - top_len]
            } else {
                &projection.bottom[position - top_len - body_len]
            };
            return self.materialize(row, index);
        }

        // Filtered out or folded away: resolve against the full tree.
        let Some(tree) = &self.full_tree else {
            return DataRowProps::unknown(id.clone(), index);
        };
        match tree.get_by_id(id).item() {
            Some(item) => DataRowProps {
                key: RowKey::Id(id.clone()),
                id: Some(id.clone()),
                index,
                value: Some(item.clone()),
                depth: tree.depth_of(id),
                path: tree.get_parent_ids(id),
                kind: RowKind::Item,
                pin: self.value.pinned.get(id).copied(),
                is_checked: self.value.checked.contains(id),
                is_selected: self.value.selected_id.as_ref() == Some(id),
                is_foldable: tree.has_children(id),
                is_folded: self.value.is_folded(
                    id,
                    self.props.as_ref().is_some_and(|p| p.folded_by_default),
                ),
            },
            None => DataRowProps::unknown(id.clone(), index),
        }
    }

    fn list_props(&self) -> ListProps {
        let Some(projection) = &self.projection else {
            return ListProps {
                is_reloading: self.is_reloading,
                ..ListProps::default()
            };
        };
        let rows_count = projection.rows_count();
        let select_all = self
            .props
            .as_ref()
            .filter(|props| props.select_all)
            .map(|_| {
                let checked = self.checked_count;
                let all = !projection.checkable.is_empty() && checked == projection.checkable.len();
                SelectAllState {
                    value: all,
                    indeterminate: checked > 0 && !all,
                }
            });

        ListProps {
            rows_count,
            known_rows_count: rows_count,
            exact_rows_count: true,
            total_count: projection.total_count,
            select_all,
            is_reloading: self.is_reloading,
            is_loading: false,
            load_error: None,
        }
    }
}

fn derive_visible_tree<TItem, TId, TFilter>(
    full_tree: &TreeIndex<TItem, TId>,
    props: &ListViewProps<TItem, TId, TFilter>,
    key: &VisibleKey<TFilter>,
) -> TreeIndex<TItem, TId>
where
    TItem: Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
{
    let mut tree = full_tree.clone();

    if let (Some(filter), Some(value)) = (&props.filter, &key.filter) {
        tree = tree.filter(|item| filter(item, value));
    }

    if let Some(search) = &key.search {
        match &props.search_fields {
            Some(fields) => tree = tree.search(search, |item| fields(item)),
            None => tracing::debug!(
                target: targets::LIST_VIEW,
                "search text ignored, no search fields configured"
            ),
        }
    }

    if let Some(compare) = &props.sort
        && !key.sorting.is_empty()
    {
        tree = tree.sort(|a, b| {
            key.sorting
                .iter()
                .map(|option| option.direction.apply(compare(a, b, option)))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }

    tree
}

fn project<TItem, TId, TFilter>(
    tree: &TreeIndex<TItem, TId>,
    state: &DataSourceState<TFilter, TId>,
    folded_by_default: bool,
    searching: bool,
    total_count: usize,
) -> Projection<TId>
where
    TItem: Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
    TFilter: Clone,
{
    let _span = PerfSpan::new(span_names::PROJECTION);
    let mut top = Vec::new();
    let mut body = Vec::new();
    let mut bottom = Vec::new();
    let mut checkable = Vec::new();

    let mut ancestors: Vec<TId> = Vec::new();
    // Depth of the folded ancestor hiding the current subtree.
    let mut folded_at: Option<usize> = None;

    tree.visit(
        |_| true,
        |id, _, depth, has_children| {
            ancestors.truncate(depth);
            if folded_at.is_some_and(|d| depth <= d) {
                folded_at = None;
            }
            let hidden = folded_at.is_some();
            // While searching every match is shown expanded.
            let is_folded = has_children && !searching && state.is_folded(id, folded_by_default);
            if is_folded && !hidden {
                folded_at = Some(depth);
            }

            let pin = state.pinned.get(id).copied();
            let row = ProjectedRow {
                id: id.clone(),
                depth,
                path: ancestors.clone(),
                pin,
                is_foldable: has_children,
                is_folded,
            };
            match pin {
                Some(PinPosition::Top) => top.push(row),
                Some(PinPosition::Bottom) => bottom.push(row),
                None if !hidden => body.push(row),
                None => {}
            }

            checkable.push(id.clone());
            ancestors.push(id.clone());
        },
    );

    let positions = top
        .iter()
        .chain(body.iter())
        .chain(bottom.iter())
        .enumerate()
        .map(|(index, row)| (row.id.clone(), index))
        .collect();

    Projection {
        top,
        body,
        bottom,
        checkable,
        total_count,
        positions,
    }
}

/// A view over an in-memory item array.
///
/// All methods take `&self`; the projection lives behind a lock so a view can
/// be shared with the rendering layer.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_grid::data::{DataSourceState, DataSourceView, Editable, ListView, ListViewProps};
///
/// let view: ListView<u32, u32, ()> = ListView::new();
/// let props = ListViewProps::new(Arc::new((0..100).collect()), |n: &u32| *n);
/// view.update(Editable::new(DataSourceState::with_window(10, 5), |_| {}), props);
///
/// let rows = view.get_visible_rows();
/// assert_eq!(rows.len(), 5);
/// assert_eq!(rows[0].index, 10);
/// assert_eq!(view.get_list_props().rows_count, 100);
/// ```
pub struct ListView<TItem, TId: Eq + Hash, TFilter> {
    state: RwLock<ListViewState<TItem, TId, TFilter>>,
    signals: ViewSignals,
}

impl<TItem, TId, TFilter> Default for ListView<TItem, TId, TFilter>
where
    TItem: Clone + Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
    TFilter: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<TItem, TId, TFilter> ListView<TItem, TId, TFilter>
where
    TItem: Clone + Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
    TFilter: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a view with no items. Call [`update`](Self::update) to feed it.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ListViewState::new()),
            signals: ViewSignals::new(),
        }
    }

    /// Feeds the latest state and props.
    ///
    /// Stages whose inputs are unchanged are reused; calling this twice with
    /// the same inputs rebuilds nothing. Emits `rows_changed` if anything
    /// observable changed.
    pub fn update(
        &self,
        editable: Editable<DataSourceState<TFilter, TId>>,
        props: ListViewProps<TItem, TId, TFilter>,
    ) {
        let changed = {
            let mut state = self.state.write();
            let value_changed = state.value != editable.value;
            state.value = editable.value;
            state.on_value_change = Some(editable.on_value_change);
            state.props = Some(props);
            let rebuilt = state.rebuild();
            let was_reloading = std::mem::take(&mut state.is_reloading);
            rebuilt || value_changed || was_reloading
        };

        if changed {
            self.signals.rows_changed.emit(());
        } else {
            tracing::trace!(target: targets::LIST_VIEW, "update with unchanged inputs");
        }
    }

    /// The full, unfiltered tree of the current items.
    pub fn full_tree(&self) -> Option<TreeIndex<TItem, TId>> {
        self.with_current(|state| state.full_tree.clone())
    }

    /// The filtered, searched and sorted tree the rows are projected from.
    pub fn visible_tree(&self) -> Option<TreeIndex<TItem, TId>> {
        self.with_current(|state| state.visible_tree.clone())
    }

    /// The state last passed to [`update`](Self::update).
    pub fn value(&self) -> DataSourceState<TFilter, TId> {
        self.state.read().value.clone()
    }

    /// Whether [`reload`](DataSourceView::reload) was called since the last update.
    pub fn is_reloading(&self) -> bool {
        self.state.read().is_reloading
    }

    /// Proposes `id` flipped between checked and unchecked.
    pub fn toggle_checked(&self, id: &TId) {
        self.propose(|state| Some(state.value.set_checked(id, !state.value.checked.contains(id))));
    }

    /// Runs `f` against up-to-date stages, rebuilding them first if a reload
    /// dropped them.
    fn with_current<R>(&self, f: impl FnOnce(&ListViewState<TItem, TId, TFilter>) -> R) -> R {
        {
            let state = self.state.read();
            if state.is_current() {
                return f(&state);
            }
        }
        let mut state = self.state.write();
        state.rebuild();
        let state = RwLockWriteGuard::downgrade(state);
        f(&state)
    }

    /// Builds the next state from the current one and hands it to the
    /// change handler. The lock is released before the handler runs, so the
    /// handler may call `update` synchronously.
    fn propose<F>(&self, next: F)
    where
        F: FnOnce(&ListViewState<TItem, TId, TFilter>) -> Option<DataSourceState<TFilter, TId>>,
    {
        let proposal = self.with_current(|state| {
            let handler = state.on_value_change.clone()?;
            next(state).map(|value| (handler, value))
        });
        match proposal {
            Some((handler, value)) => handler(value),
            None => tracing::trace!(target: targets::LIST_VIEW, "no change handler, proposal dropped"),
        }
    }
}

impl<TItem, TId, TFilter> DataSourceView<TItem, TId> for ListView<TItem, TId, TFilter>
where
    TItem: Clone + Send + Sync + 'static,
    TId: Clone + Eq + Hash + Send + Sync + 'static,
    TFilter: Clone + PartialEq + Send + Sync + 'static,
{
    fn get_visible_rows(&self) -> Vec<DataRowProps<TItem, TId>> {
        self.with_current(ListViewState::visible_rows)
    }

    fn get_by_id(&self, id: &TId, index: usize) -> DataRowProps<TItem, TId> {
        self.with_current(|state| state.row_by_id(id, index))
    }

    fn get_list_props(&self) -> ListProps {
        self.with_current(ListViewState::list_props)
    }

    fn reload(&self) {
        {
            let mut state = self.state.write();
            state.invalidate();
            state.is_reloading = true;
        }
        tracing::debug!(target: targets::LIST_VIEW, "caches dropped for reload");
        self.signals.rows_changed.emit(());
    }

    fn signals(&self) -> &ViewSignals {
        &self.signals
    }

    fn set_checked(&self, id: &TId, checked: bool) {
        self.propose(|state| Some(state.value.set_checked(id, checked)));
    }

    fn set_selected(&self, id: Option<&TId>) {
        self.propose(|state| Some(state.value.set_selected(id)));
    }

    fn toggle_fold(&self, id: &TId) {
        self.propose(|state| {
            let folded_by_default = state.props.as_ref()?.folded_by_default;
            let folded = state.value.is_folded(id, folded_by_default);
            Some(state.value.set_folded(id, !folded))
        });
    }

    fn set_pinned(&self, id: &TId, position: Option<PinPosition>) {
        self.propose(|state| Some(state.value.set_pinned(id, position)));
    }

    fn select_all(&self, checked: bool) {
        self.propose(|state| {
            let projection = state.projection.as_ref()?;
            Some(state.value.set_checked_many(&projection.checkable, checked))
        });
    }

    fn scroll_to(&self, top_index: usize) {
        self.propose(|state| Some(state.value.scroll_to(top_index)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct File {
        id: u32,
        parent: Option<u32>,
        name: &'static str,
        size: u32,
    }

    fn file(id: u32, parent: Option<u32>, name: &'static str, size: u32) -> File {
        File {
            id,
            parent,
            name,
            size,
        }
    }

    fn files() -> Arc<Vec<File>> {
        Arc::new(vec![
            file(1, None, "docs", 0),
            file(2, Some(1), "report.txt", 30),
            file(3, Some(1), "notes.txt", 10),
            file(4, None, "music", 0),
            file(5, Some(4), "song.mp3", 20),
        ])
    }

    type State = DataSourceState<u32, u32>;

    fn props(items: Arc<Vec<File>>) -> ListViewProps<File, u32, u32> {
        ListViewProps::new(items, |f: &File| f.id)
            .with_parent_id(|f: &File| f.parent)
            .with_filter(|f: &File, min: &u32| f.size >= *min)
            .with_sort(|a: &File, b: &File, option: &SortingOption| match option.field.as_str() {
                "size" => a.size.cmp(&b.size),
                _ => a.name.cmp(b.name),
            })
            .with_search_fields(|f: &File| vec![f.name.to_string()])
            .with_select_all(true)
    }

    fn ids(view: &ListView<File, u32, u32>) -> Vec<u32> {
        view.get_visible_rows()
            .iter()
            .filter_map(|row| row.id)
            .collect()
    }

    #[test]
    fn test_tree_projection_depth_first() {
        let view = ListView::new();
        view.update(Editable::new(State::with_window(0, 10), |_| {}), props(files()));

        let rows = view.get_visible_rows();
        assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[1].path, vec![1]);
        assert!(rows[0].is_foldable);
        assert!(!rows[1].is_foldable);
        assert_eq!(view.get_list_props().total_count, 5);
    }

    #[test]
    fn test_folding_hides_children() {
        let view = ListView::new();
        let state = State::with_window(0, 10).set_folded(&1, true);
        view.update(Editable::new(state, |_| {}), props(files()));

        assert_eq!(ids(&view), vec![1, 4, 5]);
        assert!(view.get_visible_rows()[0].is_folded);
        assert_eq!(view.get_list_props().rows_count, 3);
    }

    #[test]
    fn test_folded_by_default() {
        let view = ListView::new();
        view.update(
            Editable::new(State::with_window(0, 10).set_folded(&4, false), |_| {}),
            props(files()).with_folded_by_default(true),
        );
        assert_eq!(ids(&view), vec![1, 4, 5]);
    }

    #[test]
    fn test_search_ignores_folding() {
        let view = ListView::new();
        let mut state = State::with_window(0, 10).set_folded(&1, true);
        state.search = Some("REPORT".into());
        view.update(Editable::new(state, |_| {}), props(files()));

        assert_eq!(ids(&view), vec![1, 2]);
        assert!(!view.get_visible_rows()[0].is_folded);
    }

    #[test]
    fn test_filter_and_sort() {
        let view = ListView::new();
        let mut state = State::with_window(0, 10);
        state.filter = Some(15);
        state.sorting = vec![SortingOption::desc("size")];
        view.update(Editable::new(state, |_| {}), props(files()));

        // Parents survive through matching children; siblings sorted by size desc.
        assert_eq!(ids(&view), vec![1, 2, 4, 5]);
        assert_eq!(view.get_list_props().total_count, 5);
        assert_eq!(view.get_list_props().rows_count, 4);

        let mut state = State::with_window(0, 10);
        state.sorting = vec![SortingOption::asc("size")];
        view.update(Editable::new(state, |_| {}), props(files()));
        assert_eq!(ids(&view), vec![1, 3, 2, 4, 5]);
    }

    #[test]
    fn test_pinned_rows_take_edge_slots() {
        let view = ListView::new();
        let state = State::with_window(1, 3)
            .set_pinned(&5, Some(PinPosition::Top))
            .set_pinned(&2, Some(PinPosition::Bottom));
        view.update(Editable::new(state, |_| {}), props(files()));

        let rows = view.get_visible_rows();
        let got: Vec<_> = rows.iter().map(|r| (r.id, r.index, r.pin)).collect();
        // Body is [1, 3, 4]; the window starts at body position 1.
        assert_eq!(
            got,
            vec![
                (Some(5), 0, Some(PinPosition::Top)),
                (Some(3), 2, None),
                (Some(2), 4, Some(PinPosition::Bottom)),
            ]
        );
        assert_eq!(view.get_list_props().rows_count, 5);
    }

    #[test]
    fn test_update_is_memoized() {
        let view = ListView::new();
        let items = files();
        let emitted = Arc::new(Mutex::new(0));
        let emitted_clone = emitted.clone();
        view.signals().rows_changed.connect(move |_| *emitted_clone.lock() += 1);

        view.update(Editable::new(State::with_window(0, 10), |_| {}), props(items.clone()));
        let tree = view.full_tree().map(|t| t.generation());
        let visible = view.visible_tree().map(|t| t.generation());

        view.update(Editable::new(State::with_window(0, 10), |_| {}), props(items.clone()));
        assert_eq!(view.full_tree().map(|t| t.generation()), tree);
        assert_eq!(view.visible_tree().map(|t| t.generation()), visible);
        assert_eq!(*emitted.lock(), 1);

        // Moving the window reuses every tree.
        view.update(Editable::new(State::with_window(2, 10), |_| {}), props(items));
        assert_eq!(view.visible_tree().map(|t| t.generation()), visible);
        assert_eq!(*emitted.lock(), 2);

        // New items rebuild.
        view.update(Editable::new(State::with_window(2, 10), |_| {}), props(files()));
        assert_ne!(view.full_tree().map(|t| t.generation()), tree);
        assert_eq!(*emitted.lock(), 3);
    }

    #[test]
    fn test_proposals_reach_handler() {
        let view = ListView::new();
        let proposed: Arc<Mutex<Vec<State>>> = Arc::new(Mutex::new(Vec::new()));
        let proposed_clone = proposed.clone();
        view.update(
            Editable::new(State::with_window(0, 10), move |next| proposed_clone.lock().push(next)),
            props(files()),
        );

        view.set_checked(&2, true);
        view.toggle_fold(&1);
        view.set_selected(Some(&3));
        view.scroll_to(4);
        view.select_all(true);

        let proposed = proposed.lock();
        assert!(proposed[0].checked.contains(&2));
        assert_eq!(proposed[1].folded.get(&1), Some(&true));
        assert_eq!(proposed[2].selected_id, Some(3));
        assert_eq!(proposed[3].top_index, 4);
        assert_eq!(proposed[4].checked.len(), 5);
        // The view itself never adopts its own proposals.
        assert!(view.value().checked.is_empty());
    }

    #[test]
    fn test_select_all_state() {
        let view = ListView::new();
        view.update(Editable::new(State::with_window(0, 10), |_| {}), props(files()));
        assert_eq!(
            view.get_list_props().select_all,
            Some(SelectAllState {
                value: false,
                indeterminate: false
            })
        );

        let state = State::with_window(0, 10).set_checked(&2, true);
        view.update(Editable::new(state.clone(), |_| {}), props(files()));
        assert_eq!(
            view.get_list_props().select_all,
            Some(SelectAllState {
                value: false,
                indeterminate: true
            })
        );

        let all = state.set_checked_many(&[1, 2, 3, 4, 5], true);
        view.update(Editable::new(all, |_| {}), props(files()));
        let rows = view.get_visible_rows();
        assert!(rows.iter().all(|r| r.is_checked));
        assert_eq!(view.get_list_props().select_all.map(|s| s.value), Some(true));
    }

    #[test]
    fn test_list_counts_follow_items_and_checks() {
        let view = ListView::new();
        let items = files();
        let checked = State::with_window(0, 10).set_checked_many(&[1, 2, 3], true);
        view.update(Editable::new(checked.clone(), |_| {}), props(items.clone()));
        let visible = view.visible_tree().map(|t| t.generation());
        assert_eq!(view.get_list_props().select_all.map(|s| s.indeterminate), Some(true));

        // Checking the rest keeps the trees but refreshes the tally.
        let all = checked.set_checked_many(&[4, 5], true);
        view.update(Editable::new(all.clone(), |_| {}), props(items));
        assert_eq!(view.visible_tree().map(|t| t.generation()), visible);
        assert_eq!(view.get_list_props().select_all.map(|s| s.value), Some(true));

        let mut grown = files().as_ref().clone();
        grown.push(file(6, None, "video", 40));
        view.update(Editable::new(all, |_| {}), props(Arc::new(grown)));
        let list = view.get_list_props();
        assert_eq!(list.total_count, 6);
        assert_eq!(
            list.select_all,
            Some(SelectAllState {
                value: false,
                indeterminate: true
            })
        );
    }

    #[test]
    fn test_get_by_id_outside_projection() {
        let view = ListView::new();
        let mut state = State::with_window(0, 10);
        state.filter = Some(25);
        view.update(Editable::new(state, |_| {}), props(files()));

        let hidden = view.get_by_id(&3, 7);
        assert_eq!(hidden.kind, RowKind::Item);
        assert_eq!(hidden.index, 7);
        assert_eq!(hidden.path, vec![1]);

        let missing = view.get_by_id(&99, 3);
        assert!(missing.is_unknown());
        assert_eq!(missing.index, 3);
    }

    #[test]
    fn test_reload_rebuilds_lazily() {
        let view = ListView::new();
        let items = files();
        view.update(Editable::new(State::with_window(0, 10), |_| {}), props(items.clone()));
        let before = view.full_tree().map(|t| t.generation());

        view.reload();
        assert!(view.get_list_props().is_reloading);
        assert_eq!(view.get_visible_rows().len(), 5);
        assert_ne!(view.full_tree().map(|t| t.generation()), before);

        view.update(Editable::new(State::with_window(0, 10), |_| {}), props(items));
        assert!(!view.get_list_props().is_reloading);
    }

    #[test]
    fn test_window_past_end_is_empty() {
        let view = ListView::new();
        view.update(Editable::new(State::with_window(50, 10), |_| {}), props(files()));
        assert!(view.get_visible_rows().is_empty());

        let view: ListView<File, u32, u32> = ListView::new();
        assert!(view.get_visible_rows().is_empty());
        assert_eq!(view.get_list_props(), ListProps::default());
    }
}
