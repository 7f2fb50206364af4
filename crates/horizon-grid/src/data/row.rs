//! Row and list descriptors produced by views.

use std::fmt;
use std::sync::Arc;

use super::state::PinPosition;

/// Stable render key of a row.
///
/// Loaded rows are keyed by their item id. Placeholders shown while data is
/// loading are keyed by their absolute row index so they stay stable while
/// the user scrolls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey<TId> {
    Id(TId),
    Loading(usize),
}

impl<TId: fmt::Display> fmt::Display for RowKey<TId> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Loading(index) => write!(f, "_loading_{}", index),
        }
    }
}

/// What a row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A row backed by an item.
    Item,
    /// A placeholder for data that is still being fetched.
    Loading,
    /// A row for an id that has no item.
    Unknown,
}

/// Everything a renderer needs to draw one row.
#[derive(Debug)]
pub struct DataRowProps<TItem, TId> {
    pub key: RowKey<TId>,
    pub id: Option<TId>,
    /// Absolute position in the projected row list.
    pub index: usize,
    pub value: Option<Arc<TItem>>,
    pub depth: usize,
    /// Ancestor ids, root first.
    pub path: Vec<TId>,
    pub kind: RowKind,
    pub pin: Option<PinPosition>,
    pub is_checked: bool,
    pub is_selected: bool,
    pub is_foldable: bool,
    pub is_folded: bool,
}

impl<TItem, TId: Clone> Clone for DataRowProps<TItem, TId> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            id: self.id.clone(),
            index: self.index,
            value: self.value.clone(),
            depth: self.depth,
            path: self.path.clone(),
            kind: self.kind,
            pin: self.pin,
            is_checked: self.is_checked,
            is_selected: self.is_selected,
            is_foldable: self.is_foldable,
            is_folded: self.is_folded,
        }
    }
}

impl<TItem, TId: Clone> DataRowProps<TItem, TId> {
    /// A placeholder row at `index`.
    pub fn loading(index: usize) -> Self {
        Self {
            key: RowKey::Loading(index),
            id: None,
            index,
            value: None,
            depth: 0,
            path: Vec::new(),
            kind: RowKind::Loading,
            pin: None,
            is_checked: false,
            is_selected: false,
            is_foldable: false,
            is_folded: false,
        }
    }

    /// A row for an id that has no item.
    pub fn unknown(id: TId, index: usize) -> Self {
        Self {
            key: RowKey::Id(id.clone()),
            id: Some(id),
            index,
            value: None,
            depth: 0,
            path: Vec::new(),
            kind: RowKind::Unknown,
            pin: None,
            is_checked: false,
            is_selected: false,
            is_foldable: false,
            is_folded: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.kind == RowKind::Loading
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == RowKind::Unknown
    }

    /// Returns `true` when the row is backed by an item.
    pub fn is_loaded(&self) -> bool {
        self.kind == RowKind::Item
    }
}

/// Tri-state of a "select all" checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectAllState {
    /// All checkable rows are checked.
    pub value: bool,
    /// Some, but not all, checkable rows are checked.
    pub indeterminate: bool,
}

/// Aggregate descriptor of the whole projected list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListProps {
    /// Rows the scroll container should size itself for.
    pub rows_count: usize,
    /// Rows known to exist.
    pub known_rows_count: usize,
    /// Whether `rows_count` is exact rather than an estimate.
    pub exact_rows_count: bool,
    /// Items reachable in the full, unfiltered tree.
    pub total_count: usize,
    /// Present when the view offers "select all".
    pub select_all: Option<SelectAllState>,
    pub is_reloading: bool,
    pub is_loading: bool,
    /// Message of the last failed fetch.
    pub load_error: Option<String>,
}
