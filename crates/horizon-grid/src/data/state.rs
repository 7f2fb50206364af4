//! Caller-owned view state and the editable wrapper views write through.
//!
//! Views never mutate a [`DataSourceState`] in place. Interaction handlers
//! build a modified copy and hand it to [`Editable::on_value_change`]; the
//! caller stores it and passes it back on the next update.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Sort direction of a sorting option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Applies the direction to an ascending comparison result.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortingOption {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortingOption {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Where a pinned row is held in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPosition {
    Top,
    Bottom,
}

/// Snapshot of everything the user controls about a view.
///
/// `top_index` and `visible_count` describe the rendered window over the
/// projected rows. Checked, selected, pinned and folded are keyed by id so
/// they survive re-sorting and re-filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "TFilter: Serialize, TId: Serialize + Eq + Hash",
    deserialize = "TFilter: Deserialize<'de>, TId: Deserialize<'de> + Eq + Hash"
))]
pub struct DataSourceState<TFilter, TId> {
    #[serde(default)]
    pub filter: Option<TFilter>,
    #[serde(default)]
    pub sorting: Vec<SortingOption>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub checked: HashSet<TId>,
    #[serde(default)]
    pub selected_id: Option<TId>,
    #[serde(default)]
    pub pinned: HashMap<TId, PinPosition>,
    #[serde(default)]
    pub folded: HashMap<TId, bool>,
    #[serde(default)]
    pub top_index: usize,
    #[serde(default)]
    pub visible_count: usize,
}

impl<TFilter: PartialEq, TId: Eq + Hash> PartialEq for DataSourceState<TFilter, TId> {
    fn eq(&self, other: &Self) -> bool {
        self.filter == other.filter
            && self.sorting == other.sorting
            && self.search == other.search
            && self.checked == other.checked
            && self.selected_id == other.selected_id
            && self.pinned == other.pinned
            && self.folded == other.folded
            && self.top_index == other.top_index
            && self.visible_count == other.visible_count
    }
}

impl<TFilter, TId> Default for DataSourceState<TFilter, TId> {
    fn default() -> Self {
        Self {
            filter: None,
            sorting: Vec::new(),
            search: None,
            checked: HashSet::new(),
            selected_id: None,
            pinned: HashMap::new(),
            folded: HashMap::new(),
            top_index: 0,
            visible_count: 0,
        }
    }
}

impl<TFilter, TId> DataSourceState<TFilter, TId>
where
    TFilter: Clone,
    TId: Clone + Eq + Hash,
{
    /// A state showing `visible_count` rows from the top.
    pub fn with_window(top_index: usize, visible_count: usize) -> Self {
        Self {
            top_index,
            visible_count,
            ..Self::default()
        }
    }

    /// The trimmed search text, or `None` if blank.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether `id` is folded, given the default for unseen ids.
    pub fn is_folded(&self, id: &TId, folded_by_default: bool) -> bool {
        self.folded.get(id).copied().unwrap_or(folded_by_default)
    }

    /// Copy with `id` checked or unchecked.
    pub fn set_checked(&self, id: &TId, checked: bool) -> Self {
        let mut next = self.clone();
        if checked {
            next.checked.insert(id.clone());
        } else {
            next.checked.remove(id);
        }
        next
    }

    /// Copy with `ids` all checked or all unchecked.
    pub fn set_checked_many<'a, I>(&self, ids: I, checked: bool) -> Self
    where
        I: IntoIterator<Item = &'a TId>,
        TId: 'a,
    {
        let mut next = self.clone();
        for id in ids {
            if checked {
                next.checked.insert(id.clone());
            } else {
                next.checked.remove(id);
            }
        }
        next
    }

    /// Copy with `id` selected, or nothing selected for `None`.
    pub fn set_selected(&self, id: Option<&TId>) -> Self {
        Self {
            selected_id: id.cloned(),
            ..self.clone()
        }
    }

    /// Copy with the fold flag of `id` set.
    pub fn set_folded(&self, id: &TId, folded: bool) -> Self {
        let mut next = self.clone();
        next.folded.insert(id.clone(), folded);
        next
    }

    /// Copy with `id` pinned at `position`, or unpinned for `None`.
    pub fn set_pinned(&self, id: &TId, position: Option<PinPosition>) -> Self {
        let mut next = self.clone();
        match position {
            Some(position) => {
                next.pinned.insert(id.clone(), position);
            }
            None => {
                next.pinned.remove(id);
            }
        }
        next
    }

    /// Copy with the window moved to `top_index`.
    pub fn scroll_to(&self, top_index: usize) -> Self {
        Self {
            top_index,
            ..self.clone()
        }
    }
}

/// Change handler of an [`Editable`].
pub type OnValueChange<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A value paired with the handler that accepts its replacement.
pub struct Editable<T> {
    pub value: T,
    pub on_value_change: OnValueChange<T>,
}

impl<T> Editable<T> {
    /// Pair `value` with a change handler.
    pub fn new<F>(value: T, on_value_change: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            value,
            on_value_change: Arc::new(on_value_change),
        }
    }

    /// Hand a proposed value to the owner.
    pub fn propose(&self, value: T) {
        (self.on_value_change)(value);
    }
}

impl<T: Clone> Clone for Editable<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            on_value_change: self.on_value_change.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Editable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editable")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type State = DataSourceState<String, u32>;

    #[test]
    fn test_transitions_return_new_state() {
        let state = State::with_window(0, 10);
        let checked = state.set_checked(&3, true);

        assert!(state.checked.is_empty());
        assert!(checked.checked.contains(&3));
        assert!(!checked.set_checked(&3, false).checked.contains(&3));

        let folded = state.set_folded(&1, true);
        assert!(folded.is_folded(&1, false));
        assert!(!state.is_folded(&1, false));
        assert!(state.is_folded(&1, true));

        let pinned = state.set_pinned(&2, Some(PinPosition::Top));
        assert_eq!(pinned.pinned.get(&2), Some(&PinPosition::Top));
        assert!(pinned.set_pinned(&2, None).pinned.is_empty());

        assert_eq!(state.set_selected(Some(&5)).selected_id, Some(5));
        assert_eq!(state.scroll_to(40).top_index, 40);
    }

    #[test]
    fn test_search_text_ignores_blank() {
        let mut state = State::default();
        assert_eq!(state.search_text(), None);
        state.search = Some("   ".into());
        assert_eq!(state.search_text(), None);
        state.search = Some(" beach ".into());
        assert_eq!(state.search_text(), Some("beach"));
    }

    #[test]
    fn test_editable_propose_reaches_owner() {
        let stored = Arc::new(Mutex::new(None));
        let stored_clone = stored.clone();
        let editable = Editable::new(State::default(), move |next: State| {
            *stored_clone.lock() = Some(next);
        });

        editable.propose(editable.value.set_selected(Some(&9)));
        assert_eq!(stored.lock().as_ref().and_then(|s| s.selected_id), Some(9));
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let state = State::with_window(5, 20).set_pinned(&1, Some(PinPosition::Bottom));
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["topIndex"], 5);
        assert_eq!(json["visibleCount"], 20);
        assert_eq!(json["pinned"]["1"], "bottom");

        let parsed: State = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, state);

        let sparse: State = serde_json::from_str(r#"{"visibleCount": 3}"#).unwrap();
        assert_eq!(sparse.visible_count, 3);
        assert!(sparse.sorting.is_empty());
    }

    #[test]
    fn test_sort_direction_apply() {
        use std::cmp::Ordering;
        assert_eq!(SortDirection::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
    }
}
