//! Immutable structural index over an item collection.
//!
//! [`TreeIndex`] is built once per item snapshot. It answers lookups by id,
//! ordered children of a parent and the recursive item count. Filtering,
//! searching, sorting and patching all return a new index; an existing index
//! is never mutated.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::{span_names, targets};

/// Extracts the id of an item.
pub type GetIdFn<T, Id> = Arc<dyn Fn(&T) -> Id + Send + Sync>;

/// Extracts the parent id of an item. `None` places the item at the root.
pub type GetParentIdFn<T, Id> = Arc<dyn Fn(&T) -> Option<Id> + Send + Sync>;

static GENERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    GENERATION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Result of looking an id up in a [`TreeIndex`].
///
/// `NotFound` is a distinct value rather than an empty item, so callers can
/// render a placeholder without special-casing "null-like" records.
#[derive(Debug)]
pub enum Record<'a, T> {
    /// The item stored under the id.
    Item(&'a Arc<T>),
    /// No item is stored under the id.
    NotFound,
}

impl<'a, T> Record<'a, T> {
    /// Returns `true` for the not-found marker.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Record::NotFound)
    }

    /// Returns the item, if found.
    pub fn item(&self) -> Option<&'a Arc<T>> {
        match self {
            Record::Item(item) => Some(item),
            Record::NotFound => None,
        }
    }
}

impl<T> Clone for Record<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Record<'_, T> {}

struct TreeStorage<T, Id> {
    items: HashMap<Id, Arc<T>>,
    parents: HashMap<Id, Option<Id>>,
    children: HashMap<Option<Id>, Vec<Id>>,
    /// Ids in first-insertion order, used to rebuild on patch.
    order: Vec<Id>,
}

impl<T, Id: Clone + Eq + Hash> TreeStorage<T, Id> {
    fn new() -> Self {
        Self {
            items: HashMap::new(),
            parents: HashMap::new(),
            children: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, id: Id, parent: Option<Id>, item: Arc<T>) {
        if self.items.insert(id.clone(), item).is_some() {
            tracing::warn!(target: targets::TREE, "duplicate item id, keeping the last occurrence");
            let previous = self.parents.insert(id.clone(), parent.clone()).flatten();
            if previous == parent {
                return;
            }
            if let Some(siblings) = self.children.get_mut(&previous) {
                siblings.retain(|sibling| sibling != &id);
                if siblings.is_empty() {
                    self.children.remove(&previous);
                }
            }
            self.children.entry(parent).or_default().push(id);
            return;
        }
        self.parents.insert(id.clone(), parent.clone());
        self.children.entry(parent).or_default().push(id.clone());
        self.order.push(id);
    }

    fn child_ids(&self, parent: Option<&Id>) -> &[Id] {
        self.children
            .get(&parent.cloned())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// An immutable, queryable index over an item collection.
///
/// Cloning is cheap: clones share the same storage and generation.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_grid::data::TreeIndex;
///
/// #[derive(Clone)]
/// struct Node { id: u32, parent: Option<u32> }
///
/// let tree = TreeIndex::build(
///     vec![Node { id: 1, parent: None }, Node { id: 2, parent: Some(1) }],
///     Arc::new(|n: &Node| n.id),
///     Some(Arc::new(|n: &Node| n.parent)),
/// );
///
/// assert_eq!(tree.get_children(Some(&1)).len(), 1);
/// assert!(tree.get_by_id(&3).is_not_found());
/// assert_eq!(tree.get_total_recursive_count(), 2);
/// ```
pub struct TreeIndex<T, Id> {
    storage: Arc<TreeStorage<T, Id>>,
    get_id: GetIdFn<T, Id>,
    get_parent_id: Option<GetParentIdFn<T, Id>>,
    generation: u64,
}

impl<T, Id> Clone for TreeIndex<T, Id> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            get_id: self.get_id.clone(),
            get_parent_id: self.get_parent_id.clone(),
            generation: self.generation,
        }
    }
}

impl<T, Id> std::fmt::Debug for TreeIndex<T, Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeIndex")
            .field("len", &self.storage.items.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T, Id> TreeIndex<T, Id>
where
    T: Send + Sync + 'static,
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// Builds an index from owned items.
    pub fn build<I>(
        items: I,
        get_id: GetIdFn<T, Id>,
        get_parent_id: Option<GetParentIdFn<T, Id>>,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_shared(items.into_iter().map(Arc::new), get_id, get_parent_id)
    }

    /// Builds an index from already shared items.
    pub fn from_shared<I>(
        items: I,
        get_id: GetIdFn<T, Id>,
        get_parent_id: Option<GetParentIdFn<T, Id>>,
    ) -> Self
    where
        I: IntoIterator<Item = Arc<T>>,
    {
        let _span = PerfSpan::new(span_names::TREE_BUILD);
        let mut storage = TreeStorage::new();
        for item in items {
            let id = get_id(item.as_ref());
            let parent = get_parent_id.as_ref().and_then(|f| f(item.as_ref()));
            storage.insert(id, parent, item);
        }

        let index = Self {
            storage: Arc::new(storage),
            get_id,
            get_parent_id,
            generation: next_generation(),
        };
        tracing::debug!(
            target: targets::TREE,
            generation = index.generation,
            len = index.len(),
            "tree index built"
        );
        index
    }

    /// Builds an empty index that shares the extractors of `self`.
    pub fn empty_like(&self) -> Self {
        Self::from_shared(
            std::iter::empty(),
            self.get_id.clone(),
            self.get_parent_id.clone(),
        )
    }

    /// A process-unique number identifying this index snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of items stored in the index, reachable or not.
    pub fn len(&self) -> usize {
        self.storage.items.len()
    }

    /// Returns `true` if the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.storage.items.is_empty()
    }

    /// Looks an item up by id.
    pub fn get_by_id(&self, id: &Id) -> Record<'_, T> {
        match self.storage.items.get(id) {
            Some(item) => Record::Item(item),
            None => Record::NotFound,
        }
    }

    /// Returns `true` if an item with this id exists.
    pub fn contains(&self, id: &Id) -> bool {
        self.storage.items.contains_key(id)
    }

    /// Ordered ids of the children of `parent` (`None` for the root).
    pub fn get_child_ids(&self, parent: Option<&Id>) -> &[Id] {
        self.storage.child_ids(parent)
    }

    /// Ordered children of `parent` (`None` for the root).
    pub fn get_children(&self, parent: Option<&Id>) -> Vec<&Arc<T>> {
        self.get_child_ids(parent)
            .iter()
            .filter_map(|id| self.storage.items.get(id))
            .collect()
    }

    /// Returns `true` if `id` has at least one child.
    pub fn has_children(&self, id: &Id) -> bool {
        !self.get_child_ids(Some(id)).is_empty()
    }

    /// The declared parent id of an item.
    pub fn get_parent_id(&self, id: &Id) -> Option<&Id> {
        self.storage.parents.get(id).and_then(Option::as_ref)
    }

    /// Ancestor ids of `id`, root first, not including `id` itself.
    pub fn get_parent_ids(&self, id: &Id) -> Vec<Id> {
        let mut path = Vec::new();
        let mut current = self.get_parent_id(id);
        while let Some(parent) = current {
            // A parent chain longer than the index means a cycle.
            if path.len() >= self.len() {
                tracing::warn!(target: targets::TREE, "parent cycle detected");
                break;
            }
            path.push(parent.clone());
            current = self.get_parent_id(parent);
        }
        path.reverse();
        path
    }

    /// Nesting depth of `id` (root items have depth 0).
    pub fn depth_of(&self, id: &Id) -> usize {
        self.get_parent_ids(id).len()
    }

    /// Number of items reachable from the root.
    pub fn get_total_recursive_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Id> = self.get_child_ids(None).iter().collect();
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.get_child_ids(Some(id)));
        }
        count
    }

    /// Visits reachable items depth-first in sibling order.
    ///
    /// `descend` decides whether the children of a visited item are visited.
    /// The visitor receives the id, item, depth and whether the item has children.
    pub fn visit<D, V>(&self, mut descend: D, mut visitor: V)
    where
        D: FnMut(&Id) -> bool,
        V: FnMut(&Id, &Arc<T>, usize, bool),
    {
        let mut stack: Vec<(&Id, usize)> = self
            .get_child_ids(None)
            .iter()
            .rev()
            .map(|id| (id, 0))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(item) = self.storage.items.get(id) else {
                continue;
            };
            let children = self.get_child_ids(Some(id));
            visitor(id, item, depth, !children.is_empty());
            if !children.is_empty() && descend(id) {
                stack.extend(children.iter().rev().map(|child| (child, depth + 1)));
            }
        }
    }

    /// Returns a new index keeping items that match `predicate`, plus the
    /// ancestors of every match.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool,
    {
        let mut kept: HashSet<Id> = HashSet::new();
        // Post-order: children are decided before their parent.
        let mut post_order: Vec<&Id> = Vec::with_capacity(self.len());
        let mut stack: Vec<(&Id, bool)> =
            self.get_child_ids(None).iter().map(|id| (id, false)).collect();
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                post_order.push(id);
            } else {
                stack.push((id, true));
                stack.extend(self.get_child_ids(Some(id)).iter().map(|c| (c, false)));
            }
        }

        for id in post_order {
            let matches = self
                .storage
                .items
                .get(id)
                .is_some_and(|item| predicate(item.as_ref()));
            let child_kept = self
                .get_child_ids(Some(id))
                .iter()
                .any(|child| kept.contains(child));
            if matches || child_kept {
                kept.insert(id.clone());
            }
        }

        self.retain(|id| kept.contains(id))
    }

    /// Returns a new index keeping items where every whitespace-separated
    /// word of `search` occurs, case-insensitively, in one of `fields(item)`.
    ///
    /// A blank search returns a clone of `self`.
    pub fn search<F>(&self, search: &str, fields: F) -> Self
    where
        F: Fn(&T) -> Vec<String>,
    {
        let words: Vec<String> = search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return self.clone();
        }

        self.filter(|item| {
            let haystack: Vec<String> = fields(item)
                .iter().map(|f| f.to_lowercase()).collect();
            words
                .iter()
                .all(|word| haystack.iter().any(|field| field.contains(word.as_str())))
        })
    }

    /// Returns a new index with every sibling list stably sorted by `compare`.
    pub fn sort<C>(&self, compare: C) -> Self
    where
        C: Fn(&T, &T) -> CmpOrdering,
    {
        let items = &self.storage.items;
        let mut children = self.storage.children.clone();
        for ids in children.values_mut() {
            ids.sort_by(|a, b| match (items.get(a), items.get(b)) {
                (Some(a), Some(b)) => compare(a.as_ref(), b.as_ref()),
                _ => CmpOrdering::Equal,
            });
        }

        let storage = TreeStorage {
            items: self.storage.items.clone(),
            parents: self.storage.parents.clone(),
            children,
            order: self.storage.order.clone(),
        };
        self.with_storage(storage)
    }

    /// Returns a new index with `items` upserted.
    ///
    /// Existing ids keep their position and take the new value and parent;
    /// new ids are appended.
    pub fn patch<I>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut replaced: HashMap<Id, Arc<T>> = HashMap::new();
        let mut appended: Vec<Arc<T>> = Vec::new();
        for item in items {
            let id = (self.get_id)(&item);
            if self.contains(&id) {
                replaced.insert(id, Arc::new(item));
            } else {
                appended.push(Arc::new(item));
            }
        }

        let existing = self.storage.order.iter().filter_map(|id| {
            replaced
                .remove(id)
                .or_else(|| self.storage.items.get(id).cloned())
        });
        let merged: Vec<Arc<T>> = existing.chain(appended).collect();
        Self::from_shared(merged, self.get_id.clone(), self.get_parent_id.clone())
    }

    fn retain<K>(&self, keep: K) -> Self
    where
        K: Fn(&Id) -> bool,
    {
        let children = self
            .storage
            .children
            .iter()
            .filter(|(parent, _)| parent.as_ref().is_none_or(|p| keep(p)))
            .map(|(parent, ids)| {
                (
                    parent.clone(),
                    ids.iter().filter(|id| keep(id)).cloned().collect::<Vec<_>>(),
                )
            })
            .filter(|(_, ids)| !ids.is_empty())
            .collect();

        let storage = TreeStorage {
            items: self
                .storage
                .items
                .iter()
                .filter(|(id, _)| keep(id))
                .map(|(id, item)| (id.clone(), item.clone()))
                .collect(),
            parents: self
                .storage
                .parents
                .iter()
                .filter(|(id, _)| keep(id))
                .map(|(id, parent)| (id.clone(), parent.clone()))
                .collect(),
            children,
            order: self.storage.order.iter().filter(|id| keep(id)).cloned().collect(),
        };
        self.with_storage(storage)
    }

    fn with_storage(&self, storage: TreeStorage<T, Id>) -> Self {
        let index = Self {
            storage: Arc::new(storage),
            get_id: self.get_id.clone(),
            get_parent_id: self.get_parent_id.clone(),
            generation: next_generation(),
        };
        tracing::trace!(
            target: targets::TREE,
            from = self.generation,
            to = index.generation,
            len = index.len(),
            "derived tree index"
        );
        index
    }
}
