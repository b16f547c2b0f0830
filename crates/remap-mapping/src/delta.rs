use std::collections::BTreeMap;
use std::ops::Deref;

use remap_entry::Entry;

use crate::tree::EntryTree;

/// An [`EntryTree`] that remembers which entries changed since the last
/// [`DeltaTrackingTree::take_delta`].
///
/// The first write to an entry after a checkpoint records the value it had at that
/// checkpoint. An entry is part of the delta only if its current value differs from that
/// recorded value, so writing a value back undoes the change.
#[derive(Debug, Clone)]
pub struct DeltaTrackingTree<T> {
    tree: EntryTree<T>,
    checkpoint: BTreeMap<Entry, Option<T>>,
}

impl<T> Default for DeltaTrackingTree<T> {
    fn default() -> Self {
        Self {
            tree: EntryTree::new(),
            checkpoint: BTreeMap::new(),
        }
    }
}

impl<T> From<EntryTree<T>> for DeltaTrackingTree<T> {
    /// The initial content counts as the first checkpoint.
    fn from(tree: EntryTree<T>) -> Self {
        Self {
            tree,
            checkpoint: BTreeMap::new(),
        }
    }
}

impl<T> Deref for DeltaTrackingTree<T> {
    type Target = EntryTree<T>;

    fn deref(&self) -> &EntryTree<T> {
        &self.tree
    }
}

impl<T: Clone + PartialEq> DeltaTrackingTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: Entry, value: T) -> Option<T> {
        self.track(&entry);
        self.tree.insert(entry, value)
    }

    pub fn set(&mut self, entry: Entry, value: Option<T>) -> Option<T> {
        self.track(&entry);
        self.tree.set(entry, value)
    }

    pub fn remove(&mut self, entry: &Entry) -> Option<T> {
        self.track(entry);
        self.tree.remove(entry)
    }

    pub fn remove_subtree(&mut self, entry: &Entry) -> Vec<Entry> {
        let valued: Vec<Entry> = self
            .tree
            .find_node(entry)
            .map(|node| {
                node.nodes()
                    .filter(|node| node.has_value())
                    .map(|node| node.entry().clone())
                    .collect()
            })
            .unwrap_or_default();
        for entry in &valued {
            self.track(entry);
        }
        self.tree.remove_subtree(entry)
    }

    fn track(&mut self, entry: &Entry) {
        if !self.checkpoint.contains_key(entry) {
            let current = self.tree.get(entry).cloned();
            self.checkpoint.insert(entry.clone(), current);
        }
    }

    /// Whether any entry differs from the last checkpoint.
    pub fn is_dirty(&self) -> bool {
        self.checkpoint
            .iter()
            .any(|(entry, old)| old.as_ref() != self.tree.get(entry))
    }

    /// Returns the changes since the last checkpoint and starts a new one.
    pub fn take_delta(&mut self) -> MappingDelta<T> {
        let changes = std::mem::take(&mut self.checkpoint)
            .into_iter()
            .filter_map(|(entry, old)| {
                let new = self.tree.get(&entry).cloned();
                (old != new).then_some((entry, Change { old, new }))
            })
            .collect();
        MappingDelta { changes }
    }

    pub fn tree(&self) -> &EntryTree<T> {
        &self.tree
    }

    pub fn into_tree(self) -> EntryTree<T> {
        self.tree
    }
}

/// The value of one entry before and after a series of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
    pub old: Option<T>,
    pub new: Option<T>,
}

/// Entries changed between two checkpoints, in entry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDelta<T> {
    changes: BTreeMap<Entry, Change<T>>,
}

impl<T> Default for MappingDelta<T> {
    fn default() -> Self {
        Self {
            changes: BTreeMap::new(),
        }
    }
}

impl<T> MappingDelta<T> {
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn get(&self, entry: &Entry) -> Option<&Change<T>> {
        self.changes.get(entry)
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.changes.contains_key(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.changes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Entry, &Change<T>)> {
        self.changes.iter()
    }
}
