use std::collections::BTreeMap;

use remap_entry::Entry;
use remap_index::{EntryResolver, IndexView, ProgressListener, ResolutionStrategy};

use crate::mapping::EntryMapping;
use crate::tree::{EntryTree, TreeNode};

/// Finds mappings that no longer belong in a mapping tree.
pub struct MappingsChecker<'a> {
    index: IndexView<'a>,
    mappings: &'a EntryTree<EntryMapping>,
}

impl<'a> MappingsChecker<'a> {
    pub fn new(index: IndexView<'a>, mappings: &'a EntryTree<EntryMapping>) -> Self {
        Self { index, mappings }
    }

    /// Mappings of entries that are not declared, or that belong on the declaration they
    /// override. Overriding methods stay while one of their parameters is still mapped.
    pub fn drop_broken_mappings(&self, progress: &dyn ProgressListener) -> Dropped {
        self.check(progress, |checker, entry, _, dropped| {
            checker.is_broken(entry, dropped)
        })
    }

    /// Mappings with neither a name nor documentation and no mapped children.
    pub fn drop_empty_mappings(&self, progress: &dyn ProgressListener) -> Dropped {
        self.check(progress, |checker, entry, mapping, dropped| {
            mapping.target_name().is_none()
                && mapping.javadoc().is_none()
                && !checker.has_mapped_children(entry, dropped)
        })
    }

    fn check(
        &self,
        progress: &dyn ProgressListener,
        should_drop: impl Fn(&Self, &Entry, &EntryMapping, &Dropped) -> bool,
    ) -> Dropped {
        let mut entries: Vec<(&Entry, &EntryMapping)> = self.mappings.values().collect();
        // Children are decided before their parents.
        entries.sort_by(|(a, _), (b, _)| check_order(a).cmp(&check_order(b)).then(a.cmp(b)));

        progress.init(entries.len(), "Checking for dropped mappings");
        let mut dropped = Dropped::default();
        for (i, (entry, mapping)) in entries.into_iter().enumerate() {
            progress.step(i, &entry.to_string());
            if should_drop(self, entry, mapping, &dropped) {
                dropped.record(entry.clone(), mapping);
            }
        }

        if !dropped.is_empty() {
            tracing::info!(
                target: "remap.mapping",
                dropped = dropped.len(),
                "dropped mappings"
            );
        }
        dropped
    }

    fn is_broken(&self, entry: &Entry, dropped: &Dropped) -> bool {
        if !self.index.entries().has_entry(entry) {
            return true;
        }
        let resolved = self
            .index
            .resolver()
            .resolve_entry(entry, ResolutionStrategy::Root);
        if resolved.is_empty() {
            return true;
        }
        if resolved.contains(entry) {
            return false;
        }
        !matches!(entry, Entry::Method(_)) || !self.has_mapped_children(entry, dropped)
    }

    fn has_mapped_children(&self, entry: &Entry, dropped: &Dropped) -> bool {
        self.mappings.find_node(entry).is_some_and(|node| {
            node.children()
                .flat_map(TreeNode::nodes)
                .any(|child| child.has_value() && !dropped.contains(child.entry()))
        })
    }
}

fn check_order(entry: &Entry) -> u8 {
    match entry {
        Entry::LocalVariable(_) => 0,
        Entry::Field(_) | Entry::Method(_) => 1,
        Entry::Class(_) => 2,
    }
}

/// Entries a check decided to drop, with the name they were mapped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dropped {
    entries: BTreeMap<Entry, Option<String>>,
}

impl Dropped {
    fn record(&mut self, entry: Entry, mapping: &EntryMapping) {
        self.entries
            .insert(entry, mapping.target_name().map(str::to_owned));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.contains_key(entry)
    }

    /// Dropped entries and the names they had.
    pub fn iter(&self) -> impl Iterator<Item = (&Entry, Option<&str>)> {
        self.entries
            .iter()
            .map(|(entry, name)| (entry, name.as_deref()))
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.keys()
    }

    /// Removes every dropped entry together with its subtree.
    pub fn apply(&self, tree: &mut EntryTree<EntryMapping>) {
        for entry in self.entries.keys() {
            tree.remove_subtree(entry);
        }
    }
}
