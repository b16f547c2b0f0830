use std::collections::BTreeMap;

use remap_entry::Entry;

/// A hierarchical store keyed by entry path: outer classes, inner classes, members, then
/// parameters.
///
/// Intermediate nodes are created on insertion and removed again once neither they nor any
/// of their descendants hold a value. Children are kept sorted by entry, so every traversal
/// is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTree<T> {
    roots: BTreeMap<Entry, TreeNode<T>>,
}

/// One path segment of an [`EntryTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    entry: Entry,
    value: Option<T>,
    children: BTreeMap<Entry, TreeNode<T>>,
}

impl<T> TreeNode<T> {
    fn new(entry: Entry) -> Self {
        Self {
            entry,
            value: None,
            children: BTreeMap::new(),
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn children(&self) -> impl Iterator<Item = &TreeNode<T>> {
        self.children.values()
    }

    pub fn child_entries(&self) -> impl Iterator<Item = &Entry> {
        self.children.keys()
    }

    /// This node followed by all of its descendants, depth first.
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes { stack: vec![self] }
    }

    /// Entries of this node and every descendant.
    pub fn entries_recursively(&self) -> Vec<Entry> {
        self.nodes().map(|node| node.entry.clone()).collect()
    }

    fn is_dead(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

/// Pre-order traversal; a node is visited before its children.
pub struct Nodes<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.values().rev());
        Some(node)
    }
}

impl<T> Default for EntryTree<T> {
    fn default() -> Self {
        Self {
            roots: BTreeMap::new(),
        }
    }
}

impl<T> EntryTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `entry`, creating parent nodes as needed. Returns the value it
    /// replaced.
    pub fn insert(&mut self, entry: Entry, value: T) -> Option<T> {
        let mut path = entry.ancestry().into_iter();
        let Some(root) = path.next() else {
            return None;
        };

        let mut node = self
            .roots
            .entry(root.clone())
            .or_insert_with(|| TreeNode::new(root));
        for segment in path {
            node = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| TreeNode::new(segment));
        }
        node.value.replace(value)
    }

    /// Stores `Some` values and removes the entry for `None`.
    pub fn set(&mut self, entry: Entry, value: Option<T>) -> Option<T> {
        match value {
            Some(value) => self.insert(entry, value),
            None => self.remove(&entry),
        }
    }

    /// Clears the value at `entry` and prunes nodes left without values or children.
    pub fn remove(&mut self, entry: &Entry) -> Option<T> {
        let path = entry.ancestry();
        let (root, rest) = path.split_first()?;
        let node = self.roots.get_mut(root)?;
        let removed = take_value(node, rest);
        if node.is_dead() {
            self.roots.remove(root);
        }
        removed
    }

    /// Removes the node at `entry` together with its whole subtree and returns the entries
    /// that held a value.
    pub fn remove_subtree(&mut self, entry: &Entry) -> Vec<Entry> {
        let path = entry.ancestry();
        let Some((root, rest)) = path.split_first() else {
            return Vec::new();
        };

        let detached = if rest.is_empty() {
            self.roots.remove(root)
        } else {
            let Some(node) = self.roots.get_mut(root) else {
                return Vec::new();
            };
            let detached = detach(node, rest);
            if node.is_dead() {
                self.roots.remove(root);
            }
            detached
        };

        detached
            .map(|node| {
                node.nodes()
                    .filter(|node| node.has_value())
                    .map(|node| node.entry.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, entry: &Entry) -> Option<&T> {
        self.find_node(entry)?.value.as_ref()
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.get(entry).is_some()
    }

    pub fn find_node(&self, entry: &Entry) -> Option<&TreeNode<T>> {
        let path = entry.ancestry();
        let (root, rest) = path.split_first()?;
        let mut node = self.roots.get(root)?;
        for segment in rest {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = &TreeNode<T>> {
        self.roots.values()
    }

    /// Direct children of `entry` that are present in the tree.
    pub fn children(&self, entry: &Entry) -> Vec<Entry> {
        self.find_node(entry)
            .map(|node| node.children.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Nodes sharing a parent with `entry`, excluding `entry` itself.
    pub fn siblings(&self, entry: &Entry) -> Vec<Entry> {
        let generation = match entry.parent() {
            Some(parent) => self.children(&parent),
            None => self.roots.keys().cloned().collect(),
        };
        generation
            .into_iter()
            .filter(|sibling| sibling != entry)
            .collect()
    }

    /// Every node, depth first with children in entry order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<T>> {
        self.roots.values().flat_map(TreeNode::nodes)
    }

    /// Entries holding a value, in traversal order.
    pub fn all_entries(&self) -> impl Iterator<Item = &Entry> {
        self.iter()
            .filter(|node| node.has_value())
            .map(|node| &node.entry)
    }

    /// `(entry, value)` pairs in traversal order.
    pub fn values(&self) -> impl Iterator<Item = (&Entry, &T)> {
        self.iter()
            .filter_map(|node| node.value.as_ref().map(|value| (&node.entry, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of entries holding a value.
    pub fn len(&self) -> usize {
        self.all_entries().count()
    }

    /// Re-keys every value through `translate`.
    pub fn map_entries(&self, mut translate: impl FnMut(&Entry) -> Entry) -> EntryTree<T>
    where
        T: Clone,
    {
        let mut out = EntryTree::new();
        for (entry, value) in self.values() {
            out.insert(translate(entry), value.clone());
        }
        out
    }
}

fn take_value<T>(node: &mut TreeNode<T>, rest: &[Entry]) -> Option<T> {
    let Some((next, rest)) = rest.split_first() else {
        return node.value.take();
    };
    let child = node.children.get_mut(next)?;
    let removed = take_value(child, rest);
    if child.is_dead() {
        node.children.remove(next);
    }
    removed
}

fn detach<T>(node: &mut TreeNode<T>, rest: &[Entry]) -> Option<TreeNode<T>> {
    let (next, rest) = rest.split_first()?;
    if rest.is_empty() {
        return node.children.remove(next);
    }
    let child = node.children.get_mut(next)?;
    let detached = detach(child, rest);
    if child.is_dead() {
        node.children.remove(next);
    }
    detached
}

impl<T> FromIterator<(Entry, T)> for EntryTree<T> {
    fn from_iter<I: IntoIterator<Item = (Entry, T)>>(iter: I) -> Self {
        let mut tree = EntryTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Extend<(Entry, T)> for EntryTree<T> {
    fn extend<I: IntoIterator<Item = (Entry, T)>>(&mut self, iter: I) {
        for (entry, value) in iter {
            self.insert(entry, value);
        }
    }
}
