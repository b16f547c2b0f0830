use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use indexmap::IndexSet;
use remap_entry::{ClassDefEntry, ClassEntry};

use crate::entry_index::EntryView;
use crate::indexer::JarIndexer;
use crate::view::View;

/// Outcome of asking whether one class descends from another.
///
/// `Unknown` means the hierarchy is only partially indexed; it must not be read as
/// `Unrelated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Related,
    Unrelated,
    Unknown,
}

/// Direct superclass/interface edges in both directions.
#[derive(Debug, Default, Clone)]
pub struct InheritanceIndex {
    parents: BTreeMap<ClassEntry, Vec<ClassEntry>>,
    children: BTreeMap<ClassEntry, Vec<ClassEntry>>,
}

impl InheritanceIndex {
    pub fn view(&self) -> View<'_, InheritanceIndex> {
        View::Single(self)
    }

    fn index_parent(&mut self, child: &ClassEntry, parent: &ClassEntry) {
        let parents = self.parents.entry(child.clone()).or_default();
        if !parents.contains(parent) {
            parents.push(parent.clone());
        }
        let children = self.children.entry(parent.clone()).or_default();
        if !children.contains(child) {
            children.push(child.clone());
        }
    }
}

impl JarIndexer for InheritanceIndex {
    fn index_class(&mut self, class: &ClassDefEntry) {
        for parent in class.supertypes() {
            self.index_parent(&class.entry, parent);
        }
    }

    fn name(&self) -> &'static str {
        "inheritance"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type InheritanceView<'a> = View<'a, InheritanceIndex>;

impl<'a> View<'a, InheritanceIndex> {
    /// Superclass and interfaces, in declaration order.
    pub fn parents(self, class: &ClassEntry) -> &'a [ClassEntry] {
        self.first_slice(|index| index.parents.get(class).map_or(&[][..], Vec::as_slice))
    }

    pub fn children(self, class: &ClassEntry) -> &'a [ClassEntry] {
        self.first_slice(|index| index.children.get(class).map_or(&[][..], Vec::as_slice))
    }

    /// Whether any class extends or implements `class`.
    pub fn is_parent(self, class: &ClassEntry) -> bool {
        !self.children(class).is_empty()
    }

    pub fn has_parents(self, class: &ClassEntry) -> bool {
        !self.parents(class).is_empty()
    }

    /// Every transitive subclass and implementor, breadth first, each once.
    pub fn descendants(self, class: &ClassEntry) -> IndexSet<ClassEntry> {
        let mut out = IndexSet::new();
        let mut queue: VecDeque<&ClassEntry> = self.children(class).iter().collect();

        while let Some(next) = queue.pop_front() {
            if !out.insert(next.clone()) {
                continue;
            }
            queue.extend(self.children(next));
        }

        out
    }

    /// Ancestors one generation at a time; each generation holds the parents of the previous
    /// one, duplicates included.
    pub fn generations(self, class: &ClassEntry) -> Generations<'a> {
        Generations {
            index: self,
            next: Some(self.parents(class).iter().collect()),
        }
    }

    /// Lazy breadth-first walk over all ancestors.
    ///
    /// Interfaces reachable through several paths are yielded once per path, and so is
    /// `java/lang/Object`. A generation is only computed once the previous one is exhausted,
    /// so stopping early never expands the rest of the hierarchy. Does not terminate on a
    /// cyclic hierarchy; use [`View::ancestors`] there.
    pub fn stream_ancestors(self, class: &ClassEntry) -> Ancestors<'a> {
        Ancestors {
            inner: self.generations(class).flatten(),
        }
    }

    /// Ancestors in breadth-first order, keeping only the shallowest occurrence of each.
    pub fn ancestors(self, class: &ClassEntry) -> IndexSet<ClassEntry> {
        let mut out = IndexSet::new();
        for generation in self.generations(class) {
            let mut grew = false;
            for ancestor in generation {
                grew |= out.insert(ancestor.clone());
            }
            // Every parent of an already seen class has been seen too.
            if !grew {
                break;
            }
        }
        out
    }

    /// Whether `class` is known to descend from `potential_ancestor`.
    ///
    /// `java/lang/Object` is everybody's ancestor, declared or not. Otherwise the answer is
    /// `Unknown` as soon as an undeclared class is met on the way up, because its own parents
    /// were never indexed.
    pub fn compute_class_relation(
        self,
        entries: EntryView<'_>,
        class: &ClassEntry,
        potential_ancestor: &ClassEntry,
    ) -> Relation {
        if potential_ancestor.is_object() {
            return Relation::Related;
        }
        if !entries.has_class(class) {
            return Relation::Unknown;
        }

        for ancestor in self.ancestors(class) {
            if &ancestor == potential_ancestor {
                return Relation::Related;
            } else if !entries.has_class(&ancestor) {
                return Relation::Unknown;
            }
        }

        Relation::Unrelated
    }

    /// Classes with at least one recorded parent edge.
    pub fn classes_with_parents(self) -> BTreeSet<&'a ClassEntry> {
        self.layers().flat_map(|index| index.parents.keys()).collect()
    }
}

/// See [`View::generations`].
pub struct Generations<'a> {
    index: InheritanceView<'a>,
    next: Option<Vec<&'a ClassEntry>>,
}

impl<'a> Iterator for Generations<'a> {
    type Item = Vec<&'a ClassEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let generation = self.next.take().filter(|generation| !generation.is_empty())?;
        let index = self.index;
        self.next = Some(
            generation
                .iter()
                .flat_map(|class| index.parents(class))
                .collect(),
        );
        Some(generation)
    }
}

/// See [`View::stream_ancestors`].
pub struct Ancestors<'a> {
    inner: std::iter::Flatten<Generations<'a>>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ClassEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
