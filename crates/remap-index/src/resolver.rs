use std::collections::BTreeSet;

use remap_entry::{AccessFlags, ClassEntry, Entry, MethodEntry};

use crate::jar_index::IndexView;

/// Which declaration a member reference resolves to when several ancestors declare it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStrategy {
    /// The declaration nearest to the referenced class.
    Closest,
    /// The topmost declarations of the override chain.
    Root,
}

/// Maps entries as they are referenced to the entries that actually declare them.
pub trait EntryResolver {
    /// Matching declarations in entry order. Empty when nothing matches and the entry itself
    /// is not declared.
    fn resolve_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Vec<Entry>;

    fn resolve_first_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Option<Entry> {
        self.resolve_entry(entry, strategy).into_iter().next()
    }

    /// Typed form of [`EntryResolver::resolve_first_entry`].
    fn resolve_first<E>(&self, entry: E, strategy: ResolutionStrategy) -> Option<E>
    where
        E: Into<Entry> + TryFrom<Entry>,
        Self: Sized,
    {
        self.resolve_first_entry(&entry.into(), strategy)
            .and_then(|resolved| E::try_from(resolved).ok())
    }

    /// Every entry that must share a name with `entry`: the entry itself or, for methods and
    /// their parameters, the same slot in every equivalent method.
    fn resolve_equivalent_entries(&self, entry: &Entry) -> BTreeSet<Entry>;

    /// Overrides and bridges that must be renamed together with `method`.
    fn resolve_equivalent_methods(&self, method: &MethodEntry) -> BTreeSet<MethodEntry>;
}

/// Resolves nothing; every entry stands for itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidEntryResolver;

impl EntryResolver for VoidEntryResolver {
    fn resolve_entry(&self, entry: &Entry, _strategy: ResolutionStrategy) -> Vec<Entry> {
        vec![entry.clone()]
    }

    fn resolve_equivalent_entries(&self, entry: &Entry) -> BTreeSet<Entry> {
        BTreeSet::from([entry.clone()])
    }

    fn resolve_equivalent_methods(&self, method: &MethodEntry) -> BTreeSet<MethodEntry> {
        BTreeSet::from([method.clone()])
    }
}

/// Resolution backed by a built index.
///
/// Members are looked up through the class hierarchy: `Sub.field` resolves to the ancestor
/// declaring `field`, and an overriding method resolves to the closest or the root
/// declarations it overrides. Private and static members, fields and declared members under
/// [`ResolutionStrategy::Closest`] always resolve to themselves. Specialized methods resolve
/// through their bridge.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntryResolver<'a> {
    index: IndexView<'a>,
}

impl<'a> IndexEntryResolver<'a> {
    pub fn new(index: IndexView<'a>) -> Self {
        Self { index }
    }

    fn resolve_in_ancestry(
        &self,
        member: &Entry,
        strategy: ResolutionStrategy,
        skip_static: bool,
        stack: &mut BTreeSet<Entry>,
    ) -> BTreeSet<Entry> {
        if !stack.insert(member.clone()) {
            // Cyclic hierarchy.
            return BTreeSet::new();
        }
        let resolved = self.resolve_in_ancestry_inner(member, strategy, skip_static, stack);
        stack.remove(member);
        resolved
    }

    fn resolve_in_ancestry_inner(
        &self,
        member: &Entry,
        strategy: ResolutionStrategy,
        skip_static: bool,
        stack: &mut BTreeSet<Entry>,
    ) -> BTreeSet<Entry> {
        let owner = member.containing_class();

        if let Entry::Method(method) = member {
            let bridge = self
                .index
                .bridges()
                .bridge_from_specialized(method)
                .filter(|bridge| &bridge.owner == owner && *bridge != method);
            if let Some(bridge) = bridge {
                let bridge = Entry::Method(bridge.clone());
                let resolved = self.resolve_in_ancestry(&bridge, strategy, skip_static, stack);
                return if resolved.is_empty() {
                    BTreeSet::from([bridge])
                } else {
                    resolved
                };
            }
        }

        let mut resolved = BTreeSet::new();
        for parent in self.index.inheritance().parents(owner) {
            let ancestor_member = with_owner(member, parent);
            match strategy {
                ResolutionStrategy::Root => {
                    // The topmost match wins; only fall back to this level when nothing
                    // above matches.
                    let above =
                        self.resolve_in_ancestry(&ancestor_member, strategy, skip_static, stack);
                    if !above.is_empty() {
                        resolved.extend(above);
                    } else if self.is_visible(&ancestor_member, skip_static) {
                        resolved.insert(ancestor_member);
                    }
                }
                ResolutionStrategy::Closest => {
                    if self.is_visible(&ancestor_member, skip_static) {
                        resolved.insert(ancestor_member);
                    } else {
                        resolved.extend(self.resolve_in_ancestry(
                            &ancestor_member,
                            strategy,
                            skip_static,
                            stack,
                        ));
                    }
                }
            }
        }
        resolved
    }

    /// Declared, inheritable and, when resolving an instance member, not static.
    fn is_visible(&self, member: &Entry, skip_static: bool) -> bool {
        self.index
            .entries()
            .entry_access(member)
            .is_some_and(|access| !access.is_private() && !(skip_static && access.is_static()))
    }

    fn collect_equivalent(
        &self,
        root: &MethodEntry,
        out: &mut BTreeSet<MethodEntry>,
        seen: &mut BTreeSet<MethodEntry>,
    ) {
        if !seen.insert(root.clone()) {
            return;
        }

        let entries = self.index.entries();
        let bridges = self.index.bridges();
        let owners = std::iter::once(root.owner.clone())
            .chain(self.index.inheritance().descendants(&root.owner));

        for owner in owners {
            let candidate = root.with_owner(owner);
            let Some(access) = entries.method_access(&candidate) else {
                continue;
            };
            if can_inherit(&candidate, access) {
                out.insert(candidate.clone());
            }
            if let Some(bridge) = bridges.bridge_from_specialized(&candidate) {
                self.collect_equivalent(bridge, out, seen);
            }
        }
    }
}

impl EntryResolver for IndexEntryResolver<'_> {
    fn resolve_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Vec<Entry> {
        let Some(member) = class_member(entry) else {
            return vec![entry.clone()];
        };

        let access = self.index.entries().entry_access(&member);
        if let Some(access) = access {
            // Members that exist are their own closest declaration; private and static
            // members and fields are never overridden.
            if strategy == ResolutionStrategy::Closest
                || access.is_private()
                || access.is_static()
                || matches!(member, Entry::Field(_))
            {
                return vec![entry.clone()];
            }
        }

        let resolved =
            self.resolve_in_ancestry(&member, strategy, access.is_some(), &mut BTreeSet::new());
        if !resolved.is_empty() {
            let replaced: BTreeSet<Entry> = resolved
                .iter()
                .map(|member| replace_member(entry, member))
                .collect();
            return replaced.into_iter().collect();
        }

        match access {
            Some(_) => vec![entry.clone()],
            None => Vec::new(),
        }
    }

    fn resolve_equivalent_entries(&self, entry: &Entry) -> BTreeSet<Entry> {
        let method = match entry {
            Entry::Method(method) => method,
            Entry::LocalVariable(local) => &local.method,
            _ => return BTreeSet::from([entry.clone()]),
        };
        if !self.index.entries().has_method(method) {
            return BTreeSet::from([entry.clone()]);
        }

        self.resolve_equivalent_methods(method)
            .iter()
            .map(|equivalent| replace_member(entry, &Entry::Method(equivalent.clone())))
            .collect()
    }

    fn resolve_equivalent_methods(&self, method: &MethodEntry) -> BTreeSet<MethodEntry> {
        let mut out = BTreeSet::from([method.clone()]);
        let Some(access) = self.index.entries().method_access(method) else {
            return out;
        };
        if !can_inherit(method, access) {
            return out;
        }

        let roots: Vec<MethodEntry> = self
            .resolve_entry(&Entry::Method(method.clone()), ResolutionStrategy::Root)
            .into_iter()
            .filter_map(|root| MethodEntry::try_from(root).ok())
            .collect();

        let mut seen = BTreeSet::new();
        for root in &roots {
            self.collect_equivalent(root, &mut out, &mut seen);
        }

        tracing::trace!(
            target: "remap.index",
            method = %method,
            equivalent = out.len(),
            "resolved equivalent methods"
        );
        out
    }
}

fn can_inherit(method: &MethodEntry, access: AccessFlags) -> bool {
    !method.is_constructor() && !access.is_private() && !access.is_static() && !access.is_final()
}

/// The field or method an entry belongs to; local variables belong to their method.
fn class_member(entry: &Entry) -> Option<Entry> {
    match entry {
        Entry::Class(_) => None,
        Entry::Field(_) | Entry::Method(_) => Some(entry.clone()),
        Entry::LocalVariable(local) => Some(Entry::Method(local.method.clone())),
    }
}

fn replace_member(entry: &Entry, member: &Entry) -> Entry {
    match (entry, member) {
        (Entry::LocalVariable(local), Entry::Method(method)) => {
            Entry::LocalVariable(local.with_method(method.clone()))
        }
        _ => member.clone(),
    }
}

fn with_owner(member: &Entry, owner: &ClassEntry) -> Entry {
    match member {
        Entry::Field(field) => Entry::Field(field.with_owner(owner.clone())),
        Entry::Method(method) => Entry::Method(method.with_owner(owner.clone())),
        other => other.clone(),
    }
}
