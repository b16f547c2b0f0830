use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use remap_entry::{ClassEntry, Entry};
use remap_index::{EntryResolver, IndexSource, ProgressListener, ResolutionStrategy};

use crate::checker::{Dropped, MappingsChecker};
use crate::delta::{DeltaTrackingTree, MappingDelta};
use crate::error::MappingError;
use crate::mapping::{EntryMapping, TokenType};
use crate::merged::{MappingLookup, MergedTree};
use crate::proposal::{DynamicProposal, NameProposer};
use crate::translate::{MappingTranslator, TranslateResult, Translator};
use crate::tree::EntryTree;
use crate::validate::MappingValidator;

/// A mapping session over one index.
///
/// The session is the single writer of its manual mappings. Every edit is resolved against
/// the index, validated and written before the registered proposers are told about it.
pub struct EntryRemapper<I> {
    index: I,
    deobf: DeltaTrackingTree<EntryMapping>,
    proposers: Vec<Box<dyn NameProposer>>,
    /// One tree per proposer, in registration order.
    proposals: Vec<EntryTree<EntryMapping>>,
}

impl<I: IndexSource> EntryRemapper<I> {
    pub fn new(index: I) -> Self {
        Self::with_mappings(index, EntryTree::new(), Vec::new())
    }

    /// Starts a session with existing manual mappings. Static proposals are computed now.
    pub fn with_mappings(
        index: I,
        mappings: EntryTree<EntryMapping>,
        proposers: Vec<Box<dyn NameProposer>>,
    ) -> Self {
        let proposals = proposers
            .iter()
            .map(|proposer| {
                let names = proposer.proposed_names(index.index_view());
                accepted_proposals(proposer.as_ref(), TokenType::JarProposed, names)
                    .filter_map(|(entry, mapping)| Some((entry, mapping?)))
                    .collect::<EntryTree<_>>()
            })
            .collect();

        Self {
            index,
            deobf: DeltaTrackingTree::from(mappings),
            proposers,
            proposals,
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Manual mappings only.
    pub fn deobf_mappings(&self) -> &EntryTree<EntryMapping> {
        self.deobf.tree()
    }

    /// Proposals made by the proposer registered under `id`.
    pub fn proposed_mappings(&self, id: &str) -> Option<&EntryTree<EntryMapping>> {
        let position = self.proposers.iter().position(|proposer| proposer.id() == id)?;
        self.proposals.get(position)
    }

    /// Manual mappings over every proposal tree.
    pub fn mappings(&self) -> MergedTree<'_> {
        MergedTree::new(std::iter::once(self.deobf.tree()).chain(&self.proposals))
    }

    /// The mapping stored for `entry` itself, or [`EntryMapping::DEFAULT`].
    pub fn get_mapping(&self, entry: &Entry) -> EntryMapping {
        self.mappings()
            .get_mapping(entry)
            .cloned()
            .unwrap_or(EntryMapping::DEFAULT)
    }

    pub fn deobfuscator(&self) -> MappingTranslator<'_> {
        MappingTranslator::new(&self.deobf)
            .with_proposals(self.proposals.iter().map(|tree| tree as &dyn MappingLookup))
            .with_index(self.index.index_view())
    }

    pub fn deobfuscate(&self, entry: &Entry) -> Entry {
        self.deobfuscator().translate(entry)
    }

    pub fn extended_deobfuscate(&self, entry: &Entry) -> TranslateResult {
        self.deobfuscator().extended_translate(entry)
    }

    /// Entries with a manual or proposed mapping.
    pub fn obf_entries(&self) -> BTreeSet<Entry> {
        self.mappings().all_entries().into_iter().cloned().collect()
    }

    pub fn obf_children(&self, entry: &Entry) -> BTreeSet<Entry> {
        self.mappings().children(entry)
    }

    /// Checks `put_mapping(entry, mapping)` without writing anything.
    pub fn validate_put_mapping(
        &self,
        entry: &Entry,
        mapping: &EntryMapping,
    ) -> Result<(), MappingError> {
        self.plan(entry, mapping).map(|_| ())
    }

    /// Stores `mapping` for `entry`.
    ///
    /// A rename is stored on the root declarations `entry` resolves to, so every override
    /// picks it up; other changes are stored on the closest declaration. A default mapping
    /// removes what was stored. Nothing is written when validation fails.
    pub fn put_mapping(
        &mut self,
        entry: &Entry,
        mapping: EntryMapping,
    ) -> Result<(), MappingError> {
        let old = self.get_mapping(entry);
        let targets = self.plan(entry, &mapping)?;

        for target in &targets {
            if mapping.is_default() {
                self.deobf.remove(target);
            } else {
                self.deobf.insert(target.clone(), mapping.clone());
            }
        }
        tracing::debug!(
            target: "remap.mapping",
            entry = %entry,
            mapping = %mapping,
            stored = targets.len(),
            "put mapping"
        );

        self.propose_dynamic(entry, &old, &mapping);
        Ok(())
    }

    /// The entries `mapping` would be stored under.
    fn plan(&self, entry: &Entry, mapping: &EntryMapping) -> Result<Vec<Entry>, MappingError> {
        let old = self.get_mapping(entry);
        let renaming = old.target_name() != mapping.target_name();

        let targets: Vec<Entry> = if renaming {
            self.resolve_all_roots(entry).into_iter().collect()
        } else {
            self.index
                .entry_resolver()
                .resolve_entry(entry, ResolutionStrategy::Closest)
        };
        if targets.is_empty() {
            return Err(MappingError::UnknownEntry {
                entry: entry.clone(),
            });
        }

        if let (true, Some(name)) = (renaming, mapping.target_name()) {
            let deobfuscator = self.deobfuscator();
            let validator = MappingValidator::new(self.index.index_view(), &deobfuscator);
            for target in &targets {
                validator.validate_rename(target, name)?;
            }
        }
        Ok(targets)
    }

    /// Root declarations of `entry`. For methods this includes roots reached only through
    /// subclasses that join the owner with other supertypes.
    fn resolve_all_roots(&self, entry: &Entry) -> BTreeSet<Entry> {
        let resolver = self.index.entry_resolver();
        let mut roots: BTreeSet<Entry> = resolver
            .resolve_entry(entry, ResolutionStrategy::Root)
            .into_iter()
            .collect();

        let Entry::Method(method) = entry else {
            return roots;
        };
        let inheritance = self.index.index_view().inheritance();
        let mut known: BTreeSet<ClassEntry> =
            inheritance.ancestors(&method.owner).into_iter().collect();
        known.insert(method.owner.clone());

        for descendant in inheritance.descendants(&method.owner) {
            let joins_other_supertypes = inheritance
                .parents(&descendant)
                .iter()
                .any(|parent| !known.contains(parent));
            known.insert(descendant.clone());
            if joins_other_supertypes {
                let inherited = Entry::Method(method.with_owner(descendant));
                roots.extend(resolver.resolve_entry(&inherited, ResolutionStrategy::Root));
            }
        }
        roots
    }

    fn propose_dynamic(&mut self, entry: &Entry, old: &EntryMapping, new: &EntryMapping) {
        let view = self.index.index_view();
        let updates: Vec<Vec<(Entry, Option<EntryMapping>)>> = {
            let mappings = self.mappings();
            let proposal = DynamicProposal {
                index: view,
                mappings: &mappings,
                entry,
                old,
                new,
            };
            self.proposers
                .iter()
                .map(|proposer| {
                    proposer
                        .dynamic_proposed_names(&proposal)
                        .map(|names| {
                            let token_type = TokenType::DynamicProposed;
                            accepted_proposals(proposer.as_ref(), token_type, names).collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        };

        for (tree, updates) in self.proposals.iter_mut().zip(updates) {
            for (entry, mapping) in updates {
                tree.set(entry, mapping);
            }
        }
    }

    /// Returns the manual mapping changes since the last call.
    pub fn take_mapping_delta(&mut self) -> MappingDelta<EntryMapping> {
        self.deobf.take_delta()
    }

    pub fn is_dirty(&self) -> bool {
        self.deobf.is_dirty()
    }

    /// Removes manual mappings of undeclared entries and of overriding declarations.
    pub fn drop_broken_mappings(&mut self, progress: &dyn ProgressListener) -> Dropped {
        let dropped = MappingsChecker::new(self.index.index_view(), self.deobf.tree())
            .drop_broken_mappings(progress);
        self.apply_drops(&dropped);
        dropped
    }

    /// Removes manual mappings that carry nothing.
    pub fn drop_empty_mappings(&mut self, progress: &dyn ProgressListener) -> Dropped {
        let dropped = MappingsChecker::new(self.index.index_view(), self.deobf.tree())
            .drop_empty_mappings(progress);
        self.apply_drops(&dropped);
        dropped
    }

    fn apply_drops(&mut self, dropped: &Dropped) {
        for entry in dropped.entries() {
            self.deobf.remove_subtree(entry);
        }
    }
}

/// Keeps the proposals `proposer` was allowed to make. A default mapping stands for removal.
fn accepted_proposals<'p>(
    proposer: &'p dyn NameProposer,
    token_type: TokenType,
    names: BTreeMap<Entry, EntryMapping>,
) -> impl Iterator<Item = (Entry, Option<EntryMapping>)> + 'p {
    names.into_iter().filter_map(move |(entry, mapping)| {
        if mapping.is_default() {
            return Some((entry, None));
        }
        if mapping.token_type() != token_type || mapping.source_id() != Some(proposer.id()) {
            tracing::warn!(
                target: "remap.mapping",
                proposer = proposer.id(),
                entry = %entry,
                mapping = %mapping,
                expected = ?token_type,
                "ignoring proposal with a foreign token type or source id"
            );
            return None;
        }
        Some((entry, Some(mapping)))
    })
}

impl<I: fmt::Debug> fmt::Debug for EntryRemapper<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRemapper")
            .field("index", &self.index)
            .field("mappings", &self.deobf.len())
            .field(
                "proposers",
                &self.proposers.iter().map(|p| p.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
