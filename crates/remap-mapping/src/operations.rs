//! Whole-tree operations on mapping trees.

use std::collections::{BTreeMap, BTreeSet};

use remap_entry::Entry;

use crate::error::CompositionConflict;
use crate::mapping::EntryMapping;
use crate::translate::{MappingTranslator, Translator};
use crate::tree::EntryTree;

/// What [`invert_with`] does when two entries invert to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvertPolicy {
    /// The entry visited later in traversal order wins.
    #[default]
    LastWins,
    /// The entry visited first wins.
    FirstWins,
    /// The collision is returned as an error.
    Reject,
}

/// Swaps obfuscated and deobfuscated names; see [`invert_with`]. Collisions are resolved with
/// [`InvertPolicy::LastWins`].
pub fn invert(tree: &EntryTree<EntryMapping>) -> EntryTree<EntryMapping> {
    let mut inverted = EntryTree::new();
    for (target, _, mapping) in inverted_pairs(tree) {
        inverted.insert(target, mapping);
    }
    inverted
}

/// Builds the tree that maps deobfuscated names back to obfuscated ones.
///
/// Each mapped entry is re-keyed by its translated entry and its mapping takes the
/// obfuscated name. Mappings without a name, such as local variables or documentation-only
/// mappings, are moved to the translated entry unchanged. Entries are visited depth first in
/// entry order; `policy` decides what happens when two of them translate to the same entry.
pub fn invert_with(
    tree: &EntryTree<EntryMapping>,
    policy: InvertPolicy,
) -> Result<EntryTree<EntryMapping>, CompositionConflict> {
    let mut inverted = EntryTree::new();
    let mut sources: BTreeMap<Entry, Entry> = BTreeMap::new();

    for (target, source, mapping) in inverted_pairs(tree) {
        if let Some(first) = sources.get(&target) {
            tracing::debug!(
                target: "remap.mapping",
                target_entry = %target,
                first = %first,
                second = %source,
                ?policy,
                "inverted entries collide"
            );
            match policy {
                InvertPolicy::LastWins => {}
                InvertPolicy::FirstWins => continue,
                InvertPolicy::Reject => {
                    return Err(CompositionConflict {
                        target,
                        first: first.clone(),
                        second: source.clone(),
                    })
                }
            }
        }
        sources.insert(target.clone(), source.clone());
        inverted.insert(target, mapping);
    }
    Ok(inverted)
}

fn inverted_pairs(
    tree: &EntryTree<EntryMapping>,
) -> impl Iterator<Item = (Entry, &Entry, EntryMapping)> + '_ {
    let translator = MappingTranslator::new(tree);
    tree.values().map(move |(entry, mapping)| {
        let target = translator.translate(entry);
        let inverted = match (entry.name(), mapping.target_name()) {
            (Some(name), Some(_)) => mapping.renamed(Some(name.to_owned())),
            _ => mapping.clone(),
        };
        (target, entry, inverted)
    })
}

/// Merges two trees path by path.
///
/// A path mapped by one side only keeps that side's mapping. A path both sides map to
/// different values takes the right mapping when `keep_right` is set, otherwise the left one
/// when `keep_left` is set, otherwise it is left out.
pub fn compose(
    left: &EntryTree<EntryMapping>,
    right: &EntryTree<EntryMapping>,
    keep_left: bool,
    keep_right: bool,
) -> EntryTree<EntryMapping> {
    let mut composed = EntryTree::new();
    let mut cleared = 0usize;

    let paths: BTreeSet<&Entry> = left.all_entries().chain(right.all_entries()).collect();
    for entry in paths {
        let value = match (left.get(entry), right.get(entry)) {
            (Some(ours), Some(theirs)) if ours != theirs => {
                if keep_right {
                    Some(theirs)
                } else if keep_left {
                    Some(ours)
                } else {
                    cleared += 1;
                    None
                }
            }
            (ours, theirs) => ours.or(theirs),
        };
        if let Some(value) = value {
            composed.insert(entry.clone(), value.clone());
        }
    }

    tracing::debug!(
        target: "remap.mapping",
        left = left.len(),
        right = right.len(),
        composed = composed.len(),
        cleared,
        "composed mappings"
    );
    composed
}

/// Chains `left` (names A to B) with `right` (names B to C) into a tree naming A to C.
///
/// For every entry of `left` the mapping stored in `right` under its translated entry wins.
/// Entries only `left` maps are kept when `keep_left` is set. Entries of `right` that no
/// entry of `left` translated to are kept when `keep_right` is set; they are re-keyed through
/// the inverse of `left` so the result stays keyed by A names.
pub fn chain(
    left: &EntryTree<EntryMapping>,
    right: &EntryTree<EntryMapping>,
    keep_left: bool,
    keep_right: bool,
) -> EntryTree<EntryMapping> {
    let left_translator = MappingTranslator::new(left);
    let mut chained = EntryTree::new();
    let mut matched = BTreeSet::new();

    for (entry, mapping) in left.values() {
        let middle = left_translator.translate(entry);
        match right.get(&middle) {
            Some(right_mapping) => {
                chained.insert(entry.clone(), right_mapping.clone());
                matched.insert(middle);
            }
            None if keep_left => {
                chained.insert(entry.clone(), mapping.clone());
            }
            None => {}
        }
    }

    if keep_right {
        let inverse = invert(left);
        let inverse_translator = MappingTranslator::new(&inverse);
        for (entry, mapping) in right.values() {
            if !matched.contains(entry) {
                chained.insert(inverse_translator.translate(entry), mapping.clone());
            }
        }
    }

    tracing::debug!(
        target: "remap.mapping",
        left = left.len(),
        right = right.len(),
        chained = chained.len(),
        "chained mappings"
    );
    chained
}
