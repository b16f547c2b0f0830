use std::collections::BTreeMap;

use remap_entry::{MethodDefEntry, MethodEntry, ReturnType, TypeDescriptor};

use crate::entry_index::EntryView;
use crate::error::IndexError;
use crate::inheritance::{InheritanceView, Relation};
use crate::references::ReferenceView;
use crate::view::{MapView, View};

/// Pairs of compiler generated bridge methods and the specialized methods they forward to.
///
/// Derived once all classes are indexed, from the declarations, hierarchy and call graph.
#[derive(Debug, Default, Clone)]
pub struct BridgeMethodIndex {
    bridge_to_specialized: BTreeMap<MethodEntry, MethodEntry>,
    specialized_to_bridge: BTreeMap<MethodEntry, MethodEntry>,
}

impl BridgeMethodIndex {
    pub fn view(&self) -> View<'_, BridgeMethodIndex> {
        View::Single(self)
    }

    /// Scans every synthetic method for a single forwarded call.
    ///
    /// Must run before references are re-targeted to their declarations: a bridge calls the
    /// specialized method through its own class.
    pub(crate) fn find_bridge_methods(
        &mut self,
        entries: EntryView<'_>,
        inheritance: InheritanceView<'_>,
        references: ReferenceView<'_>,
    ) {
        for method in entries.method_defs() {
            if !method.access.is_synthetic() {
                continue;
            }

            let mut called = references.methods_referenced_by(&method.entry);
            let (Some(specialized), None) = (called.next(), called.next()) else {
                continue;
            };

            if method.access.is_bridge()
                || is_potential_bridge(entries, inheritance, method, specialized)
            {
                self.add_pair(inheritance, &method.entry, specialized);
            }
        }

        tracing::debug!(
            target: "remap.index",
            bridges = self.bridge_to_specialized.len(),
            "found bridge methods"
        );
    }

    fn add_pair(
        &mut self,
        inheritance: InheritanceView<'_>,
        bridge: &MethodEntry,
        specialized: &MethodEntry,
    ) {
        self.bridge_to_specialized
            .insert(bridge.clone(), specialized.clone());

        let winner = match self.specialized_to_bridge.get(specialized) {
            // A subclass re-bridging an inherited generic method; keep the bridge declared
            // higher up in the hierarchy.
            Some(existing) => higher_method(inheritance, bridge, existing).clone(),
            None => bridge.clone(),
        };
        self.specialized_to_bridge
            .insert(specialized.clone(), winner);
    }

    /// Registers every specialized method a second time under its bridge's name, so chains
    /// of overrides renamed by intermediate bridges still reach the final bridge.
    pub(crate) fn process_aliases(&mut self) {
        let aliases: Vec<(MethodEntry, MethodEntry)> = self
            .specialized_to_bridge
            .iter()
            .filter(|(specialized, bridge)| specialized.name != bridge.name)
            .map(|(specialized, bridge)| (specialized.with_name(&bridge.name), bridge.clone()))
            .collect();

        tracing::trace!(target: "remap.index", aliases = aliases.len(), "bridge aliases");
        self.specialized_to_bridge.extend(aliases);
    }

    /// Checks that both maps describe the same pairs, up to the renamed aliases.
    pub(crate) fn check_consistency(&self) -> Result<(), IndexError> {
        for (specialized, bridge) in &self.specialized_to_bridge {
            let consistent = self
                .bridge_to_specialized
                .get(bridge)
                .is_some_and(|original| {
                    original == specialized || &original.with_name(&bridge.name) == specialized
                });
            if !consistent {
                return Err(IndexError::Inconsistent {
                    reason: format!(
                        "specialized method {specialized} points at {bridge}, which does not bridge to it"
                    ),
                });
            }
        }

        for (bridge, specialized) in &self.bridge_to_specialized {
            if !self.specialized_to_bridge.contains_key(specialized) {
                return Err(IndexError::Inconsistent {
                    reason: format!(
                        "bridge {bridge} forwards to {specialized}, which has no registered bridge"
                    ),
                });
            }
        }

        Ok(())
    }
}

fn is_potential_bridge(
    entries: EntryView<'_>,
    inheritance: InheritanceView<'_>,
    bridge: &MethodDefEntry,
    specialized: &MethodEntry,
) -> bool {
    // Bridges exist for overriding; a method that cannot be inherited is never one.
    let access = bridge.access;
    if access.is_private() || access.is_final() || access.is_static() {
        return false;
    }

    let bridge_desc = &bridge.entry.desc;
    let specialized_desc = &specialized.desc;
    if bridge_desc.params.len() != specialized_desc.params.len() {
        return false;
    }

    let compatible = |bridge_ty: &TypeDescriptor, specialized_ty: &TypeDescriptor| {
        types_bridge_compatible(entries, inheritance, bridge_ty, specialized_ty)
    };

    let arguments_compatible = bridge_desc
        .params
        .iter()
        .zip(&specialized_desc.params)
        .all(|(b, s)| compatible(b, s));

    arguments_compatible
        && match (&bridge_desc.return_type, &specialized_desc.return_type) {
            (ReturnType::Void, ReturnType::Void) => true,
            (ReturnType::Type(b), ReturnType::Type(s)) => compatible(b, s),
            _ => false,
        }
}

/// Equal types, or two class types that are not provably unrelated.
fn types_bridge_compatible(
    entries: EntryView<'_>,
    inheritance: InheritanceView<'_>,
    bridge: &TypeDescriptor,
    specialized: &TypeDescriptor,
) -> bool {
    if bridge == specialized {
        return true;
    }

    match (bridge.class_entry(), specialized.class_entry()) {
        (Some(bridge), Some(specialized)) => {
            inheritance.compute_class_relation(entries, &specialized, &bridge)
                != Relation::Unrelated
        }
        _ => false,
    }
}

/// `candidate` when its class is an ancestor of `existing`'s class, else `existing`.
fn higher_method<'m>(
    inheritance: InheritanceView<'_>,
    candidate: &'m MethodEntry,
    existing: &'m MethodEntry,
) -> &'m MethodEntry {
    if inheritance
        .descendants(&candidate.owner)
        .contains(&existing.owner)
    {
        candidate
    } else {
        existing
    }
}

pub type BridgeView<'a> = View<'a, BridgeMethodIndex>;

impl<'a> View<'a, BridgeMethodIndex> {
    pub fn is_bridge_method(self, method: &MethodEntry) -> bool {
        self.any(|index| index.bridge_to_specialized.contains_key(method))
    }

    /// True for specialized methods and for their renamed aliases.
    pub fn is_specialized_method(self, method: &MethodEntry) -> bool {
        self.any(|index| index.specialized_to_bridge.contains_key(method))
    }

    pub fn bridge_from_specialized(self, specialized: &MethodEntry) -> Option<&'a MethodEntry> {
        self.first(|index| index.specialized_to_bridge.get(specialized))
    }

    pub fn specialized_from_bridge(self, bridge: &MethodEntry) -> Option<&'a MethodEntry> {
        self.first(|index| index.bridge_to_specialized.get(bridge))
    }

    /// Includes the renamed aliases.
    pub fn specialized_to_bridge(self) -> MapView<'a, MethodEntry, MethodEntry> {
        self.map_view(|index| &index.specialized_to_bridge)
    }

    pub fn bridge_to_specialized(self) -> MapView<'a, MethodEntry, MethodEntry> {
        self.map_view(|index| &index.bridge_to_specialized)
    }
}
