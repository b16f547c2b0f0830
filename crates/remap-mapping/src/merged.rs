use std::collections::BTreeSet;

use remap_entry::Entry;

use crate::delta::DeltaTrackingTree;
use crate::mapping::EntryMapping;
use crate::tree::EntryTree;

/// Read access to stored mappings.
pub trait MappingLookup {
    fn get_mapping(&self, entry: &Entry) -> Option<&EntryMapping>;

    /// Whether a non-default mapping is stored for `entry`.
    fn has_mapping(&self, entry: &Entry) -> bool {
        self.get_mapping(entry)
            .is_some_and(|mapping| !mapping.is_default())
    }
}

impl MappingLookup for EntryTree<EntryMapping> {
    fn get_mapping(&self, entry: &Entry) -> Option<&EntryMapping> {
        self.get(entry)
    }
}

impl MappingLookup for DeltaTrackingTree<EntryMapping> {
    fn get_mapping(&self, entry: &Entry) -> Option<&EntryMapping> {
        self.get(entry)
    }
}

impl<T: MappingLookup + ?Sized> MappingLookup for &T {
    fn get_mapping(&self, entry: &Entry) -> Option<&EntryMapping> {
        (**self).get_mapping(entry)
    }
}

/// Mapping trees stacked by priority.
///
/// A lookup answers from the first layer with a non-default mapping. A default mapping stored
/// in a higher layer only wins when no lower layer has anything better.
#[derive(Debug, Clone, Default)]
pub struct MergedTree<'a> {
    layers: Vec<&'a EntryTree<EntryMapping>>,
}

impl<'a> MergedTree<'a> {
    pub fn new(layers: impl IntoIterator<Item = &'a EntryTree<EntryMapping>>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    pub fn layers(&self) -> &[&'a EntryTree<EntryMapping>] {
        &self.layers
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.layers.iter().any(|layer| layer.contains(entry))
    }

    /// Children present in any layer.
    pub fn children(&self, entry: &Entry) -> BTreeSet<Entry> {
        self.layers
            .iter()
            .flat_map(|layer| layer.children(entry))
            .collect()
    }

    /// Entries with a value in any layer.
    pub fn all_entries(&self) -> BTreeSet<&'a Entry> {
        self.layers
            .iter()
            .flat_map(|layer| layer.all_entries())
            .collect()
    }
}

impl MappingLookup for MergedTree<'_> {
    fn get_mapping(&self, entry: &Entry) -> Option<&EntryMapping> {
        let mut fallback = None;
        for layer in &self.layers {
            match layer.get(entry) {
                Some(mapping) if !mapping.is_default() => return Some(mapping),
                Some(mapping) => {
                    fallback.get_or_insert(mapping);
                }
                None => {}
            }
        }
        fallback
    }
}
