use std::collections::BTreeMap;

use remap_entry::Entry;
use remap_index::IndexView;

use crate::mapping::EntryMapping;
use crate::merged::{MappingLookup, MergedTree};
use crate::translate::MappingTranslator;

/// Suggests names for entries nobody named yet.
///
/// Proposers are consulted in registration order; the first proposal for an entry wins.
/// Static proposals must use [`TokenType::JarProposed`](crate::TokenType::JarProposed),
/// dynamic ones [`TokenType::DynamicProposed`](crate::TokenType::DynamicProposed), and both
/// must carry the proposer's [`NameProposer::id`] as source id.
pub trait NameProposer: Send + Sync {
    /// Stable identifier recorded on every proposed mapping.
    fn id(&self) -> &str;

    /// Names derived once from index facts when a session starts.
    fn proposed_names(&self, index: IndexView<'_>) -> BTreeMap<Entry, EntryMapping>;

    /// Names to update after `proposal.entry` changed. A default mapping removes a previous
    /// proposal. `None` means nothing to update.
    fn dynamic_proposed_names(
        &self,
        proposal: &DynamicProposal<'_>,
    ) -> Option<BTreeMap<Entry, EntryMapping>> {
        let _ = proposal;
        None
    }
}

/// An edit reported to [`NameProposer::dynamic_proposed_names`].
pub struct DynamicProposal<'a> {
    pub index: IndexView<'a>,
    /// Every mapping of the session after the edit, manual mappings first.
    pub mappings: &'a MergedTree<'a>,
    pub entry: &'a Entry,
    pub old: &'a EntryMapping,
    pub new: &'a EntryMapping,
}

impl<'a> DynamicProposal<'a> {
    /// Translates entries the way the session does after the edit.
    pub fn deobfuscator(&self) -> MappingTranslator<'a> {
        let mappings: &'a dyn MappingLookup = self.mappings;
        MappingTranslator::new(mappings).with_index(self.index)
    }
}
