use remap_entry::{
    ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodDescriptor, MethodEntry,
    TypeDescriptor,
};
use remap_index::{EntryResolver, IndexView, ResolutionStrategy};

use crate::mapping::EntryMapping;
use crate::merged::MappingLookup;

/// The outcome of translating one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateResult {
    /// The renamed entry; owners and descriptors are translated as well.
    pub value: Entry,
    /// The mapping the name was taken from.
    pub mapping: EntryMapping,
    /// The entry `mapping` is stored under. Differs from the translated entry when the name
    /// came from an overridden declaration or a bridge method.
    pub bound: Entry,
}

impl TranslateResult {
    pub fn obfuscated(entry: &Entry) -> Self {
        Self {
            value: entry.clone(),
            mapping: EntryMapping::DEFAULT,
            bound: entry.clone(),
        }
    }

    /// The display name: the mapped name, else the name of the translated entry.
    pub fn name(&self) -> Option<&str> {
        self.mapping.target_name().or_else(|| self.value.name())
    }

    pub fn is_obfuscated(&self) -> bool {
        self.mapping.target_name().is_none()
    }
}

/// Renames entries.
pub trait Translator {
    fn extended_translate(&self, entry: &Entry) -> TranslateResult;

    fn translate(&self, entry: &Entry) -> Entry {
        self.extended_translate(entry).value
    }

    fn translate_class(&self, class: &ClassEntry) -> ClassEntry {
        match self.translate(&Entry::Class(class.clone())) {
            Entry::Class(translated) => translated,
            _ => class.clone(),
        }
    }

    fn translate_field(&self, field: &FieldEntry) -> FieldEntry {
        match self.translate(&Entry::Field(field.clone())) {
            Entry::Field(translated) => translated,
            _ => field.clone(),
        }
    }

    fn translate_method(&self, method: &MethodEntry) -> MethodEntry {
        match self.translate(&Entry::Method(method.clone())) {
            Entry::Method(translated) => translated,
            _ => method.clone(),
        }
    }

    fn translate_type(&self, desc: &TypeDescriptor) -> TypeDescriptor {
        desc.map_classes(&mut |name: &str| {
            self.translate_class(&ClassEntry::new(name)).full_name().to_owned()
        })
    }

    fn translate_method_descriptor(&self, desc: &MethodDescriptor) -> MethodDescriptor {
        desc.map_classes(|name: &str| {
            self.translate_class(&ClassEntry::new(name)).full_name().to_owned()
        })
    }
}

/// Leaves every entry as it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidTranslator;

impl Translator for VoidTranslator {
    fn extended_translate(&self, entry: &Entry) -> TranslateResult {
        TranslateResult::obfuscated(entry)
    }
}

/// Rebuilds `entry` with `name` as its own name and every enclosing class, owner and
/// descriptor class translated by `translator`.
pub(crate) fn rebuild<T: Translator + ?Sized>(
    translator: &T,
    entry: &Entry,
    name: Option<&str>,
) -> Entry {
    match entry {
        Entry::Class(class) => {
            let own = name.unwrap_or(class.name());
            match class.outer_class() {
                Some(outer) => Entry::Class(ClassEntry::new(format!(
                    "{}${own}",
                    translator.translate_class(&outer).full_name()
                ))),
                None => Entry::Class(ClassEntry::new(own)),
            }
        }
        Entry::Field(field) => Entry::Field(FieldEntry::new(
            translator.translate_class(&field.owner),
            name.unwrap_or(&field.name),
            translator.translate_type(&field.desc),
        )),
        Entry::Method(method) => Entry::Method(MethodEntry::new(
            translator.translate_class(&method.owner),
            name.unwrap_or(&method.name),
            translator.translate_method_descriptor(&method.desc),
        )),
        Entry::LocalVariable(local) => Entry::LocalVariable(LocalVariableEntry::new(
            translator.translate_method(&local.method),
            local.index,
        )),
    }
}

/// Translates entries through stored mappings.
///
/// The name of an entry is looked up in this order:
///
/// 1. the main mappings, at the root declaration the entry resolves to;
/// 2. for specialized methods, the mapping of their bridge method;
/// 3. for parameters of specialized methods, the same parameter of the bridge method;
/// 4. each proposal layer in order;
/// 5. otherwise the obfuscated name is kept.
///
/// Parameters whose slot is the implicit `this` of an instance method are never renamed.
/// Without an index, entries are looked up as they are.
pub struct MappingTranslator<'a> {
    mappings: &'a dyn MappingLookup,
    proposals: Vec<&'a dyn MappingLookup>,
    index: Option<IndexView<'a>>,
}

impl<'a> MappingTranslator<'a> {
    pub fn new(mappings: &'a dyn MappingLookup) -> Self {
        Self {
            mappings,
            proposals: Vec::new(),
            index: None,
        }
    }

    pub fn with_index(mut self, index: IndexView<'a>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_proposals(
        mut self,
        proposals: impl IntoIterator<Item = &'a dyn MappingLookup>,
    ) -> Self {
        self.proposals.extend(proposals);
        self
    }

    fn resolve_root(&self, entry: &Entry) -> Entry {
        self.index
            .and_then(|index| {
                index
                    .resolver()
                    .resolve_first_entry(entry, ResolutionStrategy::Root)
            })
            .unwrap_or_else(|| entry.clone())
    }

    fn lookup_main(&self, entry: &Entry) -> Option<(EntryMapping, Entry)> {
        let resolved = self.resolve_root(entry);
        self.mappings
            .get_mapping(&resolved)
            .filter(|mapping| !mapping.is_default())
            .map(|mapping| (mapping.clone(), resolved))
    }

    /// The mapping of the bridge forwarding to `entry` or, for parameters, to their method.
    fn lookup_bridge(&self, entry: &Entry) -> Option<(EntryMapping, Entry)> {
        let bridges = self.index?.bridges();
        let bridged = match entry {
            Entry::Method(method) => {
                Entry::Method(bridges.bridge_from_specialized(method)?.clone())
            }
            Entry::LocalVariable(local) => Entry::LocalVariable(
                local.with_method(bridges.bridge_from_specialized(&local.method)?.clone()),
            ),
            _ => return None,
        };
        self.lookup_main(&bridged)
    }

    fn lookup_proposals(&self, entry: &Entry) -> Option<(EntryMapping, Entry)> {
        let resolved = self.resolve_root(entry);
        self.proposals.iter().find_map(|layer| {
            [&resolved, entry].into_iter().find_map(|candidate| {
                layer
                    .get_mapping(candidate)
                    .filter(|mapping| mapping.target_name().is_some())
                    .map(|mapping| (mapping.clone(), candidate.clone()))
            })
        })
    }

    fn is_renamable_parameter(&self, entry: &Entry) -> bool {
        match (entry, self.index) {
            (Entry::LocalVariable(local), Some(index)) => {
                index.entries().validate_parameter_index(local)
            }
            _ => true,
        }
    }

    fn lookup(&self, entry: &Entry) -> (EntryMapping, Entry) {
        if !self.is_renamable_parameter(entry) {
            return (EntryMapping::DEFAULT, entry.clone());
        }

        let main = self.lookup_main(entry);
        if let Some((mapping, bound)) = &main {
            if mapping.target_name().is_some() {
                return (mapping.clone(), bound.clone());
            }
        }

        // Documentation without a name stays, a name found further down is added to it.
        let named = self
            .lookup_bridge(entry)
            .filter(|(mapping, _)| mapping.target_name().is_some())
            .or_else(|| self.lookup_proposals(entry));
        match (main, named) {
            (Some((documented, bound)), Some((named, _))) => {
                (EntryMapping::merge(&documented, &named), bound)
            }
            (Some(found), None) | (None, Some(found)) => found,
            (None, None) => (EntryMapping::DEFAULT, entry.clone()),
        }
    }
}

impl Translator for MappingTranslator<'_> {
    fn extended_translate(&self, entry: &Entry) -> TranslateResult {
        let (mapping, bound) = self.lookup(entry);
        let value = rebuild(self, entry, mapping.target_name());
        TranslateResult {
            value,
            mapping,
            bound,
        }
    }
}
