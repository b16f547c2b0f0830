use std::any::Any;

use indexmap::{IndexMap, IndexSet};
use remap_entry::{
    AccessFlags, ClassDefEntry, ClassEntry, DefEntryRef, Entry, FieldDefEntry, FieldEntry,
    LocalVariableEntry, MethodDefEntry, MethodEntry,
};

use crate::indexer::JarIndexer;
use crate::view::View;

/// Registry of every declaration seen in one scanned scope, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct EntryIndex {
    classes: IndexMap<ClassEntry, ClassDefEntry>,
    fields: IndexMap<FieldEntry, FieldDefEntry>,
    methods: IndexMap<MethodEntry, MethodDefEntry>,
    parameters: IndexSet<LocalVariableEntry>,
}

impl EntryIndex {
    pub fn view(&self) -> View<'_, EntryIndex> {
        View::Single(self)
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.fields.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }
}

impl JarIndexer for EntryIndex {
    fn index_class(&mut self, class: &ClassDefEntry) {
        self.classes.insert(class.entry.clone(), class.clone());
    }

    fn index_field(&mut self, field: &FieldDefEntry) {
        self.fields.insert(field.entry.clone(), field.clone());
    }

    fn index_method(&mut self, method: &MethodDefEntry) {
        self.methods.insert(method.entry.clone(), method.clone());
        self.parameters
            .extend(method.entry.parameters(method.access.is_static()));
    }

    fn name(&self) -> &'static str {
        "entries"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type EntryView<'a> = View<'a, EntryIndex>;

impl<'a> View<'a, EntryIndex> {
    pub fn has_class(self, class: &ClassEntry) -> bool {
        self.any(|index| index.classes.contains_key(class))
    }

    pub fn has_field(self, field: &FieldEntry) -> bool {
        self.any(|index| index.fields.contains_key(field))
    }

    pub fn has_method(self, method: &MethodEntry) -> bool {
        self.any(|index| index.methods.contains_key(method))
    }

    pub fn has_parameter(self, parameter: &LocalVariableEntry) -> bool {
        self.any(|index| index.parameters.contains(parameter))
    }

    /// Declaration membership. Local variables count only when they are parameters whose slot
    /// is not the implicit `this` of an instance method.
    pub fn has_entry(self, entry: &Entry) -> bool {
        match entry {
            Entry::Class(class) => self.has_class(class),
            Entry::Field(field) => self.has_field(field),
            Entry::Method(method) => self.has_method(method),
            Entry::LocalVariable(local) => {
                self.has_parameter(local) && self.validate_parameter_index(local)
            }
        }
    }

    pub fn validate_parameter_index(self, parameter: &LocalVariableEntry) -> bool {
        let is_static = self
            .method_access(&parameter.method)
            .is_some_and(AccessFlags::is_static);
        parameter.index >= MethodEntry::first_parameter_index(is_static)
    }

    pub fn class_access(self, class: &ClassEntry) -> Option<AccessFlags> {
        self.class_def(class).map(|def| def.access)
    }

    pub fn field_access(self, field: &FieldEntry) -> Option<AccessFlags> {
        self.field_def(field).map(|def| def.access)
    }

    pub fn method_access(self, method: &MethodEntry) -> Option<AccessFlags> {
        self.method_def(method).map(|def| def.access)
    }

    /// Parameters inherit the access flags of their method.
    pub fn parameter_access(self, parameter: &LocalVariableEntry) -> Option<AccessFlags> {
        self.first(|index| {
            index
                .parameters
                .contains(parameter)
                .then(|| index.methods.get(&parameter.method))
                .flatten()
                .map(|def| def.access)
        })
    }

    pub fn entry_access(self, entry: &Entry) -> Option<AccessFlags> {
        match entry {
            Entry::Class(class) => self.class_access(class),
            Entry::Field(field) => self.field_access(field),
            Entry::Method(method) => self.method_access(method),
            Entry::LocalVariable(local) => self.parameter_access(local),
        }
    }

    pub fn class_def(self, class: &ClassEntry) -> Option<&'a ClassDefEntry> {
        self.first(|index| index.classes.get(class))
    }

    pub fn field_def(self, field: &FieldEntry) -> Option<&'a FieldDefEntry> {
        self.first(|index| index.fields.get(field))
    }

    pub fn method_def(self, method: &MethodEntry) -> Option<&'a MethodDefEntry> {
        self.first(|index| index.methods.get(method))
    }

    pub fn definition(self, entry: &Entry) -> Option<DefEntryRef<'a>> {
        match entry {
            Entry::Class(class) => self.class_def(class).map(DefEntryRef::Class),
            Entry::Field(field) => self.field_def(field).map(DefEntryRef::Field),
            Entry::Method(method) => self.method_def(method).map(DefEntryRef::Method),
            Entry::LocalVariable(_) => None,
        }
    }

    pub fn classes(self) -> impl Iterator<Item = &'a ClassEntry> + 'a {
        self.layers().flat_map(|index| index.classes.keys())
    }

    pub fn fields(self) -> impl Iterator<Item = &'a FieldEntry> + 'a {
        self.layers().flat_map(|index| index.fields.keys())
    }

    pub fn methods(self) -> impl Iterator<Item = &'a MethodEntry> + 'a {
        self.layers().flat_map(|index| index.methods.keys())
    }

    pub fn parameters(self) -> impl Iterator<Item = &'a LocalVariableEntry> + 'a {
        self.layers().flat_map(|index| index.parameters.iter())
    }

    pub fn method_defs(self) -> impl Iterator<Item = &'a MethodDefEntry> + 'a {
        self.layers().flat_map(|index| index.methods.values())
    }
}
