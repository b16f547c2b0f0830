use std::any::Any;
use std::collections::BTreeSet;

use remap_entry::{
    ClassDefEntry, ClassEntry, EnclosingMethodData, FieldDefEntry, FieldEntry, Lambda,
    MethodDefEntry, MethodEntry, ReferenceTargetType,
};

use crate::error::IndexError;
use crate::jar_index::IndexView;

/// Receives the facts discovered while scanning classes.
///
/// For every class, `index_class` is called before any of its members. Once all classes have
/// been visited, `process_index` runs exactly once with a read-only view of the built-in
/// indexes.
pub trait JarIndexer: Any + Send + Sync {
    fn index_class(&mut self, _class: &ClassDefEntry) {}

    fn index_field(&mut self, _field: &FieldDefEntry) {}

    fn index_method(&mut self, _method: &MethodDefEntry) {}

    fn index_class_reference(
        &mut self,
        _caller: &MethodDefEntry,
        _class: &ClassEntry,
        _target: &ReferenceTargetType,
    ) {
    }

    fn index_method_reference(
        &mut self,
        _caller: &MethodDefEntry,
        _method: &MethodEntry,
        _target: &ReferenceTargetType,
    ) {
    }

    fn index_field_reference(
        &mut self,
        _caller: &MethodDefEntry,
        _field: &FieldEntry,
        _target: &ReferenceTargetType,
    ) {
    }

    fn index_lambda(
        &mut self,
        _caller: &MethodDefEntry,
        _lambda: &Lambda,
        _target: &ReferenceTargetType,
    ) {
    }

    fn index_enclosing_method(&mut self, _class: &ClassDefEntry, _data: &EnclosingMethodData) {}

    fn process_index(&mut self, _index: IndexView<'_>) {}

    /// Short name used in progress messages and logs.
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// A reference made from the code of one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceFact {
    Class {
        caller: MethodDefEntry,
        class: ClassEntry,
        target: ReferenceTargetType,
    },
    Method {
        caller: MethodDefEntry,
        method: MethodEntry,
        target: ReferenceTargetType,
    },
    Field {
        caller: MethodDefEntry,
        field: FieldEntry,
        target: ReferenceTargetType,
    },
    Lambda {
        caller: MethodDefEntry,
        lambda: Lambda,
        target: ReferenceTargetType,
    },
}

impl ReferenceFact {
    pub fn caller(&self) -> &MethodDefEntry {
        match self {
            ReferenceFact::Class { caller, .. }
            | ReferenceFact::Method { caller, .. }
            | ReferenceFact::Field { caller, .. }
            | ReferenceFact::Lambda { caller, .. } => caller,
        }
    }

    pub(crate) fn dispatch(&self, indexer: &mut dyn JarIndexer) {
        match self {
            ReferenceFact::Class {
                caller,
                class,
                target,
            } => indexer.index_class_reference(caller, class, target),
            ReferenceFact::Method {
                caller,
                method,
                target,
            } => indexer.index_method_reference(caller, method, target),
            ReferenceFact::Field {
                caller,
                field,
                target,
            } => indexer.index_field_reference(caller, field, target),
            ReferenceFact::Lambda {
                caller,
                lambda,
                target,
            } => indexer.index_lambda(caller, lambda, target),
        }
    }
}

/// Everything a bytecode front end learned from one class file.
///
/// Facts are validated as a unit before any of them reach the shared indexes, so a malformed
/// class never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFacts {
    pub class: ClassDefEntry,
    pub fields: Vec<FieldDefEntry>,
    pub methods: Vec<MethodDefEntry>,
    pub references: Vec<ReferenceFact>,
    pub enclosing_method: Option<EnclosingMethodData>,
}

impl ClassFacts {
    pub fn new(class: ClassDefEntry) -> Self {
        Self {
            class,
            fields: Vec::new(),
            methods: Vec::new(),
            references: Vec::new(),
            enclosing_method: None,
        }
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        let class = &self.class.entry;

        if self.class.interfaces.iter().any(|interface| interface == class) {
            return Err(IndexError::malformed(class, "class cannot be its own interface"));
        }
        if self.class.super_class.as_ref() == Some(class) {
            return Err(IndexError::malformed(class, "class cannot be its own superclass"));
        }

        let mut fields = BTreeSet::new();
        for field in &self.fields {
            if &field.entry.owner != class {
                return Err(IndexError::malformed(
                    class,
                    format!("field {} is declared by another class", field.entry),
                ));
            }
            if !fields.insert(&field.entry) {
                return Err(IndexError::malformed(
                    class,
                    format!("duplicate field {}:{}", field.entry.name, field.entry.desc),
                ));
            }
        }

        let mut methods = BTreeSet::new();
        for method in &self.methods {
            if &method.entry.owner != class {
                return Err(IndexError::malformed(
                    class,
                    format!("method {} is declared by another class", method.entry),
                ));
            }
            if !methods.insert(&method.entry) {
                return Err(IndexError::malformed(
                    class,
                    format!("duplicate method {}{}", method.entry.name, method.entry.desc),
                ));
            }
        }

        for reference in &self.references {
            let caller = &reference.caller().entry;
            if &caller.owner != class {
                return Err(IndexError::malformed(
                    class,
                    format!("reference made from foreign method {caller}"),
                ));
            }
        }

        Ok(())
    }
}
