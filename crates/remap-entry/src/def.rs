use serde::{Deserialize, Serialize};

use crate::access::AccessFlags;
use crate::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};

pub const RECORD_CLASS: &str = "java/lang/Record";

/// A class declaration observed in scanned code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassDefEntry {
    pub entry: ClassEntry,
    pub access: AccessFlags,
    pub super_class: Option<ClassEntry>,
    pub interfaces: Vec<ClassEntry>,
    pub signature: Option<String>,
}

impl ClassDefEntry {
    pub fn new(
        entry: ClassEntry,
        access: AccessFlags,
        super_class: Option<ClassEntry>,
        interfaces: Vec<ClassEntry>,
    ) -> Self {
        Self {
            entry,
            access,
            super_class,
            interfaces,
            signature: None,
        }
    }

    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn is_record(&self) -> bool {
        self.super_class
            .as_ref()
            .is_some_and(|super_class| super_class.full_name() == RECORD_CLASS)
    }

    pub fn is_enum(&self) -> bool {
        self.access.is_enum()
    }

    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    /// Superclass followed by interfaces, in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.super_class.iter().chain(self.interfaces.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDefEntry {
    pub entry: FieldEntry,
    pub access: AccessFlags,
    pub signature: Option<String>,
}

impl FieldDefEntry {
    pub fn new(entry: FieldEntry, access: AccessFlags) -> Self {
        Self {
            entry,
            access,
            signature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDefEntry {
    pub entry: MethodEntry,
    pub access: AccessFlags,
    pub signature: Option<String>,
}

impl MethodDefEntry {
    pub fn new(entry: MethodEntry, access: AccessFlags) -> Self {
        Self {
            entry,
            access,
            signature: None,
        }
    }
}

/// A declaration of any kind, borrowed from an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefEntryRef<'a> {
    Class(&'a ClassDefEntry),
    Field(&'a FieldDefEntry),
    Method(&'a MethodDefEntry),
}

impl DefEntryRef<'_> {
    pub fn access(&self) -> AccessFlags {
        match self {
            DefEntryRef::Class(def) => def.access,
            DefEntryRef::Field(def) => def.access,
            DefEntryRef::Method(def) => def.access,
        }
    }

    pub fn entry(&self) -> Entry {
        match self {
            DefEntryRef::Class(def) => Entry::Class(def.entry.clone()),
            DefEntryRef::Field(def) => Entry::Field(def.entry.clone()),
            DefEntryRef::Method(def) => Entry::Method(def.entry.clone()),
        }
    }
}
