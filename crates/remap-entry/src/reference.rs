use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::MethodDescriptor;
use crate::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};

/// What the receiver of a reference was known to be at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ReferenceTargetType {
    #[default]
    None,
    /// The receiver is a freshly allocated, not yet constructed object.
    Uninitialized,
    Class(ClassEntry),
}

/// A use of `entry` from inside `context` (usually the calling method).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryReference<E, C = MethodEntry> {
    pub entry: E,
    pub context: C,
    pub target: ReferenceTargetType,
}

impl<E, C> EntryReference<E, C> {
    pub fn new(entry: E, context: C, target: ReferenceTargetType) -> Self {
        Self {
            entry,
            context,
            target,
        }
    }

    /// Same reference pointing at a different entry.
    pub fn with_entry<T>(&self, entry: T) -> EntryReference<T, C>
    where
        C: Clone,
    {
        EntryReference {
            entry,
            context: self.context.clone(),
            target: self.target.clone(),
        }
    }
}

impl<E: fmt::Display, C: fmt::Display> fmt::Display for EntryReference<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} called from {}", self.entry, self.context)
    }
}

/// The member a lambda or method reference is implemented by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LambdaTarget {
    Method(MethodEntry),
    Field(FieldEntry),
}

impl LambdaTarget {
    pub fn entry(&self) -> Entry {
        match self {
            LambdaTarget::Method(method) => Entry::Method(method.clone()),
            LambdaTarget::Field(field) => Entry::Field(field.clone()),
        }
    }
}

/// An `invokedynamic` lambda metafactory call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lambda {
    pub invoked_name: String,
    pub invoked_type: MethodDescriptor,
    pub sam_method_type: MethodDescriptor,
    pub implementation: LambdaTarget,
    pub instantiated_method_type: MethodDescriptor,
}

impl Lambda {
    /// The functional interface being instantiated.
    pub fn interface(&self) -> Option<ClassEntry> {
        self.invoked_type.return_type.as_type()?.class_entry()
    }

    /// The single abstract method the lambda implements.
    pub fn sam_method(&self) -> Option<MethodEntry> {
        Some(MethodEntry::new(
            self.interface()?,
            self.invoked_name.clone(),
            self.sam_method_type.clone(),
        ))
    }
}

/// Contents of an `EnclosingMethod` class attribute.
///
/// Classes declared in initializers carry no method name or descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnclosingMethodData {
    pub owner: ClassEntry,
    pub name: Option<String>,
    pub descriptor: Option<MethodDescriptor>,
}

impl EnclosingMethodData {
    pub fn new(
        owner: ClassEntry,
        name: Option<String>,
        descriptor: Option<MethodDescriptor>,
    ) -> Self {
        Self {
            owner,
            name,
            descriptor,
        }
    }

    pub fn method(&self) -> Option<MethodEntry> {
        match (&self.name, &self.descriptor) {
            (Some(name), Some(desc)) => Some(MethodEntry::new(
                self.owner.clone(),
                name.clone(),
                desc.clone(),
            )),
            _ => None,
        }
    }
}
