//! Value types identifying JVM symbols.
//!
//! Entries are plain structural values: two entries with equal fields are interchangeable.
//! Declarations (`*DefEntry`) carry the access flags and supertypes observed while scanning.

#![forbid(unsafe_code)]

mod access;
mod def;
mod descriptor;
mod entry;
mod error;
mod reference;

pub use access::*;
pub use def::{ClassDefEntry, DefEntryRef, FieldDefEntry, MethodDefEntry, RECORD_CLASS};
pub use descriptor::{BaseType, MethodDescriptor, ReturnType, TypeDescriptor};
pub use entry::{
    ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry, CONSTRUCTOR_NAME,
    OBJECT_CLASS, STATIC_INITIALIZER_NAME,
};
pub use error::{Error, Result};
pub use reference::{EnclosingMethodData, EntryReference, Lambda, LambdaTarget, ReferenceTargetType};
