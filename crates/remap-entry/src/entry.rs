use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::error::{Error, Result};

pub const OBJECT_CLASS: &str = "java/lang/Object";
pub const CONSTRUCTOR_NAME: &str = "<init>";
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// A class identified by its internal binary name (`a/b/Outer$Inner`).
///
/// Inner classes nest under their outer class: `Outer$Inner` has `Outer` as its parent in
/// entry paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassEntry {
    full_name: String,
}

impl ClassEntry {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }

    /// Like [`ClassEntry::new`], but rejects names that are not in internal JVM format.
    pub fn parse(full_name: &str) -> Result<Self> {
        let valid = !full_name.is_empty()
            && !full_name.contains(['.', ';', '[', '(', ')'])
            && !full_name.starts_with('/')
            && !full_name.ends_with('/')
            && !full_name.contains("//");
        if !valid {
            return Err(Error::InvalidClassName(full_name.to_string()));
        }
        Ok(Self::new(full_name))
    }

    pub fn object() -> Self {
        Self::new(OBJECT_CLASS)
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    fn inner_split(&self) -> Option<usize> {
        let pos = self.full_name.rfind('$')?;
        let bytes = self.full_name.as_bytes();
        if pos == 0 || pos + 1 == bytes.len() || bytes[pos - 1] == b'/' {
            return None;
        }
        Some(pos)
    }

    /// The enclosing class for `Outer$Inner` names.
    pub fn outer_class(&self) -> Option<ClassEntry> {
        self.inner_split()
            .map(|pos| ClassEntry::new(&self.full_name[..pos]))
    }

    pub fn outermost_class(&self) -> ClassEntry {
        let mut current = self.clone();
        while let Some(outer) = current.outer_class() {
            current = outer;
        }
        current
    }

    pub fn is_inner(&self) -> bool {
        self.inner_split().is_some()
    }

    /// The mappable name of this class: the full name for top-level classes and the segment
    /// after the last `$` for inner classes.
    pub fn name(&self) -> &str {
        match self.inner_split() {
            Some(pos) => &self.full_name[pos + 1..],
            None => &self.full_name,
        }
    }

    /// The name without its package (`Outer$Inner` for `a/b/Outer$Inner`).
    pub fn simple_name(&self) -> &str {
        match self.full_name.rfind('/') {
            Some(pos) => &self.full_name[pos + 1..],
            None => &self.full_name,
        }
    }

    pub fn package_name(&self) -> Option<&str> {
        self.full_name.rfind('/').map(|pos| &self.full_name[..pos])
    }

    pub fn is_jre(&self) -> bool {
        self.full_name.starts_with("java/") || self.full_name.starts_with("javax/")
    }

    pub fn is_object(&self) -> bool {
        self.full_name == OBJECT_CLASS
    }

    pub fn with_name(&self, name: &str) -> ClassEntry {
        match self.inner_split() {
            Some(pos) => ClassEntry::new(format!("{}${name}", &self.full_name[..pos])),
            None => ClassEntry::new(name),
        }
    }

    /// Re-parents an inner class under `outer`. Top-level classes are returned unchanged.
    pub fn with_outer(&self, outer: &ClassEntry) -> ClassEntry {
        if self.is_inner() {
            ClassEntry::new(format!("{}${}", outer.full_name, self.name()))
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

impl From<&str> for ClassEntry {
    fn from(value: &str) -> Self {
        ClassEntry::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldEntry {
    pub owner: ClassEntry,
    pub name: String,
    pub desc: TypeDescriptor,
}

impl FieldEntry {
    pub fn new(owner: ClassEntry, name: impl Into<String>, desc: TypeDescriptor) -> Self {
        Self {
            owner,
            name: name.into(),
            desc,
        }
    }

    pub fn parse(owner: &str, name: &str, desc: &str) -> Result<Self> {
        Ok(Self::new(
            ClassEntry::parse(owner)?,
            name,
            TypeDescriptor::parse(desc)?,
        ))
    }

    pub fn with_name(&self, name: &str) -> FieldEntry {
        FieldEntry::new(self.owner.clone(), name, self.desc.clone())
    }

    pub fn with_owner(&self, owner: ClassEntry) -> FieldEntry {
        FieldEntry::new(owner, self.name.clone(), self.desc.clone())
    }

    pub fn with_desc(&self, desc: TypeDescriptor) -> FieldEntry {
        FieldEntry::new(self.owner.clone(), self.name.clone(), desc)
    }
}

impl fmt::Display for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.name, self.desc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodEntry {
    pub owner: ClassEntry,
    pub name: String,
    pub desc: MethodDescriptor,
}

impl MethodEntry {
    pub fn new(owner: ClassEntry, name: impl Into<String>, desc: MethodDescriptor) -> Self {
        Self {
            owner,
            name: name.into(),
            desc,
        }
    }

    pub fn parse(owner: &str, name: &str, desc: &str) -> Result<Self> {
        Ok(Self::new(
            ClassEntry::parse(owner)?,
            name,
            MethodDescriptor::parse(desc)?,
        ))
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME || self.name == STATIC_INITIALIZER_NAME
    }

    pub fn with_name(&self, name: &str) -> MethodEntry {
        MethodEntry::new(self.owner.clone(), name, self.desc.clone())
    }

    pub fn with_owner(&self, owner: ClassEntry) -> MethodEntry {
        MethodEntry::new(owner, self.name.clone(), self.desc.clone())
    }

    pub fn with_desc(&self, desc: MethodDescriptor) -> MethodEntry {
        MethodEntry::new(self.owner.clone(), self.name.clone(), desc)
    }

    /// First local variable slot used by arguments.
    pub fn first_parameter_index(is_static: bool) -> u32 {
        if is_static {
            0
        } else {
            1
        }
    }

    /// Parameter slots in declaration order. Wide arguments (`J`, `D`) take two slots.
    pub fn parameters(&self, is_static: bool) -> Vec<LocalVariableEntry> {
        let mut index = Self::first_parameter_index(is_static);
        let mut out = Vec::with_capacity(self.desc.params.len());
        for param in &self.desc.params {
            out.push(LocalVariableEntry::new(self.clone(), index));
            index += param.size();
        }
        out
    }
}

impl fmt::Display for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.desc)
    }
}

/// A local variable slot of a method. Parameters are local variables whose slot falls in the
/// argument range of their method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalVariableEntry {
    pub method: MethodEntry,
    pub index: u32,
}

impl LocalVariableEntry {
    pub fn new(method: MethodEntry, index: u32) -> Self {
        Self { method, index }
    }

    pub fn with_method(&self, method: MethodEntry) -> LocalVariableEntry {
        LocalVariableEntry::new(method, self.index)
    }

    /// Whether the slot lies within the argument range of the owning method.
    pub fn is_argument(&self, is_static: bool) -> bool {
        let first = MethodEntry::first_parameter_index(is_static);
        self.index >= first && self.index < first + self.method.desc.argument_slots()
    }
}

impl fmt::Display for LocalVariableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.method, self.index)
    }
}

/// Any JVM symbol that can carry a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Entry {
    Class(ClassEntry),
    Field(FieldEntry),
    Method(MethodEntry),
    LocalVariable(LocalVariableEntry),
}

impl Entry {
    /// The entry this one nests under in mapping trees.
    pub fn parent(&self) -> Option<Entry> {
        match self {
            Entry::Class(class) => class.outer_class().map(Entry::Class),
            Entry::Field(field) => Some(Entry::Class(field.owner.clone())),
            Entry::Method(method) => Some(Entry::Class(method.owner.clone())),
            Entry::LocalVariable(local) => Some(Entry::Method(local.method.clone())),
        }
    }

    /// The path from the outermost class down to (and including) this entry.
    pub fn ancestry(&self) -> Vec<Entry> {
        let mut path = vec![self.clone()];
        let mut current = self.parent();
        while let Some(entry) = current {
            current = entry.parent();
            path.push(entry);
        }
        path.reverse();
        path
    }

    /// The obfuscated name of the entry. Local variables have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Entry::Class(class) => Some(class.name()),
            Entry::Field(field) => Some(&field.name),
            Entry::Method(method) => Some(&method.name),
            Entry::LocalVariable(_) => None,
        }
    }

    pub fn with_name(&self, name: &str) -> Entry {
        match self {
            Entry::Class(class) => Entry::Class(class.with_name(name)),
            Entry::Field(field) => Entry::Field(field.with_name(name)),
            Entry::Method(method) => Entry::Method(method.with_name(name)),
            Entry::LocalVariable(local) => Entry::LocalVariable(local.clone()),
        }
    }

    pub fn containing_class(&self) -> &ClassEntry {
        match self {
            Entry::Class(class) => class,
            Entry::Field(field) => &field.owner,
            Entry::Method(method) => &method.owner,
            Entry::LocalVariable(local) => &local.method.owner,
        }
    }

    pub fn as_class(&self) -> Option<&ClassEntry> {
        match self {
            Entry::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldEntry> {
        match self {
            Entry::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodEntry> {
        match self {
            Entry::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_local_variable(&self) -> Option<&LocalVariableEntry> {
        match self {
            Entry::LocalVariable(local) => Some(local),
            _ => None,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Class(class) => class.fmt(f),
            Entry::Field(field) => field.fmt(f),
            Entry::Method(method) => method.fmt(f),
            Entry::LocalVariable(local) => local.fmt(f),
        }
    }
}

impl From<ClassEntry> for Entry {
    fn from(value: ClassEntry) -> Self {
        Entry::Class(value)
    }
}

impl From<FieldEntry> for Entry {
    fn from(value: FieldEntry) -> Self {
        Entry::Field(value)
    }
}

impl From<MethodEntry> for Entry {
    fn from(value: MethodEntry) -> Self {
        Entry::Method(value)
    }
}

impl From<LocalVariableEntry> for Entry {
    fn from(value: LocalVariableEntry) -> Self {
        Entry::LocalVariable(value)
    }
}

macro_rules! impl_try_from_entry {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl TryFrom<Entry> for $ty {
                type Error = Entry;

                fn try_from(value: Entry) -> std::result::Result<Self, Entry> {
                    match value {
                        Entry::$variant(entry) => Ok(entry),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_try_from_entry! {
    Class => ClassEntry,
    Field => FieldEntry,
    Method => MethodEntry,
    LocalVariable => LocalVariableEntry,
}
