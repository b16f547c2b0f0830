use std::collections::BTreeSet;

use remap_entry::{AccessFlags, ClassEntry, Entry};
use remap_index::{EntryResolver, IndexView};

use crate::error::MappingError;
use crate::translate::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierError {
    Empty,
    InvalidStartChar,
    InvalidChar,
    Keyword,
    Constructor,
}

impl IdentifierError {
    pub fn reason(self) -> &'static str {
        match self {
            IdentifierError::Empty => "name is empty (after trimming whitespace)",
            IdentifierError::InvalidStartChar => "must start with a letter, '_' or '$'",
            IdentifierError::InvalidChar => "must contain only letters, digits, '_' or '$'",
            IdentifierError::Keyword => "is a reserved Java keyword",
            IdentifierError::Constructor => "constructors and initializers cannot be renamed",
        }
    }
}

/// Checks a single Java identifier.
///
/// Unlike source-level identifiers, `$` is allowed anywhere and contextual keywords such as
/// `record` or `var` are accepted because class files use them freely.
pub fn validate_identifier(name: &str) -> Result<(), IdentifierError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(IdentifierError::Empty);
    };
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return Err(IdentifierError::InvalidStartChar);
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return Err(IdentifierError::InvalidChar);
    }
    if is_reserved_word(name) {
        return Err(IdentifierError::Keyword);
    }
    Ok(())
}

/// Validates `name` as the new name of `entry` and returns it trimmed.
///
/// Top-level classes are named with their package (`com/example/Foo`), so every
/// `/`-separated segment must be an identifier. Inner classes are named by their own segment
/// only.
pub fn validate_name(entry: &Entry, name: &str) -> Result<String, MappingError> {
    let trimmed = name.trim();
    let invalid = |error: IdentifierError| MappingError::InvalidName {
        entry: entry.clone(),
        name: name.to_owned(),
        reason: error.reason(),
    };

    match entry {
        Entry::Class(class) if !class.is_inner() => {
            if trimmed.is_empty() {
                return Err(invalid(IdentifierError::Empty));
            }
            for segment in trimmed.split('/') {
                validate_identifier(segment).map_err(invalid)?;
            }
        }
        Entry::Method(method) if method.is_constructor() => {
            return Err(invalid(IdentifierError::Constructor));
        }
        _ => validate_identifier(trimmed).map_err(invalid)?,
    }
    Ok(trimmed.to_owned())
}

fn is_reserved_word(ident: &str) -> bool {
    matches!(
        ident,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "strictfp"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "transient"
            | "try"
            | "void"
            | "volatile"
            | "while"
            | "true"
            | "false"
            | "null"
            | "_"
    )
}

/// Checks renames against the declarations they would clash with.
pub struct MappingValidator<'a, T: ?Sized> {
    index: IndexView<'a>,
    deobfuscator: &'a T,
}

impl<'a, T: Translator + ?Sized> MappingValidator<'a, T> {
    pub fn new(index: IndexView<'a>, deobfuscator: &'a T) -> Self {
        Self {
            index,
            deobfuscator,
        }
    }

    /// Validates renaming `entry` and every entry that must share its name to `name`.
    pub fn validate_rename(&self, entry: &Entry, name: &str) -> Result<String, MappingError> {
        let equivalent = self.index.resolver().resolve_equivalent_entries(entry);
        let mut validated = validate_name(entry, name)?;
        for entry in &equivalent {
            validated = validate_name(entry, name)?;
            self.validate_unique(entry, &validated, &equivalent)?;
        }
        Ok(validated)
    }

    fn validate_unique(
        &self,
        entry: &Entry,
        name: &str,
        equivalent: &BTreeSet<Entry>,
    ) -> Result<(), MappingError> {
        let renamed = self.renamed(entry, name);
        for sibling in self.siblings(entry) {
            if equivalent.contains(&sibling) || &sibling == entry {
                continue;
            }
            if self.clashes(&renamed, name, &sibling) {
                return Err(MappingError::NameClash {
                    name: name.to_owned(),
                    existing: sibling,
                });
            }
        }
        Ok(())
    }

    /// `entry` translated and then given `name`.
    fn renamed(&self, entry: &Entry, name: &str) -> Entry {
        let translated = self.deobfuscator.translate(entry);
        match &translated {
            Entry::Class(class) if !class.is_inner() => Entry::Class(ClassEntry::new(name)),
            _ => translated.with_name(name),
        }
    }

    fn clashes(&self, renamed: &Entry, name: &str, sibling: &Entry) -> bool {
        let result = self.deobfuscator.extended_translate(sibling);
        match (renamed, &result.value) {
            (Entry::Class(a), Entry::Class(b)) => a == b,
            (Entry::Field(a), Entry::Field(b)) => a.name == b.name,
            (Entry::Method(a), Entry::Method(b)) => a.name == b.name && a.desc == b.desc,
            (Entry::LocalVariable(_), Entry::LocalVariable(_)) => {
                result.mapping.target_name() == Some(name)
            }
            _ => false,
        }
    }

    /// Declarations a renamed `entry` could collide with.
    fn siblings(&self, entry: &Entry) -> Vec<Entry> {
        let entries = self.index.entries();
        match entry {
            Entry::Class(class) => match class.outer_class() {
                Some(outer) => self
                    .index
                    .children_of(&outer)
                    .iter()
                    .filter(|child| matches!(child, Entry::Class(_)))
                    .cloned()
                    .collect(),
                None => entries
                    .classes()
                    .filter(|other| !other.is_inner())
                    .cloned()
                    .map(Entry::Class)
                    .collect(),
            },
            Entry::Field(_) | Entry::Method(_) => {
                let owner = entry.containing_class();
                let inherited = self
                    .index
                    .inheritance()
                    .ancestors(owner)
                    .into_iter()
                    .flat_map(|ancestor| self.index.children_of(&ancestor).to_vec())
                    .filter(|member| {
                        entries
                            .entry_access(member)
                            .is_some_and(|access| !access.is_private())
                    });
                self.index
                    .children_of(owner)
                    .iter()
                    .cloned()
                    .chain(inherited)
                    .filter(|member| !matches!(member, Entry::Class(_)))
                    .collect()
            }
            Entry::LocalVariable(local) => {
                let is_static = entries
                    .method_access(&local.method)
                    .is_some_and(AccessFlags::is_static);
                local
                    .method
                    .parameters(is_static)
                    .into_iter()
                    .map(Entry::LocalVariable)
                    .collect()
            }
        }
    }
}
