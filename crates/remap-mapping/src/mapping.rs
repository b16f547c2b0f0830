use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// Where the name of a mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// No name; the obfuscated name is shown.
    #[default]
    Obfuscated,
    /// Proposed once from index facts when the jar was opened.
    JarProposed,
    /// Proposed in reaction to another edit.
    DynamicProposed,
    /// Chosen by a user.
    Deobfuscated,
    /// Injected for debugging output.
    Debug,
}

impl TokenType {
    pub fn is_proposed(self) -> bool {
        matches!(self, TokenType::JarProposed | TokenType::DynamicProposed)
    }
}

/// The name and documentation attached to one entry.
///
/// Obfuscated mappings carry no name, every other kind does. Proposed mappings always record
/// the id of the proposer that produced them and no other mapping does. Names are stored with
/// surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawEntryMapping", into = "RawEntryMapping")]
pub struct EntryMapping {
    target_name: Option<String>,
    javadoc: Option<String>,
    token_type: TokenType,
    source_id: Option<String>,
}

impl EntryMapping {
    /// The mapping of an entry nobody named or documented.
    pub const DEFAULT: EntryMapping = EntryMapping {
        target_name: None,
        javadoc: None,
        token_type: TokenType::Obfuscated,
        source_id: None,
    };

    pub fn new(
        target_name: Option<String>,
        javadoc: Option<String>,
        token_type: TokenType,
        source_id: Option<String>,
    ) -> Result<Self, MappingError> {
        let target_name = trim(target_name);
        let invalid = |reason| Err(MappingError::InvalidMapping { reason });

        match (&target_name, token_type) {
            (Some(_), TokenType::Obfuscated) => {
                return invalid("obfuscated mappings cannot have a name")
            }
            (None, token) if token != TokenType::Obfuscated => {
                return invalid("only obfuscated mappings can omit the name")
            }
            _ => {}
        }
        match (&source_id, token_type.is_proposed()) {
            (Some(_), false) => return invalid("only proposed mappings have a source id"),
            (None, true) => return invalid("proposed mappings need a source id"),
            _ => {}
        }

        Ok(Self {
            target_name,
            javadoc,
            token_type,
            source_id,
        })
    }

    /// A user chosen name. A blank name gives [`EntryMapping::DEFAULT`].
    pub fn named(name: impl Into<String>) -> Self {
        Self::DEFAULT.renamed(Some(name.into()))
    }

    pub fn proposed(
        name: impl Into<String>,
        token_type: TokenType,
        source_id: impl Into<String>,
    ) -> Result<Self, MappingError> {
        if !token_type.is_proposed() {
            return Err(MappingError::InvalidMapping {
                reason: "proposals must use a proposed token type",
            });
        }
        Self::new(Some(name.into()), None, token_type, Some(source_id.into()))
    }

    pub fn documented(javadoc: impl Into<String>) -> Self {
        Self::DEFAULT.with_javadoc(Some(javadoc.into()))
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    pub fn javadoc(&self) -> Option<&str> {
        self.javadoc.as_deref()
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Changes the name and keeps everything else valid: proposals stay proposals, a missing
    /// name makes the mapping obfuscated and naming an obfuscated mapping makes it
    /// deobfuscated.
    #[must_use]
    pub fn renamed(&self, name: Option<String>) -> Self {
        let target_name = trim(name);
        let (token_type, source_id) = match (&target_name, self.token_type) {
            (None, _) => (TokenType::Obfuscated, None),
            (Some(_), TokenType::Obfuscated) => (TokenType::Deobfuscated, None),
            (Some(_), token) => (token, self.source_id.clone()),
        };
        Self {
            target_name,
            javadoc: self.javadoc.clone(),
            token_type,
            source_id,
        }
    }

    /// Replaces name, token type and source id together.
    pub fn with_name(
        &self,
        name: Option<String>,
        token_type: TokenType,
        source_id: Option<String>,
    ) -> Result<Self, MappingError> {
        Self::new(name, self.javadoc.clone(), token_type, source_id)
    }

    #[must_use]
    pub fn with_javadoc(&self, javadoc: Option<String>) -> Self {
        Self {
            javadoc,
            ..self.clone()
        }
    }

    /// Fills whatever `left` is missing from `right`. A name taken from `right` brings its
    /// token type and source id along.
    pub fn merge(left: &EntryMapping, right: &EntryMapping) -> EntryMapping {
        let mut merged = left.clone();
        if left.target_name.is_none() && right.target_name.is_some() {
            merged.target_name = right.target_name.clone();
            merged.token_type = right.token_type;
            merged.source_id = right.source_id.clone();
        }
        if left.javadoc.is_none() {
            merged.javadoc = right.javadoc.clone();
        }
        merged
    }
}

impl fmt::Display for EntryMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target_name {
            Some(name) => write!(f, "{name} ({:?})", self.token_type),
            None => f.write_str("<obfuscated>"),
        }
    }
}

fn trim(name: Option<String>) -> Option<String> {
    name.map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
}

/// Unchecked wire form; converted through [`EntryMapping::new`] when deserializing.
#[derive(Serialize, Deserialize)]
struct RawEntryMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    javadoc: Option<String>,
    #[serde(default)]
    token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,
}

impl TryFrom<RawEntryMapping> for EntryMapping {
    type Error = MappingError;

    fn try_from(raw: RawEntryMapping) -> Result<Self, Self::Error> {
        EntryMapping::new(raw.target_name, raw.javadoc, raw.token_type, raw.source_id)
    }
}

impl From<EntryMapping> for RawEntryMapping {
    fn from(mapping: EntryMapping) -> Self {
        RawEntryMapping {
            target_name: mapping.target_name,
            javadoc: mapping.javadoc,
            token_type: mapping.token_type,
            source_id: mapping.source_id,
        }
    }
}
