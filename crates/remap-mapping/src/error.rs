use remap_entry::Entry;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The fields of a mapping contradict each other.
    #[error("invalid mapping: {reason}")]
    InvalidMapping { reason: &'static str },

    #[error("`{name}` is not a valid name for {entry}: {reason}")]
    InvalidName {
        entry: Entry,
        name: String,
        reason: &'static str,
    },

    #[error("`{name}` is already used by {existing}")]
    NameClash { name: String, existing: Entry },

    #[error("{entry} is not declared in the index")]
    UnknownEntry { entry: Entry },

    #[error(transparent)]
    Conflict(#[from] CompositionConflict),
}

/// Two source paths that map onto the same target path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{first} and {second} both map to {target}")]
pub struct CompositionConflict {
    pub target: Entry,
    pub first: Entry,
    pub second: Entry,
}
