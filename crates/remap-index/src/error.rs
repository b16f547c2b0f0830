use remap_entry::ClassEntry;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Internal invariant violated; the index under construction must be discarded.
    #[error("index is inconsistent: {reason}")]
    Inconsistent { reason: String },

    /// A single class contributed contradictory facts. Nothing from it was recorded.
    #[error("malformed class {class}: {reason}")]
    MalformedClass { class: ClassEntry, reason: String },

    #[error("indexing was cancelled")]
    Cancelled,
}

impl IndexError {
    pub(crate) fn malformed(class: &ClassEntry, reason: impl Into<String>) -> Self {
        IndexError::MalformedClass {
            class: class.clone(),
            reason: reason.into(),
        }
    }
}
