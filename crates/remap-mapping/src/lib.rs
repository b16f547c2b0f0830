//! Name mappings for obfuscated JVM classes.
//!
//! Mappings live in an [`EntryTree`] keyed by entry path. On top of it this crate provides:
//!
//! - [`DeltaTrackingTree`]: a tree that reports what changed since the last checkpoint;
//! - [`invert`], [`compose`] and [`chain`] over whole mapping trees;
//! - [`Translator`] implementations that rename entries, owners and descriptors;
//! - [`MappingsChecker`], which finds mappings that no longer match an index;
//! - [`EntryRemapper`], a mapping session combining manual mappings with the names offered
//!   by registered [`NameProposer`]s.
//!
//! ```
//! use remap_entry::{ClassEntry, Entry, MethodEntry};
//! use remap_mapping::{invert, EntryMapping, EntryTree, MappingTranslator, Translator};
//!
//! let class = Entry::Class(ClassEntry::new("a"));
//! let method = Entry::Method(MethodEntry::parse("a", "b", "(La;)V")?);
//!
//! let mut mappings = EntryTree::new();
//! mappings.insert(class, EntryMapping::named("com/example/Widget"));
//! mappings.insert(method.clone(), EntryMapping::named("attach"));
//!
//! let translator = MappingTranslator::new(&mappings);
//! let named = translator.translate(&method);
//! assert_eq!(
//!     named.to_string(),
//!     "com/example/Widget.attach(Lcom/example/Widget;)V"
//! );
//!
//! let inverse = invert(&mappings);
//! assert_eq!(MappingTranslator::new(&inverse).translate(&named), method);
//! # Ok::<(), remap_entry::Error>(())
//! ```

#![forbid(unsafe_code)]

mod checker;
mod delta;
mod error;
mod mapping;
mod merged;
mod operations;
mod proposal;
mod remapper;
mod translate;
mod tree;
mod validate;

pub use checker::{Dropped, MappingsChecker};
pub use delta::{Change, DeltaTrackingTree, MappingDelta};
pub use error::{CompositionConflict, MappingError};
pub use mapping::{EntryMapping, TokenType};
pub use merged::{MappingLookup, MergedTree};
pub use operations::{chain, compose, invert, invert_with, InvertPolicy};
pub use proposal::{DynamicProposal, NameProposer};
pub use remapper::EntryRemapper;
pub use translate::{MappingTranslator, TranslateResult, Translator, VoidTranslator};
pub use tree::{EntryTree, Nodes, TreeNode};
pub use validate::{validate_identifier, validate_name, IdentifierError, MappingValidator};
