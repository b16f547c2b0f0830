//! Cross-reference indexes over a scanned set of JVM classes.
//!
//! A bytecode front end reports what it finds in each class as [`ClassFacts`]; a
//! [`JarIndexBuilder`] turns them into a frozen [`JarIndex`] holding:
//!
//! - [`EntryIndex`]: every declared class, field, method and parameter with its access flags;
//! - [`InheritanceIndex`]: superclass/interface edges and the [`Relation`] queries built on
//!   them;
//! - [`ReferenceIndex`]: which methods use which methods, fields and classes;
//! - [`BridgeMethodIndex`]: compiler generated bridge methods and the specialized methods they
//!   forward to;
//! - [`EnclosingMethodIndex`]: the declaring method of local and anonymous classes.
//!
//! A [`CombinedJarIndex`] layers the index of the main artifact over the index of its
//! libraries. All queries go through [`View`], which answers from the main index first.
//!
//! ```
//! use remap_config::IndexConfig;
//! use remap_entry::{AccessFlags, ClassDefEntry, ClassEntry};
//! use remap_index::{ClassFacts, IndexScope, JarIndex, NoopProgress};
//!
//! let class = ClassDefEntry::new(
//!     ClassEntry::new("a/Main"),
//!     AccessFlags::default(),
//!     Some(ClassEntry::object()),
//!     vec![],
//! );
//! let index = JarIndex::build(
//!     IndexScope::Main,
//!     &IndexConfig::default(),
//!     &[ClassFacts::new(class)],
//!     &NoopProgress,
//! )?;
//! assert!(index.view().entries().has_class(&ClassEntry::new("a/Main")));
//! # Ok::<(), remap_index::IndexError>(())
//! ```

#![forbid(unsafe_code)]

mod bridge;
mod enclosing;
mod entry_index;
mod error;
mod indexer;
mod inheritance;
mod jar_index;
mod progress;
mod references;
mod resolver;
mod view;

pub use bridge::{BridgeMethodIndex, BridgeView};
pub use enclosing::EnclosingMethodIndex;
pub use entry_index::{EntryIndex, EntryView};
pub use error::IndexError;
pub use indexer::{ClassFacts, JarIndexer, ReferenceFact};
pub use inheritance::{Ancestors, Generations, InheritanceIndex, InheritanceView, Relation};
pub use jar_index::{
    CombinedJarIndex, IndexScope, IndexSource, IndexView, Indexes, JarIndex, JarIndexBuilder,
};
pub use progress::{NoopProgress, ProgressListener, TracingProgress};
pub use references::{ReferenceIndex, ReferenceView};
pub use resolver::{EntryResolver, IndexEntryResolver, ResolutionStrategy, VoidEntryResolver};
pub use view::{MapView, View};
