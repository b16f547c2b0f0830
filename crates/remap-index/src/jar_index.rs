use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use remap_config::IndexConfig;
use remap_entry::{ClassEntry, Entry, STATIC_INITIALIZER_NAME};

use crate::bridge::{BridgeMethodIndex, BridgeView};
use crate::enclosing::EnclosingMethodIndex;
use crate::entry_index::{EntryIndex, EntryView};
use crate::error::IndexError;
use crate::indexer::{ClassFacts, JarIndexer};
use crate::inheritance::{InheritanceIndex, InheritanceView, Relation};
use crate::progress::ProgressListener;
use crate::references::{ReferenceIndex, ReferenceView};
use crate::resolver::IndexEntryResolver;
use crate::view::View;

/// Which class set an index was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexScope {
    /// The artifact being remapped.
    Main,
    /// Its dependency classpath.
    Libraries,
}

/// The built-in indexes of one scope.
#[derive(Debug, Default)]
pub struct Indexes {
    entries: EntryIndex,
    inheritance: InheritanceIndex,
    references: ReferenceIndex,
    bridges: BridgeMethodIndex,
    enclosing: EnclosingMethodIndex,
    children: BTreeMap<ClassEntry, Vec<Entry>>,
    indexed: BTreeSet<String>,
}

pub type IndexView<'a> = View<'a, Indexes>;

impl<'a> View<'a, Indexes> {
    pub fn entries(self) -> EntryView<'a> {
        self.map(|index| &index.entries)
    }

    pub fn inheritance(self) -> InheritanceView<'a> {
        self.map(|index| &index.inheritance)
    }

    pub fn references(self) -> ReferenceView<'a> {
        self.map(|index| &index.references)
    }

    pub fn bridges(self) -> BridgeView<'a> {
        self.map(|index| &index.bridges)
    }

    pub fn enclosing(self) -> View<'a, EnclosingMethodIndex> {
        self.map(|index| &index.enclosing)
    }

    /// Non-synthetic inner classes, fields and methods declared by `class`, in declaration
    /// order. Static initializers are left out.
    pub fn children_of(self, class: &ClassEntry) -> &'a [Entry] {
        self.first_slice(|index| index.children.get(class).map_or(&[][..], Vec::as_slice))
    }

    /// Whether `name` was part of the scanned class set, JRE classes included.
    pub fn is_indexed(self, name: &str) -> bool {
        self.any(|index| index.indexed.contains(name))
    }

    pub fn compute_class_relation(self, class: &ClassEntry, ancestor: &ClassEntry) -> Relation {
        self.inheritance()
            .compute_class_relation(self.entries(), class, ancestor)
    }

    pub fn resolver(self) -> IndexEntryResolver<'a> {
        IndexEntryResolver::new(self)
    }
}

/// Exclusive, mutable state of one index build.
///
/// Facts are fed in through [`JarIndexBuilder::index_class`] or
/// [`JarIndexBuilder::index_all`]; [`JarIndexBuilder::finish`] derives bridges, re-targets
/// references and freezes everything into a [`JarIndex`]. Failing or cancelled builds are
/// consumed, so a partial index is never observable.
pub struct JarIndexBuilder {
    scope: IndexScope,
    config: IndexConfig,
    parts: Indexes,
    extras: Vec<Box<dyn JarIndexer>>,
}

impl JarIndexBuilder {
    pub fn new(scope: IndexScope, config: IndexConfig) -> Self {
        Self {
            scope,
            config,
            parts: Indexes::default(),
            extras: Vec::new(),
        }
    }

    /// Registers an additional indexer. Indexers see facts in registration order, after the
    /// built-in ones.
    pub fn with_indexer(mut self, indexer: Box<dyn JarIndexer>) -> Self {
        self.extras.push(indexer);
        self
    }

    /// Validates and records everything known about one class.
    pub fn index_class(&mut self, facts: &ClassFacts) -> Result<(), IndexError> {
        facts.validate()?;
        self.declare(facts);
        self.reference(facts);
        Ok(())
    }

    /// Indexes a whole class set: declarations of every class first, then references.
    ///
    /// Classes are validated in parallel before any state is touched.
    pub fn index_all(
        mut self,
        classes: &[ClassFacts],
        progress: &dyn ProgressListener,
    ) -> Result<Self, IndexError> {
        let _span = tracing::debug_span!(
            target: "remap.index",
            "index_jar",
            scope = ?self.scope,
            classes = classes.len()
        )
        .entered();

        progress.init(4, "Indexing jar");

        let validated: Vec<Result<(), IndexError>> =
            classes.par_iter().map(ClassFacts::validate).collect();
        validated.into_iter().collect::<Result<(), IndexError>>()?;

        progress.step(1, "Indexing entries");
        for facts in classes {
            check_cancelled(progress)?;
            self.declare(facts);
        }

        progress.step(2, "Indexing references");
        for facts in classes {
            check_cancelled(progress)?;
            self.reference(facts);
        }

        tracing::debug!(
            target: "remap.index",
            scope = ?self.scope,
            entries = self.parts.entries.len(),
            "indexed declarations and references"
        );
        Ok(self)
    }

    /// Runs the finalization passes and freezes the index.
    pub fn finish(mut self, progress: &dyn ProgressListener) -> Result<JarIndex, IndexError> {
        let _span =
            tracing::debug_span!(target: "remap.index", "finish", scope = ?self.scope).entered();

        check_cancelled(progress)?;
        progress.step(3, "Indexing methods");
        {
            let Indexes {
                entries,
                inheritance,
                references,
                bridges,
                ..
            } = &mut self.parts;
            bridges.find_bridge_methods(entries.view(), inheritance.view(), references.view());
        }

        check_cancelled(progress)?;
        progress.step(4, "Processing: references");
        let remapped = self
            .parts
            .references
            .remapped(&IndexEntryResolver::new(View::Single(&self.parts)));
        self.parts.references = remapped;

        progress.step(4, "Processing: bridges");
        self.parts.bridges.process_aliases();

        for extra in &mut self.extras {
            check_cancelled(progress)?;
            progress.step(4, &format!("Processing: {}", extra.name()));
            extra.process_index(View::Single(&self.parts));
        }

        if self.config.verify_bridge_consistency {
            self.parts.bridges.check_consistency()?;
        }

        progress.step(4, "Processing: done");
        Ok(JarIndex {
            scope: self.scope,
            parts: self.parts,
            extras: self.extras,
        })
    }

    fn skips(&self, class: &ClassEntry) -> bool {
        self.config.skip_jre_classes && class.is_jre()
    }

    fn each_indexer(&mut self, mut f: impl FnMut(&mut dyn JarIndexer)) {
        f(&mut self.parts.entries);
        f(&mut self.parts.inheritance);
        f(&mut self.parts.references);
        f(&mut self.parts.enclosing);
        for extra in &mut self.extras {
            f(extra.as_mut());
        }
    }

    fn declare(&mut self, facts: &ClassFacts) {
        let class = &facts.class;
        self.parts
            .indexed
            .insert(class.entry.full_name().to_owned());
        if self.skips(&class.entry) {
            return;
        }

        self.each_indexer(|indexer| indexer.index_class(class));
        if let Some(outer) = class.entry.outer_class() {
            if !class.access.is_synthetic() {
                self.add_child(outer, Entry::Class(class.entry.clone()));
            }
        }

        for field in &facts.fields {
            self.each_indexer(|indexer| indexer.index_field(field));
            if !field.access.is_synthetic() {
                self.add_child(class.entry.clone(), Entry::Field(field.entry.clone()));
            }
        }

        for method in &facts.methods {
            self.each_indexer(|indexer| indexer.index_method(method));
            if !method.access.is_synthetic() && method.entry.name != STATIC_INITIALIZER_NAME {
                self.add_child(class.entry.clone(), Entry::Method(method.entry.clone()));
            }
        }

        if let Some(data) = &facts.enclosing_method {
            self.each_indexer(|indexer| indexer.index_enclosing_method(class, data));
        }
    }

    fn reference(&mut self, facts: &ClassFacts) {
        if self.skips(&facts.class.entry) {
            return;
        }
        for reference in &facts.references {
            self.each_indexer(|indexer| reference.dispatch(indexer));
        }
    }

    fn add_child(&mut self, class: ClassEntry, child: Entry) {
        self.parts.children.entry(class).or_default().push(child);
    }
}

impl fmt::Debug for JarIndexBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JarIndexBuilder")
            .field("scope", &self.scope)
            .field("config", &self.config)
            .field("extras", &indexer_names(&self.extras))
            .finish_non_exhaustive()
    }
}

fn check_cancelled(progress: &dyn ProgressListener) -> Result<(), IndexError> {
    if progress.is_cancelled() {
        tracing::debug!(target: "remap.index", "index build cancelled");
        Err(IndexError::Cancelled)
    } else {
        Ok(())
    }
}

fn indexer_names(extras: &[Box<dyn JarIndexer>]) -> Vec<&'static str> {
    extras.iter().map(|extra| extra.name()).collect()
}

/// A frozen index of one scope. Read-only and shareable across threads.
pub struct JarIndex {
    scope: IndexScope,
    parts: Indexes,
    extras: Vec<Box<dyn JarIndexer>>,
}

impl JarIndex {
    /// An index of no classes at all.
    pub fn empty(scope: IndexScope) -> Self {
        Self {
            scope,
            parts: Indexes::default(),
            extras: Vec::new(),
        }
    }

    /// Builds an index with only the built-in indexers.
    pub fn build(
        scope: IndexScope,
        config: &IndexConfig,
        classes: &[ClassFacts],
        progress: &dyn ProgressListener,
    ) -> Result<Self, IndexError> {
        JarIndexBuilder::new(scope, *config)
            .index_all(classes, progress)?
            .finish(progress)
    }

    pub fn scope(&self) -> IndexScope {
        self.scope
    }

    pub fn view(&self) -> IndexView<'_> {
        View::Single(&self.parts)
    }

    pub fn entry_resolver(&self) -> IndexEntryResolver<'_> {
        IndexEntryResolver::new(self.view())
    }

    /// Looks up an indexer by type, built-in or registered.
    pub fn indexer<T: JarIndexer>(&self) -> Option<&T> {
        let built_in: [&(dyn JarIndexer + 'static); 4] = [
            &self.parts.entries,
            &self.parts.inheritance,
            &self.parts.references,
            &self.parts.enclosing,
        ];
        built_in
            .into_iter()
            .chain(self.extras.iter().map(|extra| &**extra))
            .find_map(|indexer| indexer.as_any().downcast_ref::<T>())
    }
}

impl fmt::Debug for JarIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JarIndex")
            .field("scope", &self.scope)
            .field("classes", &self.parts.entries.view().classes().count())
            .field("extras", &indexer_names(&self.extras))
            .finish()
    }
}

/// Anything that can hand out a read-only view over built indexes.
pub trait IndexSource {
    fn index_view(&self) -> IndexView<'_>;

    fn entry_resolver(&self) -> IndexEntryResolver<'_> {
        IndexEntryResolver::new(self.index_view())
    }
}

impl IndexSource for JarIndex {
    fn index_view(&self) -> IndexView<'_> {
        self.view()
    }
}

impl IndexSource for CombinedJarIndex {
    fn index_view(&self) -> IndexView<'_> {
        self.view()
    }
}

impl<T: IndexSource + ?Sized> IndexSource for Arc<T> {
    fn index_view(&self) -> IndexView<'_> {
        (**self).index_view()
    }
}

/// A main index layered over a library index without copying either.
///
/// Every query asks the main index first and falls back to the libraries only when the
/// main index has no answer.
#[derive(Debug, Clone)]
pub struct CombinedJarIndex {
    main: Arc<JarIndex>,
    libraries: Arc<JarIndex>,
}

impl CombinedJarIndex {
    pub fn new(main: impl Into<Arc<JarIndex>>, libraries: impl Into<Arc<JarIndex>>) -> Self {
        Self {
            main: main.into(),
            libraries: libraries.into(),
        }
    }

    /// Builds both indexes independently. Library classes are skipped when
    /// `index_libraries` is off.
    pub fn build(
        main_classes: &[ClassFacts],
        library_classes: &[ClassFacts],
        config: &IndexConfig,
        progress: &dyn ProgressListener,
    ) -> Result<Self, IndexError> {
        let main = JarIndex::build(IndexScope::Main, config, main_classes, progress)?;
        let libraries = if config.index_libraries {
            JarIndex::build(IndexScope::Libraries, config, library_classes, progress)?
        } else {
            JarIndex::empty(IndexScope::Libraries)
        };

        tracing::info!(
            target: "remap.index",
            main_classes = main_classes.len(),
            library_classes = library_classes.len(),
            index_libraries = config.index_libraries,
            "built combined index"
        );
        Ok(Self::new(main, libraries))
    }

    pub fn main(&self) -> &Arc<JarIndex> {
        &self.main
    }

    pub fn libraries(&self) -> &Arc<JarIndex> {
        &self.libraries
    }

    pub fn view(&self) -> IndexView<'_> {
        View::Combined {
            main: &self.main.parts,
            libraries: &self.libraries.parts,
        }
    }

    pub fn entry_resolver(&self) -> IndexEntryResolver<'_> {
        IndexEntryResolver::new(self.view())
    }
}
