use std::any::Any;
use std::collections::BTreeMap;

use remap_entry::{ClassDefEntry, ClassEntry, EnclosingMethodData};

use crate::indexer::JarIndexer;
use crate::view::View;

/// Local and anonymous classes, keyed to the method (or class initializer) declaring them.
#[derive(Debug, Default, Clone)]
pub struct EnclosingMethodIndex {
    enclosing: BTreeMap<ClassEntry, EnclosingMethodData>,
}

impl EnclosingMethodIndex {
    pub fn view(&self) -> View<'_, EnclosingMethodIndex> {
        View::Single(self)
    }
}

impl JarIndexer for EnclosingMethodIndex {
    fn index_enclosing_method(&mut self, class: &ClassDefEntry, data: &EnclosingMethodData) {
        self.enclosing.insert(class.entry.clone(), data.clone());
    }

    fn name(&self) -> &'static str {
        "enclosing methods"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<'a> View<'a, EnclosingMethodIndex> {
    pub fn enclosing_method(self, class: &ClassEntry) -> Option<&'a EnclosingMethodData> {
        self.first(|index| index.enclosing.get(class))
    }

    pub fn has_enclosing_method(self, class: &ClassEntry) -> bool {
        self.enclosing_method(class).is_some()
    }
}
