use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use remap_entry::{
    ClassEntry, EntryReference, FieldDefEntry, FieldEntry, Lambda, LambdaTarget,
    MethodDefEntry, MethodDescriptor, MethodEntry, ReferenceTargetType, TypeDescriptor,
};

use crate::indexer::JarIndexer;
use crate::resolver::{EntryResolver, ResolutionStrategy};
use crate::view::View;

type Refs<K, V> = BTreeMap<K, BTreeSet<V>>;

/// Who-uses-what graph: for every method, the members it touches, and for every member or
/// class, the call sites touching it.
#[derive(Debug, Default, Clone)]
pub struct ReferenceIndex {
    method_references: Refs<MethodEntry, MethodEntry>,
    field_references: Refs<MethodEntry, FieldEntry>,

    references_to_methods: Refs<MethodEntry, EntryReference<MethodEntry>>,
    references_to_classes: Refs<ClassEntry, EntryReference<ClassEntry>>,
    references_to_fields: Refs<FieldEntry, EntryReference<FieldEntry>>,
    field_type_references: Refs<ClassEntry, EntryReference<ClassEntry, FieldEntry>>,
    method_type_references: Refs<ClassEntry, EntryReference<ClassEntry, MethodEntry>>,
}

fn insert<K: Ord, V: Ord>(map: &mut Refs<K, V>, key: K, value: V) {
    map.entry(key).or_default().insert(value);
}

impl ReferenceIndex {
    pub fn view(&self) -> View<'_, ReferenceIndex> {
        View::Single(self)
    }

    fn index_method_descriptor(&mut self, method: &MethodEntry, desc: &MethodDescriptor) {
        for class in desc.referenced_classes() {
            insert(
                &mut self.method_type_references,
                class.clone(),
                EntryReference::new(class, method.clone(), ReferenceTargetType::None),
            );
        }
    }

    fn index_field_type(&mut self, field: &FieldEntry, desc: &TypeDescriptor) {
        if let Some(class) = desc.element_type().class_entry() {
            insert(
                &mut self.field_type_references,
                class.clone(),
                EntryReference::new(class, field.clone(), ReferenceTargetType::None),
            );
        }
    }

    fn add_method_reference(
        &mut self,
        caller: &MethodEntry,
        method: &MethodEntry,
        target: &ReferenceTargetType,
    ) {
        insert(&mut self.method_references, caller.clone(), method.clone());
        insert(
            &mut self.references_to_methods,
            method.clone(),
            EntryReference::new(method.clone(), caller.clone(), target.clone()),
        );

        if method.is_constructor() {
            insert(
                &mut self.references_to_classes,
                method.owner.clone(),
                EntryReference::new(method.owner.clone(), caller.clone(), target.clone()),
            );
        }
    }

    fn add_field_reference(
        &mut self,
        caller: &MethodEntry,
        field: &FieldEntry,
        target: &ReferenceTargetType,
    ) {
        insert(&mut self.field_references, caller.clone(), field.clone());
        insert(
            &mut self.references_to_fields,
            field.clone(),
            EntryReference::new(field.clone(), caller.clone(), target.clone()),
        );
    }

    /// Re-targets every key, value and context to its closest declaration.
    ///
    /// References are recorded against the owner named at the call site, which is often a
    /// subclass of the declaring class. Entries the resolver cannot place are kept as is.
    pub(crate) fn remapped(&self, resolver: &impl EntryResolver) -> ReferenceIndex {
        let method = |m: &MethodEntry| {
            resolver
                .resolve_first(m.clone(), ResolutionStrategy::Closest)
                .unwrap_or_else(|| m.clone())
        };
        let field = |f: &FieldEntry| {
            resolver
                .resolve_first(f.clone(), ResolutionStrategy::Closest)
                .unwrap_or_else(|| f.clone())
        };
        let class = |c: &ClassEntry| c.clone();

        ReferenceIndex {
            method_references: remap_map(&self.method_references, method, |m| method(m)),
            field_references: remap_map(&self.field_references, method, |f| field(f)),
            references_to_methods: remap_map(&self.references_to_methods, method, |r| {
                remap_reference(r, method, method)
            }),
            references_to_classes: remap_map(&self.references_to_classes, class, |r| {
                remap_reference(r, class, method)
            }),
            references_to_fields: remap_map(&self.references_to_fields, field, |r| {
                remap_reference(r, field, method)
            }),
            field_type_references: remap_map(&self.field_type_references, class, |r| {
                remap_reference(r, class, field)
            }),
            method_type_references: remap_map(&self.method_type_references, class, |r| {
                remap_reference(r, class, method)
            }),
        }
    }
}

fn remap_map<K: Ord, V: Ord>(
    map: &Refs<K, V>,
    key: impl Fn(&K) -> K,
    value: impl Fn(&V) -> V,
) -> Refs<K, V> {
    let mut out: Refs<K, V> = BTreeMap::new();
    for (k, values) in map {
        out.entry(key(k))
            .or_default()
            .extend(values.iter().map(&value));
    }
    out
}

fn remap_reference<E, C>(
    reference: &EntryReference<E, C>,
    entry: impl Fn(&E) -> E,
    context: impl Fn(&C) -> C,
) -> EntryReference<E, C> {
    EntryReference::new(
        entry(&reference.entry),
        context(&reference.context),
        reference.target.clone(),
    )
}

impl JarIndexer for ReferenceIndex {
    fn index_field(&mut self, field: &FieldDefEntry) {
        self.index_field_type(&field.entry, &field.entry.desc);
    }

    fn index_method(&mut self, method: &MethodDefEntry) {
        self.index_method_descriptor(&method.entry, &method.entry.desc);
    }

    fn index_class_reference(
        &mut self,
        caller: &MethodDefEntry,
        class: &ClassEntry,
        target: &ReferenceTargetType,
    ) {
        insert(
            &mut self.references_to_classes,
            class.clone(),
            EntryReference::new(class.clone(), caller.entry.clone(), target.clone()),
        );
    }

    fn index_method_reference(
        &mut self,
        caller: &MethodDefEntry,
        method: &MethodEntry,
        target: &ReferenceTargetType,
    ) {
        self.add_method_reference(&caller.entry, method, target);
    }

    fn index_field_reference(
        &mut self,
        caller: &MethodDefEntry,
        field: &FieldEntry,
        target: &ReferenceTargetType,
    ) {
        self.add_field_reference(&caller.entry, field, target);
    }

    fn index_lambda(
        &mut self,
        caller: &MethodDefEntry,
        lambda: &Lambda,
        target: &ReferenceTargetType,
    ) {
        match &lambda.implementation {
            LambdaTarget::Method(method) => self.add_method_reference(&caller.entry, method, target),
            LambdaTarget::Field(field) => self.add_field_reference(&caller.entry, field, target),
        }

        for desc in [
            &lambda.invoked_type,
            &lambda.sam_method_type,
            &lambda.instantiated_method_type,
        ] {
            self.index_method_descriptor(&caller.entry, desc);
        }
    }

    fn name(&self) -> &'static str {
        "references"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type ReferenceView<'a> = View<'a, ReferenceIndex>;

impl<'a> View<'a, ReferenceIndex> {
    /// Methods invoked by `caller`, including constructors and lambda implementations.
    pub fn methods_referenced_by(
        self,
        caller: &MethodEntry,
    ) -> impl Iterator<Item = &'a MethodEntry> + 'a {
        self.first_set(|index| index.method_references.get(caller))
    }

    pub fn fields_referenced_by(
        self,
        caller: &MethodEntry,
    ) -> impl Iterator<Item = &'a FieldEntry> + 'a {
        self.first_set(|index| index.field_references.get(caller))
    }

    pub fn references_to_method(
        self,
        method: &MethodEntry,
    ) -> impl Iterator<Item = &'a EntryReference<MethodEntry>> + 'a {
        self.first_set(|index| index.references_to_methods.get(method))
    }

    /// Explicit class uses (`new`, casts, `instanceof`, constants) and constructor calls.
    pub fn references_to_class(
        self,
        class: &ClassEntry,
    ) -> impl Iterator<Item = &'a EntryReference<ClassEntry>> + 'a {
        self.first_set(|index| index.references_to_classes.get(class))
    }

    pub fn references_to_field(
        self,
        field: &FieldEntry,
    ) -> impl Iterator<Item = &'a EntryReference<FieldEntry>> + 'a {
        self.first_set(|index| index.references_to_fields.get(field))
    }

    /// Fields whose declared type mentions `class`, arrays included.
    pub fn field_type_references_to_class(
        self,
        class: &ClassEntry,
    ) -> impl Iterator<Item = &'a EntryReference<ClassEntry, FieldEntry>> + 'a {
        self.first_set(|index| index.field_type_references.get(class))
    }

    /// Methods whose descriptor mentions `class`, including lambda call site descriptors.
    pub fn method_type_references_to_class(
        self,
        class: &ClassEntry,
    ) -> impl Iterator<Item = &'a EntryReference<ClassEntry, MethodEntry>> + 'a {
        self.first_set(|index| index.method_type_references.get(class))
    }
}
