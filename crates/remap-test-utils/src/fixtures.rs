use remap_config::IndexConfig;
use remap_entry::{
    AccessFlags, ClassDefEntry, ClassEntry, EnclosingMethodData, FieldDefEntry, FieldEntry,
    Lambda, MethodDefEntry, MethodDescriptor, MethodEntry, ReferenceTargetType, ACC_PUBLIC,
};
use remap_index::{
    ClassFacts, CombinedJarIndex, IndexScope, JarIndex, NoopProgress, ReferenceFact,
};

/// Parses `owner.name(desc)`.
pub fn method(spec: &str) -> MethodEntry {
    let (owner, rest) = spec
        .split_once('.')
        .unwrap_or_else(|| panic!("method `{spec}` needs an owner"));
    let paren = rest
        .find('(')
        .unwrap_or_else(|| panic!("method `{spec}` needs a descriptor"));
    MethodEntry::parse(owner, &rest[..paren], &rest[paren..])
        .unwrap_or_else(|err| panic!("bad method `{spec}`: {err}"))
}

/// Parses `owner.name:desc`.
pub fn field(spec: &str) -> FieldEntry {
    let (owner, rest) = spec
        .split_once('.')
        .unwrap_or_else(|| panic!("field `{spec}` needs an owner"));
    let (name, desc) = rest
        .split_once(':')
        .unwrap_or_else(|| panic!("field `{spec}` needs a descriptor"));
    FieldEntry::parse(owner, name, desc).unwrap_or_else(|err| panic!("bad field `{spec}`: {err}"))
}

pub fn class(name: &str) -> ClassEntry {
    ClassEntry::new(name)
}

/// One class as reported by a bytecode front end.
///
/// Classes extend `java/lang/Object` and are public unless configured otherwise. Members are
/// named without their owner: `"get()Ljava/lang/Object;"` for methods and `"x:I"` for fields.
#[derive(Debug, Clone)]
pub struct ClassFixture {
    facts: ClassFacts,
}

impl ClassFixture {
    pub fn new(name: &str) -> Self {
        Self {
            facts: ClassFacts::new(ClassDefEntry::new(
                ClassEntry::new(name),
                AccessFlags::new(ACC_PUBLIC),
                Some(ClassEntry::object()),
                Vec::new(),
            )),
        }
    }

    fn name(&self) -> &str {
        self.facts.class.entry.full_name()
    }

    pub fn access(mut self, access: u16) -> Self {
        self.facts.class.access = AccessFlags::new(access);
        self
    }

    pub fn extends(mut self, super_class: &str) -> Self {
        self.facts.class.super_class = Some(ClassEntry::new(super_class));
        self
    }

    /// Only `java/lang/Object` itself has no superclass.
    pub fn root(mut self) -> Self {
        self.facts.class.super_class = None;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.facts.class.interfaces.push(ClassEntry::new(interface));
        self
    }

    pub fn field(mut self, member: &str, access: u16) -> Self {
        let entry = field(&format!("{}.{member}", self.name()));
        self.facts
            .fields
            .push(FieldDefEntry::new(entry, AccessFlags::new(access)));
        self
    }

    pub fn method(mut self, member: &str, access: u16) -> Self {
        let entry = method(&format!("{}.{member}", self.name()));
        self.facts
            .methods
            .push(MethodDefEntry::new(entry, AccessFlags::new(access)));
        self
    }

    fn caller(&self, member: &str) -> MethodDefEntry {
        let entry = method(&format!("{}.{member}", self.name()));
        self.facts
            .methods
            .iter()
            .find(|def| def.entry == entry)
            .cloned()
            .unwrap_or_else(|| panic!("caller {entry} must be declared before it calls anything"))
    }

    /// `caller` (a method of this class) invokes `target` (`owner.name(desc)`).
    pub fn calls(self, caller: &str, target: &str) -> Self {
        self.calls_on(caller, target, ReferenceTargetType::None)
    }

    pub fn calls_on(mut self, caller: &str, target: &str, kind: ReferenceTargetType) -> Self {
        let caller = self.caller(caller);
        self.facts.references.push(ReferenceFact::Method {
            caller,
            method: method(target),
            target: kind,
        });
        self
    }

    /// `caller` reads or writes `target` (`owner.name:desc`).
    pub fn accesses(mut self, caller: &str, target: &str) -> Self {
        let caller = self.caller(caller);
        self.facts.references.push(ReferenceFact::Field {
            caller,
            field: field(target),
            target: ReferenceTargetType::None,
        });
        self
    }

    pub fn uses_class(mut self, caller: &str, target: &str) -> Self {
        let caller = self.caller(caller);
        self.facts.references.push(ReferenceFact::Class {
            caller,
            class: ClassEntry::new(target),
            target: ReferenceTargetType::None,
        });
        self
    }

    pub fn lambda(mut self, caller: &str, lambda: Lambda) -> Self {
        let caller = self.caller(caller);
        self.facts.references.push(ReferenceFact::Lambda {
            caller,
            lambda,
            target: ReferenceTargetType::None,
        });
        self
    }

    /// Declared inside `owner.name(desc)`, or inside a class initializer of `owner`.
    pub fn enclosed_in(mut self, owner: &str, method: Option<(&str, &str)>) -> Self {
        let (name, desc) = match method {
            Some((name, desc)) => (
                Some(name.to_string()),
                Some(MethodDescriptor::parse(desc).unwrap_or_else(|err| panic!("{err}"))),
            ),
            None => (None, None),
        };
        self.facts.enclosing_method =
            Some(EnclosingMethodData::new(ClassEntry::new(owner), name, desc));
        self
    }

    pub fn into_facts(self) -> ClassFacts {
        self.facts
    }
}

/// An ordered class set.
#[derive(Debug, Clone, Default)]
pub struct JarFixture {
    classes: Vec<ClassFacts>,
}

impl JarFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, name: &str, build: impl FnOnce(ClassFixture) -> ClassFixture) -> Self {
        self.classes
            .push(build(ClassFixture::new(name)).into_facts());
        self
    }

    pub fn push(&mut self, class: ClassFixture) {
        self.classes.push(class.into_facts());
    }

    pub fn classes(&self) -> &[ClassFacts] {
        &self.classes
    }

    /// Declares `java/lang/Object` so hierarchies can be proven unrelated. Requires JRE
    /// classes to be indexed.
    pub fn with_object(mut self) -> Self {
        self.classes
            .insert(0, ClassFixture::new("java/lang/Object").root().into_facts());
        self
    }

    pub fn build(&self) -> JarIndex {
        self.build_with(&IndexConfig::default())
    }

    pub fn build_with(&self, config: &IndexConfig) -> JarIndex {
        self.build_scope(IndexScope::Main, config)
    }

    pub fn build_scope(&self, scope: IndexScope, config: &IndexConfig) -> JarIndex {
        JarIndex::build(scope, config, &self.classes, &NoopProgress)
            .unwrap_or_else(|err| panic!("fixture failed to index: {err}"))
    }

    /// Builds `self` as the main index over `libraries`.
    pub fn combine(&self, libraries: &JarFixture) -> CombinedJarIndex {
        CombinedJarIndex::build(
            &self.classes,
            &libraries.classes,
            &IndexConfig::default(),
            &NoopProgress,
        )
        .unwrap_or_else(|err| panic!("fixture failed to index: {err}"))
    }
}

/// Index settings under which `java/` classes are declared like any other class.
pub fn config_with_jre() -> IndexConfig {
    IndexConfig {
        skip_jre_classes: false,
        ..IndexConfig::default()
    }
}
