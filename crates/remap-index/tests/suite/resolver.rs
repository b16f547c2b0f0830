use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use remap_entry::{
    Entry, LocalVariableEntry, MethodEntry, ACC_ABSTRACT, ACC_BRIDGE, ACC_FINAL, ACC_PRIVATE,
    ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC,
};
use remap_index::{EntryResolver, ResolutionStrategy, VoidEntryResolver};
use remap_test_utils::{class, field, method, JarFixture};

use ResolutionStrategy::{Closest, Root};

const BRIDGE: u16 = ACC_PUBLIC | ACC_SYNTHETIC | ACC_BRIDGE;

/// `A.run` is overridden by `B` and `C`, `D` inherits it from `C`, and `E` and `F` override it
/// on separate branches. `F.run` is final.
fn override_chain() -> JarFixture {
    JarFixture::new()
        .class("A", |c| {
            c.method("run()V", ACC_PUBLIC)
                .field("size:I", ACC_PUBLIC)
                .method("secret()V", ACC_PRIVATE)
                .method("util()V", ACC_PUBLIC | ACC_STATIC)
        })
        .class("B", |c| {
            c.extends("A")
                .method("run()V", ACC_PUBLIC)
                .method("secret()V", ACC_PRIVATE)
        })
        .class("C", |c| c.extends("B").method("run()V", ACC_PUBLIC))
        .class("F", |c| c.extends("A").method("run()V", ACC_PUBLIC | ACC_FINAL))
        .class("D", |c| c.extends("C"))
        .class("E", |c| c.extends("A").method("run()V", ACC_PUBLIC))
}

fn methods(specs: &[&str]) -> BTreeSet<MethodEntry> {
    specs.iter().map(|spec| method(spec)).collect()
}

fn entry(spec: &str) -> Entry {
    Entry::Method(method(spec))
}

#[test]
fn declared_methods_are_their_own_closest_declaration() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    assert_eq!(resolver.resolve_entry(&entry("C.run()V"), Closest), vec![entry("C.run()V")]);
    assert_eq!(resolver.resolve_entry(&entry("D.run()V"), Closest), vec![entry("C.run()V")]);
}

#[test]
fn root_resolution_walks_to_the_topmost_override() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    for owner in ["A", "B", "C", "D", "E", "F"] {
        assert_eq!(
            resolver.resolve_first(method(&format!("{owner}.run()V")), Root),
            Some(method("A.run()V")),
            "{owner}.run()V"
        );
    }
}

#[test]
fn fields_resolve_to_the_declaring_ancestor() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    assert_eq!(
        resolver.resolve_first(field("D.size:I"), Closest),
        Some(field("A.size:I"))
    );
    assert_eq!(resolver.resolve_first(field("D.size:I"), Root), Some(field("A.size:I")));
    assert_eq!(resolver.resolve_first(field("A.size:I"), Root), Some(field("A.size:I")));
}

#[test]
fn private_and_static_members_are_never_overridden() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    assert_eq!(
        resolver.resolve_entry(&entry("B.secret()V"), Root),
        vec![entry("B.secret()V")]
    );
    assert_eq!(resolver.resolve_entry(&entry("A.util()V"), Root), vec![entry("A.util()V")]);
    // A private ancestor declaration is invisible from below.
    assert!(resolver.resolve_entry(&entry("E.secret()V"), Closest).is_empty());
}

#[test]
fn unknown_members_resolve_to_nothing() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    assert!(resolver.resolve_entry(&entry("Z.run()V"), Root).is_empty());
    assert!(resolver.resolve_entry(&entry("D.missing()V"), Closest).is_empty());
    assert_eq!(resolver.resolve_first(method("D.missing()V"), Root), None);
}

#[test]
fn classes_resolve_to_themselves() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    let entry = Entry::Class(class("Nowhere"));
    assert_eq!(resolver.resolve_entry(&entry, Root), vec![entry.clone()]);
}

#[test]
fn parameters_follow_their_method() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    let parameter = LocalVariableEntry::new(method("D.run()V"), 1);
    assert_eq!(
        resolver.resolve_first(parameter, Closest),
        Some(LocalVariableEntry::new(method("C.run()V"), 1))
    );
}

#[test]
fn equivalent_methods_span_the_whole_override_tree() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();
    let expected = methods(&["A.run()V", "B.run()V", "C.run()V", "E.run()V"]);

    assert_eq!(resolver.resolve_equivalent_methods(&method("B.run()V")), expected);
    assert_eq!(resolver.resolve_equivalent_methods(&method("E.run()V")), expected);
    // Final methods cannot be overridden and are renamed on their own.
    assert_eq!(
        resolver.resolve_equivalent_methods(&method("F.run()V")),
        methods(&["F.run()V"])
    );
    assert_eq!(
        resolver.resolve_equivalent_methods(&method("B.secret()V")),
        methods(&["B.secret()V"])
    );
    assert_eq!(
        resolver.resolve_equivalent_methods(&method("Z.unknown()V")),
        methods(&["Z.unknown()V"])
    );
}

#[test]
fn equivalent_parameters_share_a_slot() {
    let index = override_chain().build();
    let resolver = index.entry_resolver();

    let parameter = Entry::LocalVariable(LocalVariableEntry::new(method("B.run()V"), 0));
    let equivalent = resolver.resolve_equivalent_entries(&parameter);
    assert_eq!(equivalent.len(), 4);
    assert!(equivalent
        .iter()
        .all(|entry| matches!(entry, Entry::LocalVariable(local) if local.index == 0)));

    let class_entry = Entry::Class(class("A"));
    assert_eq!(
        resolver.resolve_equivalent_entries(&class_entry),
        BTreeSet::from([class_entry])
    );
}

#[test]
fn specialized_methods_resolve_through_their_bridge() {
    let index = JarFixture::new()
        .class("A", |c| c.method("foo()Ljava/lang/Object;", ACC_PUBLIC | ACC_ABSTRACT))
        .class("B", |c| {
            c.extends("A")
                .method("foo()Ljava/lang/String;", ACC_PUBLIC)
                .method("foo()Ljava/lang/Object;", BRIDGE)
                .calls("foo()Ljava/lang/Object;", "B.foo()Ljava/lang/String;")
        })
        .build();
    let resolver = index.entry_resolver();
    let specialized = method("B.foo()Ljava/lang/String;");

    assert_eq!(
        resolver.resolve_first(specialized.clone(), Root),
        Some(method("A.foo()Ljava/lang/Object;"))
    );
    assert_eq!(
        resolver.resolve_equivalent_methods(&specialized),
        methods(&[
            "A.foo()Ljava/lang/Object;",
            "B.foo()Ljava/lang/Object;",
            "B.foo()Ljava/lang/String;",
        ])
    );
}

#[test]
fn stacked_bridges_resolve_to_the_first_declaration() {
    let index = JarFixture::new()
        .class("A", |c| c.method("a()Ljava/lang/Object;", ACC_PUBLIC | ACC_ABSTRACT))
        .class("B", |c| {
            c.extends("A")
                .method("a()Ljava/lang/Object;", BRIDGE)
                .method("b()Ljava/lang/Number;", ACC_PUBLIC)
                .calls("a()Ljava/lang/Object;", "B.b()Ljava/lang/Number;")
        })
        .class("C", |c| {
            c.extends("B")
                .method("a()Ljava/lang/Object;", BRIDGE)
                .method("b()Ljava/lang/Number;", BRIDGE)
                .method("c()Ljava/lang/Integer;", ACC_PUBLIC)
                .calls("a()Ljava/lang/Object;", "C.c()Ljava/lang/Integer;")
                .calls("b()Ljava/lang/Number;", "C.c()Ljava/lang/Integer;")
        })
        .build();
    let resolver = index.entry_resolver();

    assert_eq!(
        resolver.resolve_first(method("C.c()Ljava/lang/Integer;"), Root),
        Some(method("A.a()Ljava/lang/Object;"))
    );
    assert_eq!(
        resolver.resolve_first(method("B.b()Ljava/lang/Number;"), Root),
        Some(method("A.a()Ljava/lang/Object;"))
    );
}

#[test]
fn members_resolve_across_main_and_libraries() {
    let main = JarFixture::new().class("app/Impl", |c| c.extends("lib/Base"));
    let libraries = JarFixture::new().class("lib/Base", |c| c.method("close()V", ACC_PUBLIC));
    let combined = main.combine(&libraries);

    assert_eq!(
        combined
            .entry_resolver()
            .resolve_first(method("app/Impl.close()V"), Closest),
        Some(method("lib/Base.close()V"))
    );
    assert_eq!(
        main.build()
            .entry_resolver()
            .resolve_first(method("app/Impl.close()V"), Closest),
        None
    );
}

#[test]
fn cyclic_hierarchies_terminate() {
    let index = JarFixture::new()
        .class("X", |c| c.extends("Y"))
        .class("Y", |c| c.extends("X").method("m()V", ACC_PUBLIC))
        .build();
    let resolver = index.entry_resolver();

    assert_eq!(resolver.resolve_first(method("X.m()V"), Closest), Some(method("Y.m()V")));
    assert!(resolver.resolve_entry(&entry("X.none()V"), Root).is_empty());
}

#[test]
fn void_resolver_is_the_identity() {
    let resolver = VoidEntryResolver;
    assert_eq!(
        resolver.resolve_first(method("D.run()V"), Root),
        Some(method("D.run()V"))
    );
    assert_eq!(
        resolver.resolve_equivalent_methods(&method("D.run()V")),
        methods(&["D.run()V"])
    );
}
