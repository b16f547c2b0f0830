use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use remap_entry::{ClassEntry, Entry, MethodEntry};
use remap_index::{CombinedJarIndex, IndexView};
use remap_test_utils::strategies::main_over_libraries;
use remap_test_utils::{class, method, JarFixture};

const PROPTEST_CASES: u32 = 64;

fn fallback<T>(main: Option<T>, libraries: impl FnOnce() -> Option<T>) -> Option<T> {
    main.or_else(libraries)
}

fn either(main: IndexView<'_>, libraries: IndexView<'_>, f: impl Fn(IndexView<'_>) -> bool) -> bool {
    f(main) || f(libraries)
}

fn classes_of(index: &CombinedJarIndex) -> BTreeSet<ClassEntry> {
    let mut classes: BTreeSet<ClassEntry> = index.view().entries().classes().cloned().collect();
    classes.insert(class("never/Declared"));
    classes
}

fn methods_of(index: &CombinedJarIndex) -> BTreeSet<MethodEntry> {
    let mut methods: BTreeSet<MethodEntry> = index.view().entries().methods().cloned().collect();
    let bridges = index.view().bridges();
    methods.extend(bridges.specialized_to_bridge().keys().cloned());
    methods.extend(bridges.bridge_to_specialized().keys().cloned());
    methods
}

fn check_equivalence(combined: &CombinedJarIndex) -> Result<(), TestCaseError> {
    let view = combined.view();
    let main = combined.main().view();
    let libraries = combined.libraries().view();

    for class in classes_of(combined) {
        prop_assert_eq!(
            view.entries().has_class(&class),
            either(main, libraries, |v| v.entries().has_class(&class))
        );
        prop_assert_eq!(
            view.entries().class_access(&class),
            fallback(main.entries().class_access(&class), || libraries
                .entries()
                .class_access(&class))
        );
        prop_assert_eq!(
            view.is_indexed(class.full_name()),
            either(main, libraries, |v| v.is_indexed(class.full_name()))
        );

        let parents = view.inheritance().parents(&class);
        let expected = if main.inheritance().parents(&class).is_empty() {
            libraries.inheritance().parents(&class)
        } else {
            main.inheritance().parents(&class)
        };
        prop_assert_eq!(parents, expected);

        let children = view.inheritance().children(&class);
        let expected = if main.inheritance().children(&class).is_empty() {
            libraries.inheritance().children(&class)
        } else {
            main.inheritance().children(&class)
        };
        prop_assert_eq!(children, expected);

        let members = view.children_of(&class);
        let expected = if main.children_of(&class).is_empty() {
            libraries.children_of(&class)
        } else {
            main.children_of(&class)
        };
        prop_assert_eq!(members, expected);

        let class_refs: Vec<_> = view.references().references_to_class(&class).collect();
        let main_refs: Vec<_> = main.references().references_to_class(&class).collect();
        let expected = if main_refs.is_empty() {
            libraries.references().references_to_class(&class).collect()
        } else {
            main_refs
        };
        prop_assert_eq!(class_refs, expected);
    }

    for method in methods_of(combined) {
        let entry = Entry::Method(method.clone());
        prop_assert_eq!(
            view.entries().has_entry(&entry),
            either(main, libraries, |v| v.entries().has_entry(&entry))
        );
        prop_assert_eq!(
            view.entries().method_access(&method),
            fallback(main.entries().method_access(&method), || libraries
                .entries()
                .method_access(&method))
        );

        let bridges = view.bridges();
        prop_assert_eq!(
            bridges.is_bridge_method(&method),
            either(main, libraries, |v| v.bridges().is_bridge_method(&method))
        );
        prop_assert_eq!(
            bridges.is_specialized_method(&method),
            either(main, libraries, |v| v.bridges().is_specialized_method(&method))
        );
        prop_assert_eq!(
            bridges.bridge_from_specialized(&method),
            fallback(main.bridges().bridge_from_specialized(&method), || libraries
                .bridges()
                .bridge_from_specialized(&method))
        );
        prop_assert_eq!(
            bridges.specialized_from_bridge(&method),
            fallback(main.bridges().specialized_from_bridge(&method), || libraries
                .bridges()
                .specialized_from_bridge(&method))
        );

        let callees: Vec<_> = view.references().methods_referenced_by(&method).collect();
        let main_callees: Vec<_> = main.references().methods_referenced_by(&method).collect();
        let expected = if main_callees.is_empty() {
            libraries.references().methods_referenced_by(&method).collect()
        } else {
            main_callees
        };
        prop_assert_eq!(callees, expected);
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    #[test]
    fn combined_queries_ask_main_then_libraries((main, libraries) in main_over_libraries()) {
        let combined = main.combine(&libraries);
        check_equivalence(&combined)?;
    }
}

#[test]
fn main_declarations_shadow_library_declarations() {
    let main = JarFixture::new().class("shared/C", |c| c.method("m()V", 0x0001));
    let libraries = JarFixture::new()
        .class("shared/C", |c| c.method("m()V", 0x0002))
        .class("lib/Only", |c| c.method("n()V", 0x0008));
    let combined = main.combine(&libraries);
    let entries = combined.view().entries();

    assert!(entries
        .method_access(&method("shared/C.m()V"))
        .is_some_and(|access| access.is_public()));
    assert!(entries
        .method_access(&method("lib/Only.n()V"))
        .is_some_and(|access| access.is_static()));

    // Collections are views over both sides, duplicates included.
    assert_eq!(entries.classes().count(), 3);
}

#[test]
fn libraries_can_be_left_out() {
    let main = JarFixture::new().class("a/A", |c| c.extends("lib/L"));
    let libraries = JarFixture::new().class("lib/L", |c| c);
    let config = remap_config::IndexConfig {
        index_libraries: false,
        ..Default::default()
    };
    let combined = CombinedJarIndex::build(
        main.classes(),
        libraries.classes(),
        &config,
        &remap_index::NoopProgress,
    )
    .unwrap();

    assert!(!combined.view().entries().has_class(&class("lib/L")));
    assert_eq!(combined.view().inheritance().parents(&class("a/A")), &[class("lib/L")]);
}
