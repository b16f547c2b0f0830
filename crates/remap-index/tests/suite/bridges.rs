use pretty_assertions::assert_eq;
use remap_entry::{ACC_ABSTRACT, ACC_BRIDGE, ACC_PUBLIC, ACC_SYNTHETIC};
use remap_test_utils::{config_with_jre, method, JarFixture};

const BRIDGE: u16 = ACC_PUBLIC | ACC_SYNTHETIC | ACC_BRIDGE;

#[test]
fn generic_override_gets_a_bridge() {
    let index = JarFixture::new()
        .class("A", |c| c.method("foo()Ljava/lang/Object;", ACC_PUBLIC | ACC_ABSTRACT))
        .class("B", |c| {
            c.extends("A")
                .method("foo()Ljava/lang/String;", ACC_PUBLIC)
                .method("foo()Ljava/lang/Object;", BRIDGE)
                .calls("foo()Ljava/lang/Object;", "B.foo()Ljava/lang/String;")
        })
        .build();

    let bridges = index.view().bridges();
    let bridge = method("B.foo()Ljava/lang/Object;");
    let specialized = method("B.foo()Ljava/lang/String;");

    assert!(bridges.is_bridge_method(&bridge));
    assert!(bridges.is_specialized_method(&specialized));
    assert_eq!(bridges.specialized_from_bridge(&bridge), Some(&specialized));
    assert_eq!(bridges.bridge_from_specialized(&specialized), Some(&bridge));
    assert!(!bridges.is_bridge_method(&specialized));
}

/// `C.c()Integer` is bridged by both `C.a()Object` and `C.b()Number`, and `B.b()Number` is
/// itself bridged by `B.a()Object`.
fn stacked_bridges() -> JarFixture {
    JarFixture::new()
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
}

#[test]
fn stacked_bridges_resolve_through_renamed_aliases() {
    let index = stacked_bridges().build();
    let bridges = index.view().bridges();

    let specialized = method("C.c()Ljava/lang/Integer;");
    let renamed = method("C.a()Ljava/lang/Integer;");
    let bridge = method("C.a()Ljava/lang/Object;");

    assert_eq!(bridges.bridge_from_specialized(&specialized), Some(&bridge));
    assert_eq!(bridges.bridge_from_specialized(&renamed), Some(&bridge));
    assert!(bridges.is_specialized_method(&renamed));

    // Both bridges of `C` still point at the specialized method.
    assert_eq!(
        bridges.specialized_from_bridge(&method("C.b()Ljava/lang/Number;")),
        Some(&specialized)
    );

    // Aliases only live in the specialized-to-bridge map.
    assert_eq!(bridges.bridge_to_specialized().len(), 3);
    assert_eq!(bridges.specialized_to_bridge().len(), 4);
    assert_eq!(
        bridges
            .specialized_to_bridge()
            .get(&method("B.a()Ljava/lang/Number;")),
        Some(&method("B.a()Ljava/lang/Object;"))
    );
}

#[test]
fn unflagged_synthetic_method_with_unrelated_types_is_not_a_bridge() {
    let fixture = JarFixture::new()
        .class("P", |c| c)
        .class("Q", |c| c)
        .class("S", |c| {
            c.method("get()LQ;", ACC_PUBLIC)
                .method("get()LP;", ACC_PUBLIC | ACC_SYNTHETIC)
                .calls("get()LP;", "S.get()LQ;")
        });
    let synthetic = method("S.get()LP;");

    // Without `java/lang/Object` the relation of P and Q is unknown, which counts as
    // compatible.
    let index = fixture.build();
    assert!(index.view().bridges().is_bridge_method(&synthetic));

    let index = fixture.with_object().build_with(&config_with_jre());
    assert!(!index.view().bridges().is_bridge_method(&synthetic));
}

#[test]
fn static_synthetic_accessors_are_not_bridges() {
    let index = JarFixture::new()
        .class("O", |c| {
            c.method("secret()V", 0x0002)
                .method("access$000()V", ACC_SYNTHETIC | 0x0008)
                .calls("access$000()V", "O.secret()V")
        })
        .build();
    assert!(!index
        .view()
        .bridges()
        .is_bridge_method(&method("O.access$000()V")));
}
