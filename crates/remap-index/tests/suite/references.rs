use pretty_assertions::assert_eq;
use remap_entry::{
    EntryReference, Lambda, LambdaTarget, MethodDescriptor, ReferenceTargetType, ACC_PRIVATE,
    ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC,
};
use remap_test_utils::{class, field, method, JarFixture};

fn desc(desc: &str) -> MethodDescriptor {
    MethodDescriptor::parse(desc).unwrap()
}

#[test]
fn query_results_outlive_the_queried_entry() {
    let index = JarFixture::new()
        .class("a/Base", |c| c.method("run()V", ACC_PUBLIC))
        .class("a/User", |c| {
            c.method("go()V", ACC_PUBLIC).calls("go()V", "a/Base.run()V")
        })
        .build();
    let references = index.view().references();

    let called = {
        let caller = method("a/User.go()V");
        references.methods_referenced_by(&caller)
    };
    let callers = {
        let target = method("a/Base.run()V");
        references.references_to_method(&target)
    };
    assert_eq!(called.collect::<Vec<_>>(), vec![&method("a/Base.run()V")]);
    assert_eq!(
        callers.map(|reference| &reference.context).collect::<Vec<_>>(),
        vec![&method("a/User.go()V")]
    );
}

#[test]
fn calls_are_retargeted_to_the_declaring_class() {
    let index = JarFixture::new()
        .class("a/Base", |c| {
            c.method("run()V", ACC_PUBLIC).field("count:I", ACC_PUBLIC)
        })
        .class("a/Sub", |c| c.extends("a/Base"))
        .class("a/User", |c| {
            c.method("use(La/Sub;)V", ACC_PUBLIC)
                .calls("use(La/Sub;)V", "a/Sub.run()V")
                .accesses("use(La/Sub;)V", "a/Sub.count:I")
        })
        .build();
    let references = index.view().references();
    let caller = method("a/User.use(La/Sub;)V");

    assert_eq!(
        references.methods_referenced_by(&caller).collect::<Vec<_>>(),
        vec![&method("a/Base.run()V")]
    );
    assert_eq!(
        references.fields_referenced_by(&caller).collect::<Vec<_>>(),
        vec![&field("a/Base.count:I")]
    );
    assert_eq!(
        references
            .references_to_method(&method("a/Base.run()V"))
            .collect::<Vec<_>>(),
        vec![&EntryReference::new(
            method("a/Base.run()V"),
            caller.clone(),
            ReferenceTargetType::None
        )]
    );
    assert_eq!(
        references
            .references_to_method(&method("a/Sub.run()V"))
            .count(),
        0
    );
    assert_eq!(
        references
            .references_to_field(&field("a/Base.count:I"))
            .map(|reference| &reference.context)
            .collect::<Vec<_>>(),
        vec![&caller]
    );
}

#[test]
fn unresolvable_references_are_kept_verbatim() {
    let index = JarFixture::new()
        .class("a/User", |c| {
            c.method("use()V", ACC_PUBLIC)
                .calls("use()V", "lib/Missing.go()V")
        })
        .build();

    assert_eq!(
        index
            .view()
            .references()
            .methods_referenced_by(&method("a/User.use()V"))
            .collect::<Vec<_>>(),
        vec![&method("lib/Missing.go()V")]
    );
}

#[test]
fn overriding_calls_stay_on_the_override() {
    let index = JarFixture::new()
        .class("a/Base", |c| c.method("run()V", ACC_PUBLIC))
        .class("a/Sub", |c| c.extends("a/Base").method("run()V", ACC_PUBLIC))
        .class("a/User", |c| {
            c.method("use()V", ACC_PUBLIC)
                .calls("use()V", "a/Sub.run()V")
        })
        .build();

    assert_eq!(
        index
            .view()
            .references()
            .methods_referenced_by(&method("a/User.use()V"))
            .collect::<Vec<_>>(),
        vec![&method("a/Sub.run()V")]
    );
}

#[test]
fn static_members_are_not_inherited_through_private_declarations() {
    let index = JarFixture::new()
        .class("a/Base", |c| {
            c.method("hidden()V", ACC_PRIVATE)
                .method("util()V", ACC_PUBLIC | ACC_STATIC)
        })
        .class("a/Sub", |c| c.extends("a/Base"))
        .class("a/User", |c| {
            c.method("use()V", ACC_PUBLIC)
                .calls("use()V", "a/Sub.hidden()V")
                .calls("use()V", "a/Sub.util()V")
        })
        .build();

    let called: Vec<_> = index
        .view()
        .references()
        .methods_referenced_by(&method("a/User.use()V"))
        .cloned()
        .collect();
    // Private members are invisible to subclasses; statics resolve like any other member.
    assert_eq!(called, vec![method("a/Base.util()V"), method("a/Sub.hidden()V")]);
}

#[test]
fn constructor_calls_reference_their_class() {
    let index = JarFixture::new()
        .class("a/Thing", |c| c.method("<init>()V", ACC_PUBLIC))
        .class("a/Factory", |c| {
            c.method("make()La/Thing;", ACC_PUBLIC | ACC_STATIC)
                .calls_on("make()La/Thing;", "a/Thing.<init>()V", ReferenceTargetType::Uninitialized)
        })
        .build();

    let references: Vec<_> = index
        .view()
        .references()
        .references_to_class(&class("a/Thing"))
        .cloned()
        .collect();
    assert_eq!(
        references,
        vec![EntryReference::new(
            class("a/Thing"),
            method("a/Factory.make()La/Thing;"),
            ReferenceTargetType::Uninitialized
        )]
    );
}

#[test]
fn explicit_class_uses_are_recorded() {
    let index = JarFixture::new()
        .class("a/Thing", |c| c)
        .class("a/User", |c| {
            c.method("check(Ljava/lang/Object;)Z", ACC_PUBLIC)
                .uses_class("check(Ljava/lang/Object;)Z", "a/Thing")
        })
        .build();

    let contexts: Vec<_> = index
        .view()
        .references()
        .references_to_class(&class("a/Thing"))
        .map(|reference| reference.context.clone())
        .collect();
    assert_eq!(contexts, vec![method("a/User.check(Ljava/lang/Object;)Z")]);
}

#[test]
fn member_types_reference_classes() {
    let index = JarFixture::new()
        .class("a/Thing", |c| c)
        .class("a/Holder", |c| {
            c.field("things:[La/Thing;", ACC_PUBLIC)
                .method("get(I)La/Thing;", ACC_PUBLIC)
        })
        .build();
    let references = index.view().references();

    assert_eq!(
        references
            .field_type_references_to_class(&class("a/Thing"))
            .map(|reference| &reference.context)
            .collect::<Vec<_>>(),
        vec![&field("a/Holder.things:[La/Thing;")]
    );
    assert_eq!(
        references
            .method_type_references_to_class(&class("a/Thing"))
            .map(|reference| &reference.context)
            .collect::<Vec<_>>(),
        vec![&method("a/Holder.get(I)La/Thing;")]
    );
}

#[test]
fn lambdas_reference_their_implementation_and_descriptors() {
    let lambda = Lambda {
        invoked_name: "apply".to_string(),
        invoked_type: desc("()La/Fn;"),
        sam_method_type: desc("(Ljava/lang/Object;)Ljava/lang/Object;"),
        implementation: LambdaTarget::Method(method("a/User.lambda$run$0(La/Arg;)La/Ret;")),
        instantiated_method_type: desc("(La/Arg;)La/Ret;"),
    };
    let index = JarFixture::new()
        .class("a/User", |c| {
            c.method("run()V", ACC_PUBLIC)
                .method(
                    "lambda$run$0(La/Arg;)La/Ret;",
                    ACC_PRIVATE | ACC_STATIC | ACC_SYNTHETIC,
                )
                .lambda("run()V", lambda)
        })
        .build();
    let references = index.view().references();
    let run = method("a/User.run()V");

    assert_eq!(
        references.methods_referenced_by(&run).collect::<Vec<_>>(),
        vec![&method("a/User.lambda$run$0(La/Arg;)La/Ret;")]
    );
    for used in ["a/Fn", "a/Arg", "a/Ret"] {
        assert!(
            references
                .method_type_references_to_class(&class(used))
                .any(|reference| reference.context == run),
            "{used} should be referenced from the call site"
        );
    }
}
