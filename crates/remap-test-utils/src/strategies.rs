//! `proptest` strategies producing random but well-formed class sets.

use std::collections::BTreeSet;

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;
use remap_entry::{ACC_BRIDGE, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC};

use crate::{ClassFixture, JarFixture};

const METHOD_NAMES: [&str; 3] = ["a", "b", "c"];
const RETURN_TYPES: [&str; 3] = ["Ljava/lang/Object;", "Ljava/lang/String;", "V"];

#[derive(Debug, Clone)]
struct MethodShape {
    name: usize,
    ret: usize,
    synthetic: bool,
    bridge: bool,
    is_static: bool,
}

#[derive(Debug, Clone)]
struct CallShape {
    caller: Index,
    class: Index,
    name: usize,
    ret: usize,
}

#[derive(Debug, Clone)]
struct ClassShape {
    parent: Option<Index>,
    interfaces: Vec<Index>,
    methods: Vec<MethodShape>,
    calls: Vec<CallShape>,
}

fn method_shape() -> impl Strategy<Value = MethodShape> {
    (0..METHOD_NAMES.len(), 0..RETURN_TYPES.len(), any::<bool>(), any::<bool>(), any::<bool>())
        .prop_map(|(name, ret, synthetic, bridge, is_static)| MethodShape {
            name,
            ret,
            synthetic,
            bridge,
            is_static,
        })
}

fn call_shape() -> impl Strategy<Value = CallShape> {
    (any::<Index>(), any::<Index>(), 0..METHOD_NAMES.len(), 0..RETURN_TYPES.len())
        .prop_map(|(caller, class, name, ret)| CallShape {
            caller,
            class,
            name,
            ret,
        })
}

fn class_shape() -> impl Strategy<Value = ClassShape> {
    (
        proptest::option::of(any::<Index>()),
        vec(any::<Index>(), 0..2),
        vec(method_shape(), 0..4),
        vec(call_shape(), 0..3),
    )
        .prop_map(|(parent, interfaces, methods, calls)| ClassShape {
            parent,
            interfaces,
            methods,
            calls,
        })
}

fn method_member(name: usize, ret: usize) -> String {
    format!("{}(){}", METHOD_NAMES[name], RETURN_TYPES[ret])
}

fn build_jar(prefix: &str, external: &[String], shapes: Vec<ClassShape>) -> JarFixture {
    let mut jar = JarFixture::new();
    let mut pool: Vec<String> = external.to_vec();

    for (i, shape) in shapes.into_iter().enumerate() {
        let name = format!("{prefix}{i}");
        let mut class = ClassFixture::new(&name);

        // Only classes generated earlier can be supertypes, so hierarchies stay acyclic.
        if !pool.is_empty() {
            if let Some(parent) = shape.parent {
                class = class.extends(parent.get::<String>(&pool).as_str());
            }
            for interface in &shape.interfaces {
                class = class.implements(interface.get::<String>(&pool).as_str());
            }
        }

        let mut declared = Vec::new();
        let mut seen = BTreeSet::new();
        for method in &shape.methods {
            if !seen.insert((method.name, method.ret)) {
                continue;
            }
            let mut access = ACC_PUBLIC;
            if method.synthetic {
                access |= ACC_SYNTHETIC;
            }
            if method.bridge {
                access |= ACC_BRIDGE;
            }
            if method.is_static {
                access |= ACC_STATIC;
            }
            let member = method_member(method.name, method.ret);
            class = class.method(&member, access);
            declared.push(member);
        }

        if !declared.is_empty() {
            let mut targets = pool.clone();
            targets.push(name.clone());
            for call in &shape.calls {
                let caller = call.caller.get::<String>(&declared).as_str();
                let owner = call.class.get::<String>(&targets);
                let target = format!("{owner}.{}", method_member(call.name, call.ret));
                class = class.calls(caller, &target);
            }
        }

        jar.push(class);
        pool.push(name);
    }

    jar
}

fn jar(prefix: &'static str, external: Vec<String>) -> impl Strategy<Value = JarFixture> {
    vec(class_shape(), 0..6).prop_map(move |shapes| build_jar(prefix, &external, shapes))
}

/// A main class set over a library class set with disjoint class names.
///
/// Main classes may extend and call library classes, never the other way around.
pub fn main_over_libraries() -> impl Strategy<Value = (JarFixture, JarFixture)> {
    jar("lib/L", Vec::new()).prop_flat_map(|libraries| {
        let names: Vec<String> = libraries
            .classes()
            .iter()
            .map(|facts| facts.class.entry.full_name().to_string())
            .collect();
        jar("main/M", names).prop_map(move |main| (main, libraries.clone()))
    })
}
