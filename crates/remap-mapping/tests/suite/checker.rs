use std::sync::Mutex;

use pretty_assertions::assert_eq;
use remap_entry::{
    Entry, LocalVariableEntry, ACC_BRIDGE, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC,
};
use remap_index::{JarIndex, NoopProgress, ProgressListener};
use remap_mapping::{EntryMapping, EntryRemapper, EntryTree, MappingsChecker};
use remap_test_utils::{class, method, JarFixture};

fn m(spec: &str) -> Entry {
    Entry::Method(method(spec))
}

fn c(name: &str) -> Entry {
    Entry::Class(class(name))
}

fn parameter(spec: &str, index: u32) -> Entry {
    Entry::LocalVariable(LocalVariableEntry::new(method(spec), index))
}

#[derive(Default)]
struct RecordingProgress {
    total: Mutex<Option<usize>>,
    steps: Mutex<Vec<String>>,
}

impl ProgressListener for RecordingProgress {
    fn init(&self, total: usize, _title: &str) {
        *self.total.lock().unwrap() = Some(total);
    }

    fn step(&self, _done: usize, message: &str) {
        self.steps.lock().unwrap().push(message.to_string());
    }
}

fn overrides() -> JarIndex {
    JarFixture::new()
        .class("A", |c| {
            c.method("run(I)V", ACC_PUBLIC)
                .method("make(I)V", ACC_PUBLIC | ACC_STATIC)
        })
        .class("B", |c| c.extends("A").method("run(I)V", ACC_PUBLIC))
        .class("C", |c| c.extends("B").method("run(I)V", ACC_PUBLIC))
        .build()
}

fn seeded() -> EntryTree<EntryMapping> {
    EntryTree::from_iter([
        (c("Z"), EntryMapping::named("Gone")),
        (c("A"), EntryMapping::named("Base")),
        (m("A.run(I)V"), EntryMapping::named("execute")),
        (parameter("A.run(I)V", 0), EntryMapping::named("self")),
        (parameter("A.run(I)V", 1), EntryMapping::named("times")),
        (m("A.make(I)V"), EntryMapping::named("create")),
        (parameter("A.make(I)V", 0), EntryMapping::named("seed")),
        (m("B.run(I)V"), EntryMapping::named("other")),
        (m("C.run(I)V"), EntryMapping::named("third")),
        (parameter("C.run(I)V", 1), EntryMapping::named("count")),
    ])
}

#[test]
fn undeclared_and_overriding_mappings_are_dropped() {
    let index = overrides();
    let mut mappings = seeded();

    let progress = RecordingProgress::default();
    let dropped = MappingsChecker::new(index.view(), &mappings).drop_broken_mappings(&progress);

    let entries: Vec<Entry> = dropped.entries().cloned().collect();
    assert_eq!(
        entries,
        vec![
            c("Z"),
            m("B.run(I)V"),
            m("C.run(I)V"),
            parameter("A.run(I)V", 0),
            parameter("C.run(I)V", 1),
        ]
    );
    assert_eq!(
        dropped.iter().next(),
        Some((&c("Z"), Some("Gone")))
    );

    dropped.apply(&mut mappings);
    assert_eq!(mappings.len(), 5);
    assert!(mappings.contains(&parameter("A.make(I)V", 0)));
    assert!(mappings.contains(&parameter("A.run(I)V", 1)));
}

#[test]
fn parameters_are_checked_before_their_members() {
    let index = overrides();
    let mappings = seeded();

    let progress = RecordingProgress::default();
    MappingsChecker::new(index.view(), &mappings).drop_broken_mappings(&progress);

    assert_eq!(*progress.total.lock().unwrap(), Some(10));
    let steps = progress.steps.lock().unwrap();
    assert_eq!(steps.len(), 10);
    assert!(steps[..4].iter().all(|step| step.contains('#')));
    assert_eq!(&steps[8..], ["A", "Z"]);
}

#[test]
fn specialized_methods_defer_to_their_bridge() {
    let index = JarFixture::new()
        .class("B", |c| {
            c.method(
                "get()Ljava/lang/Object;",
                ACC_PUBLIC | ACC_SYNTHETIC | ACC_BRIDGE,
            )
            .method("a()Ljava/lang/String;", ACC_PUBLIC)
            .calls("get()Ljava/lang/Object;", "B.a()Ljava/lang/String;")
        })
        .build();
    let mappings = EntryTree::from_iter([
        (m("B.get()Ljava/lang/Object;"), EntryMapping::named("value")),
        (m("B.a()Ljava/lang/String;"), EntryMapping::named("value")),
    ]);

    let dropped = MappingsChecker::new(index.view(), &mappings).drop_broken_mappings(&NoopProgress);
    assert_eq!(
        dropped.entries().collect::<Vec<_>>(),
        vec![&m("B.a()Ljava/lang/String;")]
    );
}

#[test]
fn empty_mappings_survive_while_they_have_mapped_children() {
    let index = overrides();
    let mappings = EntryTree::from_iter([
        (c("A"), EntryMapping::DEFAULT),
        (m("A.run(I)V"), EntryMapping::DEFAULT),
        (parameter("A.run(I)V", 1), EntryMapping::documented("How often.")),
        (c("B"), EntryMapping::DEFAULT),
        (m("B.run(I)V"), EntryMapping::DEFAULT),
    ]);

    let dropped = MappingsChecker::new(index.view(), &mappings).drop_empty_mappings(&NoopProgress);
    assert_eq!(
        dropped.entries().cloned().collect::<Vec<_>>(),
        vec![c("B"), m("B.run(I)V")]
    );
}

#[test]
fn remapper_removes_dropped_mappings_and_reports_them() {
    let mut remapper = EntryRemapper::with_mappings(overrides(), seeded(), Vec::new());

    let dropped = remapper.drop_broken_mappings(&NoopProgress);
    assert_eq!(dropped.len(), 5);
    assert_eq!(remapper.deobf_mappings().len(), 5);

    let delta = remapper.take_mapping_delta();
    assert_eq!(delta.len(), 5);
    assert!(delta.entries().all(|entry| dropped.contains(entry)));
    assert_eq!(delta.get(&c("Z")).and_then(|change| change.new.clone()), None);

    assert!(remapper.drop_broken_mappings(&NoopProgress).is_empty());
    assert!(remapper.drop_empty_mappings(&NoopProgress).is_empty());
}
