use std::any::Any;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use remap_config::IndexConfig;
use remap_entry::{Entry, MethodDefEntry, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC};
use remap_index::{
    IndexError, IndexScope, IndexView, JarIndex, JarIndexBuilder, JarIndexer, NoopProgress,
    ProgressListener, TracingProgress,
};
use remap_test_utils::{class, field, method, ClassFixture, JarFixture};

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressListener for RecordingProgress {
    fn init(&self, total: usize, title: &str) {
        self.events.lock().unwrap().push(format!("init {total} {title}"));
    }

    fn step(&self, done: usize, message: &str) {
        self.events.lock().unwrap().push(format!("step {done} {message}"));
    }
}

#[derive(Debug, Default)]
struct MethodCounter {
    methods: usize,
    classes_at_finish: Option<usize>,
}

impl JarIndexer for MethodCounter {
    fn index_method(&mut self, _method: &MethodDefEntry) {
        self.methods += 1;
    }

    fn process_index(&mut self, index: IndexView<'_>) {
        self.classes_at_finish = Some(index.entries().classes().count());
    }

    fn name(&self) -> &'static str {
        "method counter"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn two_classes() -> JarFixture {
    JarFixture::new()
        .class("a/A", |c| c.method("run()V", ACC_PUBLIC))
        .class("a/B", |c| {
            c.extends("a/A")
                .method("run()V", ACC_PUBLIC)
                .method("<init>()V", ACC_PUBLIC)
        })
}

#[test]
fn progress_reports_every_phase_in_order() {
    let progress = RecordingProgress::default();
    let builder = JarIndexBuilder::new(IndexScope::Main, IndexConfig::default())
        .with_indexer(Box::new(MethodCounter::default()));
    builder
        .index_all(two_classes().classes(), &progress)
        .unwrap()
        .finish(&progress)
        .unwrap();

    assert_eq!(
        progress.events(),
        vec![
            "init 4 Indexing jar",
            "step 1 Indexing entries",
            "step 2 Indexing references",
            "step 3 Indexing methods",
            "step 4 Processing: references",
            "step 4 Processing: bridges",
            "step 4 Processing: method counter",
            "step 4 Processing: done",
        ]
    );
}

#[test]
fn registered_indexers_see_every_fact_and_the_finished_index() {
    let index = JarIndexBuilder::new(IndexScope::Main, IndexConfig::default())
        .with_indexer(Box::new(MethodCounter::default()))
        .index_all(two_classes().classes(), &NoopProgress)
        .unwrap()
        .finish(&NoopProgress)
        .unwrap();

    let counter = index.indexer::<MethodCounter>().unwrap();
    assert_eq!(counter.methods, 3);
    assert_eq!(counter.classes_at_finish, Some(2));
    assert!(index.indexer::<remap_index::ReferenceIndex>().is_some());
}

#[test]
fn cancelled_builds_return_no_index() {
    let progress = TracingProgress::new();
    progress.cancel();

    let err = JarIndex::build(
        IndexScope::Main,
        &IndexConfig::default(),
        two_classes().classes(),
        &progress,
    )
    .unwrap_err();
    assert_eq!(err, IndexError::Cancelled);
}

#[test]
fn malformed_class_aborts_the_build() {
    let jar = JarFixture::new()
        .class("a/Fine", |c| c.field("x:I", ACC_PUBLIC))
        .class("a/Broken", |c| c.field("x:I", ACC_PUBLIC).field("x:I", 0));

    let err = JarIndex::build(
        IndexScope::Main,
        &IndexConfig::default(),
        jar.classes(),
        &NoopProgress,
    )
    .unwrap_err();
    match err {
        IndexError::MalformedClass { class: broken, reason } => {
            assert_eq!(broken, class("a/Broken"));
            assert!(reason.contains("duplicate field"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn foreign_callers_are_rejected() {
    let mut facts = ClassFixture::new("a/A")
        .method("run()V", ACC_PUBLIC)
        .calls("run()V", "a/B.go()V")
        .into_facts();
    facts.class.entry = class("a/Other");
    facts.methods.clear();

    let mut builder = JarIndexBuilder::new(IndexScope::Main, IndexConfig::default());
    assert!(matches!(
        builder.index_class(&facts),
        Err(IndexError::MalformedClass { .. })
    ));
}

#[test]
fn members_are_declared_with_their_access() {
    let index = JarFixture::new()
        .class("a/A", |c| {
            c.field("count:I", ACC_PUBLIC | ACC_STATIC)
                .method("get()I", ACC_PUBLIC)
                .method("access$000(La/A;)I", ACC_STATIC | ACC_SYNTHETIC)
        })
        .build();
    let entries = index.view().entries();

    assert!(entries.has_class(&class("a/A")));
    assert!(entries.has_field(&field("a/A.count:I")));
    assert!(entries
        .field_access(&field("a/A.count:I"))
        .is_some_and(|access| access.is_static()));
    assert!(entries
        .method_access(&method("a/A.access$000(La/A;)I"))
        .is_some_and(|access| access.is_synthetic()));
    assert!(!entries.has_method(&method("a/A.missing()V")));
    assert_eq!(index.view().inheritance().parents(&class("a/A")), &[class("java/lang/Object")]);
}

#[test]
fn children_follow_declaration_order() {
    let index = JarFixture::new()
        .class("a/Outer", |c| {
            c.field("x:I", 0)
                .method("<clinit>()V", ACC_STATIC)
                .method("run()V", ACC_PUBLIC)
        })
        .class("a/Outer$Inner", |c| c)
        .class("a/Outer$Hidden", |c| c.access(ACC_SYNTHETIC))
        .build();

    assert_eq!(
        index.view().children_of(&class("a/Outer")),
        &[
            Entry::Field(field("a/Outer.x:I")),
            Entry::Method(method("a/Outer.run()V")),
            Entry::Class(class("a/Outer$Inner")),
        ]
    );
    assert!(index.view().children_of(&class("a/Outer$Inner")).is_empty());
}

#[test]
fn enclosing_methods_are_recorded() {
    let index = JarFixture::new()
        .class("a/Outer", |c| c.method("run()V", ACC_PUBLIC))
        .class("a/Outer$1", |c| c.enclosed_in("a/Outer", Some(("run", "()V"))))
        .class("a/Outer$2", |c| c.enclosed_in("a/Outer", None))
        .build();
    let enclosing = index.view().enclosing();

    let data = enclosing.enclosing_method(&class("a/Outer$1")).unwrap();
    assert_eq!(data.method(), Some(method("a/Outer.run()V")));
    let data = enclosing.enclosing_method(&class("a/Outer$2")).unwrap();
    assert_eq!(data.method(), None);
    assert!(!enclosing.has_enclosing_method(&class("a/Outer")));
}

#[test]
fn jre_classes_are_declared_when_asked_to() {
    let jar = JarFixture::new().with_object().class("a/A", |c| c);

    let skipped = jar.build();
    assert!(!skipped.view().entries().has_class(&class("java/lang/Object")));
    assert!(skipped.view().is_indexed("java/lang/Object"));

    let declared = jar.build_with(&remap_test_utils::config_with_jre());
    assert!(declared.view().entries().has_class(&class("java/lang/Object")));
    assert_eq!(
        declared.view().inheritance().children(&class("java/lang/Object")),
        &[class("a/A")]
    );
}

#[test]
fn indexes_are_shareable_across_threads() {
    let index = std::sync::Arc::new(two_classes().build());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = index.clone();
            std::thread::spawn(move || index.view().entries().classes().count())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
