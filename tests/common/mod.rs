#![allow(dead_code)]

use aggrel::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Fixture {
    pub store: MemStore,
    pub model: RelationModel,
}

/// Project —to-many→ Task over `project_id`.
pub fn project_task_model(owned: bool) -> Fixture {
    let store = MemStore::new();
    let model = RelationModel::builder()
        .entity(
            EntityConfig::new("project", store.accessor("project")).relation(
                RelationConfig::to_many(
                    "tasks",
                    "task",
                    "project_id",
                    store.query_by_fk("task", "project_id"),
                )
                .owned(owned),
            ),
        )
        .entity(EntityConfig::new("task", store.accessor("task")))
        .build()
        .unwrap();
    Fixture { store, model }
}

/// Project with all three relation kinds:
/// owner (to-one Person), tasks (owned to-many Task), tags (linked Tag
/// through `project_tag`).
pub fn crm_model(owner_owned: bool, tags_owned: bool) -> Fixture {
    let store = MemStore::new();
    let model = RelationModel::builder()
        .entity(
            EntityConfig::new("project", store.accessor("project"))
                .relation(
                    RelationConfig::to_one("owner", "person", "owner_id").owned(owner_owned),
                )
                .relation(
                    RelationConfig::to_many(
                        "tasks",
                        "task",
                        "project_id",
                        store.query_by_fk("task", "project_id"),
                    )
                    .owned(true),
                )
                .relation(
                    RelationConfig::to_many_linked(
                        "tags",
                        "tag",
                        store.query_by_join("project_tag", "tag"),
                        store.replace_links("project_tag", "id"),
                    )
                    .owned(tags_owned),
                ),
        )
        .entity(EntityConfig::new("person", store.accessor("person")))
        .entity(EntityConfig::new("task", store.accessor("task")))
        .entity(EntityConfig::new("tag", store.accessor("tag")))
        .build()
        .unwrap();
    Fixture { store, model }
}

/// Wrap a query function, counting invocations.
pub fn counting_query(inner: QueryFn) -> (QueryFn, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let wrapped: QueryFn = Arc::new(move |id| {
        seen.fetch_add(1, Ordering::SeqCst);
        inner(id)
    });
    (wrapped, calls)
}

/// Wrap an entity accessor, counting every operation.
pub struct CountingAccess {
    inner: Arc<dyn EntityAccess>,
    pub ops: AtomicUsize,
}

impl CountingAccess {
    pub fn wrap(inner: Arc<dyn EntityAccess>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            ops: AtomicUsize::new(0),
        })
    }
}

impl EntityAccess for CountingAccess {
    fn read(&self, id: &Value) -> Result<Option<Row>> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.inner.read(id)
    }

    fn insert(&self, row: Row) -> Result<Row> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(row)
    }

    fn update(&self, row: Row) -> Result<Row> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.inner.update(row)
    }

    fn delete(&self, id: &Value) -> Result<usize> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id)
    }
}

pub fn task(desc: &str) -> Node {
    Node::new("task").with_value("desc", desc)
}

pub fn tag(label: &str) -> Node {
    Node::new("tag").with_value("label", label)
}
