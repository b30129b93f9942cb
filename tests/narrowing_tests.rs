mod common;

use aggrel::prelude::*;
use common::{CountingAccess, counting_query, init_logging, task};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountedFixture {
    store: MemStore,
    model: RelationModel,
    task_queries: Arc<AtomicUsize>,
    task_access: Arc<CountingAccess>,
}

fn counted_project_task_model() -> CountedFixture {
    let store = MemStore::new();
    let (query, task_queries) = counting_query(store.query_by_fk("task", "project_id"));
    let task_access = CountingAccess::wrap(store.accessor("task"));
    let shared: Arc<dyn EntityAccess> = task_access.clone();
    let model = RelationModel::builder()
        .entity(
            EntityConfig::new("project", store.accessor("project")).relation(
                RelationConfig::to_many("tasks", "task", "project_id", query).owned(true),
            ),
        )
        .entity(EntityConfig::new("task", shared))
        .build()
        .unwrap();
    CountedFixture {
        store,
        model,
        task_queries,
        task_access,
    }
}

#[test]
fn load_with_a_removed_relation_queries_nothing() -> Result<()> {
    init_logging();
    let f = counted_project_task_model();

    let saved = f.model.save(
        "project",
        Node::new("project")
            .with_value("name", "X")
            .with_many("tasks", vec![task("a")]),
    )?;
    let baseline = f.task_queries.load(Ordering::SeqCst);
    let access_baseline = f.task_access.ops.load(Ordering::SeqCst);

    let narrowed = f.model.without_relations("project", &["tasks"]);
    let loaded = narrowed.load("project", saved.id("id").unwrap())?.unwrap();

    // Nothing reachable only through the removed relation was touched.
    assert_eq!(f.task_queries.load(Ordering::SeqCst), baseline);
    assert_eq!(f.task_access.ops.load(Ordering::SeqCst), access_baseline);
    // Omitted entirely, not set to empty.
    assert!(!loaded.contains("tasks"));
    Ok(())
}

#[test]
fn load_with_a_removed_entity_queries_nothing() -> Result<()> {
    init_logging();
    let f = counted_project_task_model();

    let saved = f.model.save(
        "project",
        Node::new("project")
            .with_value("name", "X")
            .with_many("tasks", vec![task("a")]),
    )?;
    let baseline = f.task_queries.load(Ordering::SeqCst);

    let narrowed = f.model.without(&["task"]);
    let loaded = narrowed.load("project", saved.id("id").unwrap())?.unwrap();

    assert_eq!(f.task_queries.load(Ordering::SeqCst), baseline);
    assert!(!loaded.contains("tasks"));
    Ok(())
}

#[test]
fn save_with_a_removed_relation_reconciles_nothing() -> Result<()> {
    init_logging();
    let f = counted_project_task_model();

    let saved = f.model.save(
        "project",
        Node::new("project")
            .with_value("name", "X")
            .with_many("tasks", vec![task("a"), task("b")]),
    )?;
    let baseline = f.task_queries.load(Ordering::SeqCst);

    // Re-save with an emptied list under a narrowed model: no orphan pass,
    // no deletions, no query.
    let access_baseline = f.task_access.ops.load(Ordering::SeqCst);
    let narrowed = f.model.without(&["task"]);
    let mut emptied = saved.clone();
    emptied.set_many("tasks", Vec::new());
    narrowed.save("project", emptied)?;

    assert_eq!(f.task_queries.load(Ordering::SeqCst), baseline);
    assert_eq!(f.task_access.ops.load(Ordering::SeqCst), access_baseline);
    assert_eq!(f.store.row_count("task"), 2);
    Ok(())
}

#[test]
fn only_scopes_an_operation_to_named_relations() -> Result<()> {
    init_logging();
    let f = counted_project_task_model();

    let scoped = f.model.only(&[("project", &[]), ("task", &[])]);
    scoped.save(
        "project",
        Node::new("project")
            .with_value("name", "X")
            .with_many("tasks", vec![task("a")]),
    )?;

    // The tasks relation was dropped from the scoped model: nothing saved.
    assert_eq!(f.store.row_count("project"), 1);
    assert_eq!(f.store.row_count("task"), 0);
    assert_eq!(f.task_queries.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn narrowing_never_mutates_the_source_model() -> Result<()> {
    init_logging();
    let f = counted_project_task_model();

    let _ = f.model.without(&["task"]);
    let _ = f.model.without_relations("project", &["tasks"]);
    let _ = f.model.only(&[("project", &[])]);

    let saved = f.model.save(
        "project",
        Node::new("project")
            .with_value("name", "X")
            .with_many("tasks", vec![task("a")]),
    )?;
    assert_eq!(f.store.row_count("task"), 1);
    let loaded = f.model.load("project", saved.id("id").unwrap())?.unwrap();
    assert_eq!(loaded.many("tasks").unwrap().len(), 1);
    Ok(())
}
