mod common;

use aggrel::prelude::*;
use common::{init_logging, task};

#[test]
fn undeclared_relation_targets_fail_at_build_time() {
    init_logging();
    let store = MemStore::new();
    let err = RelationModel::builder()
        .entity(
            EntityConfig::new("project", store.accessor("project")).relation(
                RelationConfig::to_many(
                    "tasks",
                    "task",
                    "project_id",
                    store.query_by_fk("task", "project_id"),
                ),
            ),
        )
        .build()
        .unwrap_err();

    assert!(matches!(err, DbError::ConfigError(_)));
}

#[test]
fn duplicate_entities_fail_at_build_time() {
    init_logging();
    let store = MemStore::new();
    let err = RelationModel::builder()
        .entity(EntityConfig::new("project", store.accessor("project")))
        .entity(EntityConfig::new("project", store.accessor("project")))
        .build()
        .unwrap_err();

    assert!(matches!(err, DbError::ConfigError(_)));
}

#[test]
fn duplicate_relations_fail_at_build_time() {
    init_logging();
    let store = MemStore::new();
    let err = RelationModel::builder()
        .entity(
            EntityConfig::new("project", store.accessor("project"))
                .relation(RelationConfig::to_one("owner", "person", "owner_id"))
                .relation(RelationConfig::to_one("owner", "person", "lead_id")),
        )
        .entity(EntityConfig::new("person", store.accessor("person")))
        .build()
        .unwrap_err();

    assert!(matches!(err, DbError::ConfigError(_)));
}

#[test]
fn custom_id_columns_flow_through_the_cascade() -> Result<()> {
    init_logging();
    let store = MemStore::new();
    let model = RelationModel::builder()
        .id_column("pk")
        .entity(
            EntityConfig::new("project", store.accessor_with_id("project", "pk")).relation(
                RelationConfig::to_many(
                    "tasks",
                    "task",
                    "project_pk",
                    store.query_by_fk("task", "project_pk"),
                )
                .owned(true),
            ),
        )
        .entity(EntityConfig::new("task", store.accessor_with_id("task", "pk")))
        .build()?;

    let saved = model.save(
        "project",
        Node::new("project")
            .with_value("name", "X")
            .with_many("tasks", vec![task("a")]),
    )?;

    assert_eq!(saved.id("pk"), Some(&Value::Integer(1)));
    assert_eq!(saved.many("tasks").unwrap()[0].id("pk"), Some(&Value::Integer(1)));

    let loaded = model.load("project", &Value::Integer(1))?.unwrap();
    assert_eq!(loaded, saved);
    Ok(())
}

#[test]
fn per_entity_id_column_overrides_the_default() -> Result<()> {
    init_logging();
    let store = MemStore::new();
    let model = RelationModel::builder()
        .entity(
            EntityConfig::new("doc", store.accessor_with_id("doc", "doc_no")).id_column("doc_no"),
        )
        .entity(EntityConfig::new("note", store.accessor("note")))
        .build()?;

    let saved = model.save("doc", Node::new("doc").with_value("title", "t"))?;
    assert_eq!(saved.id("doc_no"), Some(&Value::Integer(1)));

    // The sibling entity still uses the model default.
    let note = model.save("note", Node::new("note").with_value("body", "b"))?;
    assert_eq!(note.id("id"), Some(&Value::Integer(1)));
    Ok(())
}

#[test]
fn custom_persisted_predicate_treats_null_ids_as_new() -> Result<()> {
    init_logging();
    let store = MemStore::new();
    let model = RelationModel::builder()
        .persisted_with(|id_column, node| {
            node.id(id_column).is_some_and(|v| !v.is_null())
        })
        .entity(EntityConfig::new("note", store.accessor("note")))
        .build()?;

    let saved = model.save(
        "note",
        Node::new("note")
            .with_value("id", Value::Null)
            .with_value("body", "b"),
    )?;

    assert_eq!(saved.id("id"), Some(&Value::Integer(1)));
    assert_eq!(store.row_count("note"), 1);
    Ok(())
}

#[test]
fn default_predicate_checks_field_presence() {
    init_logging();
    let store = MemStore::new();
    let model = RelationModel::builder()
        .entity(EntityConfig::new("note", store.accessor("note")))
        .build()
        .unwrap();

    // Present-but-null id counts as persisted, so the update reaches the
    // accessor and fails there.
    let err = model
        .save(
            "note",
            Node::new("note")
                .with_value("id", Value::Null)
                .with_value("body", "b"),
        )
        .unwrap_err();
    assert!(matches!(err, DbError::PreconditionViolation(_)));
}
