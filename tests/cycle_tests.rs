mod common;

use aggrel::prelude::*;
use common::init_logging;

/// Department —to-many→ Employee over `department_id`, and Employee
/// —to-one→ Department over the same column: a mutual cycle.
fn mutual_model(store: &MemStore) -> RelationModel {
    RelationModel::builder()
        .entity(
            EntityConfig::new("department", store.accessor("department")).relation(
                RelationConfig::to_many(
                    "staff",
                    "employee",
                    "department_id",
                    store.query_by_fk("employee", "department_id"),
                )
                .owned(true),
            ),
        )
        .entity(
            EntityConfig::new("employee", store.accessor("employee")).relation(
                RelationConfig::to_one("department", "department", "department_id"),
            ),
        )
        .build()
        .unwrap()
}

#[test]
fn mutual_cycle_terminates_on_load() -> Result<()> {
    init_logging();
    let store = MemStore::new();
    let model = mutual_model(&store);

    let saved = model.save(
        "department",
        Node::new("department")
            .with_value("name", "lab")
            .with_many("staff", vec![Node::new("employee").with_value("name", "Ada")]),
    )?;

    // Down the to-many arc: staff load without a back-reference.
    let dept = model.load("department", saved.id("id").unwrap())?.unwrap();
    let staff = dept.many("staff").unwrap();
    assert_eq!(staff.len(), 1);
    assert!(staff[0].one("department").is_none());

    // Up the to-one arc: the department embeds, its staff list omitted.
    let ada = model.load("employee", &Value::Integer(1))?.unwrap();
    let back = ada.one("department").unwrap();
    assert_eq!(back.value("name"), Some(&Value::Text("lab".into())));
    assert!(!back.contains("staff"));
    Ok(())
}

#[test]
fn mutual_cycle_terminates_on_save_and_delete() -> Result<()> {
    init_logging();
    let store = MemStore::new();
    let model = mutual_model(&store);

    let saved = model.save(
        "department",
        Node::new("department")
            .with_value("name", "lab")
            .with_many("staff", vec![
                Node::new("employee").with_value("name", "Ada"),
                Node::new("employee").with_value("name", "Grace"),
            ]),
    )?;
    assert_eq!(store.row_count("employee"), 2);

    let dept = model.load("department", saved.id("id").unwrap())?.unwrap();
    assert_eq!(model.delete("department", &dept)?, 3);
    assert_eq!(store.row_count("department"), 0);
    assert_eq!(store.row_count("employee"), 0);
    Ok(())
}

/// A relation whose target is the entity itself is inert: the engine
/// narrows the current entity away before dispatching its relations, so
/// the edge is a no-op at every level rather than an infinite descent.
#[test]
fn self_referential_relations_are_inert() -> Result<()> {
    init_logging();
    let store = MemStore::new();
    let model = RelationModel::builder()
        .entity(
            EntityConfig::new("category", store.accessor("category")).relation(
                RelationConfig::to_many(
                    "children",
                    "category",
                    "parent_id",
                    store.query_by_fk("category", "parent_id"),
                )
                .owned(true),
            ),
        )
        .build()
        .unwrap();

    let saved = model.save(
        "category",
        Node::new("category")
            .with_value("name", "root")
            .with_many("children", vec![Node::new("category").with_value("name", "leaf")]),
    )?;

    // Only the root row was written; the edge never fired.
    assert_eq!(store.row_count("category"), 1);

    let loaded = model.load("category", saved.id("id").unwrap())?.unwrap();
    assert!(!loaded.contains("children"));
    Ok(())
}
