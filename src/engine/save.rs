use crate::core::{DbError, Field, Node, Result, Row, Value};
use crate::model::{EntityConfig, RelationKind, RelationModel};
use log::{debug, trace};
use std::collections::BTreeSet;

/// Persist an aggregate tree, returning it with ids populated.
///
/// Three ordered phases, a hard contract:
/// 1. prerequisites — to-one children first, their ids become foreign keys
///    on this row;
/// 2. self — insert or update the flattened row;
/// 3. dependants — to-many and linked children, which need this row's id,
///    with orphan reconciliation against the store's current state.
///
/// The engine manages no transaction: wrap the call in one scoped to the
/// accessors if atomicity is required. A failing accessor aborts the
/// remaining cascade with the statements already executed left applied.
pub fn save(model: &RelationModel, entity: &str, node: Node) -> Result<Node> {
    let config = model.entity(entity)?;
    debug!("save: entity={}", entity);

    let mut node = node;
    node.set_entity(entity);
    let narrowed = model.without(&[entity]);

    save_prerequisites(model, &narrowed, config, &mut node)?;
    save_self(model, config, &mut node)?;
    save_dependants(&narrowed, config, &mut node)?;

    Ok(node)
}

// Phase 1: to-one children. An embedded child is saved first and its id
// written into this row's foreign-key field; a dropped reference on a
// persisted row is cleared in the store (and the old target deleted when
// the relation is owned).
fn save_prerequisites(
    model: &RelationModel,
    narrowed: &RelationModel,
    config: &EntityConfig,
    node: &mut Node,
) -> Result<()> {
    for relation in config.relations().values() {
        let RelationKind::ToOne { fk_column } = relation.kind() else {
            continue;
        };
        if !narrowed.contains(relation.target()) {
            trace!("save: prerequisite '{}' narrowed away", relation.name());
            continue;
        }
        let target_config = narrowed.entity(relation.target())?;

        match node.remove(relation.name()) {
            Some(Field::One(child)) => {
                let saved = save(narrowed, relation.target(), child)?;
                let child_id = super::required_id(
                    &saved,
                    relation.target(),
                    target_config.id_column_name(),
                )?;
                node.set_value(fk_column.clone(), child_id);
                node.set_one(relation.name(), saved);
            }
            Some(other) => {
                return Err(DbError::TypeMismatch(format!(
                    "relation field '{}' on entity '{}' must hold a nested node, found {}",
                    relation.name(),
                    config.name(),
                    field_shape(&other)
                )));
            }
            None => {
                let old_fk = match node.value(fk_column) {
                    Some(v) if !v.is_null() => v.clone(),
                    _ => continue,
                };
                if !model.is_persisted(config, node) {
                    // A new row inserting an explicit foreign key links to
                    // an existing target without embedding it.
                    continue;
                }

                let self_id =
                    super::required_id(node, config.name(), config.id_column_name())?;
                let mut patch = Row::new();
                patch.insert(config.id_column_name().to_string(), self_id);
                patch.insert(fk_column.clone(), Value::Null);
                config.access().update(patch)?;

                if relation.is_owned() {
                    trace!(
                        "save: deleting unreferenced '{}' {}",
                        relation.target(),
                        old_fk
                    );
                    super::delete_by_id(narrowed, relation.target(), &old_fk)?;
                }
                node.remove(fk_column);
            }
        }
    }
    Ok(())
}

// Phase 2: this row. Relation fields never reach the store.
fn save_self(model: &RelationModel, config: &EntityConfig, node: &mut Node) -> Result<()> {
    let persisted = model.is_persisted(config, node);

    let mut row = node.to_row();
    for name in config.relations().keys() {
        row.remove(name);
    }

    let returned = if persisted {
        config.access().update(row)?
    } else {
        config.access().insert(row)?
    };
    node.merge_row(returned);
    Ok(())
}

// Phase 3: to-many and linked children, then orphan reconciliation. The
// baseline of currently linked rows is queried before any child is saved,
// so freshly inserted children never show up as their own orphans.
fn save_dependants(
    narrowed: &RelationModel,
    config: &EntityConfig,
    node: &mut Node,
) -> Result<()> {
    for relation in config.relations().values() {
        let (query, fk_column, update_links) = match relation.kind() {
            RelationKind::ToOne { .. } => continue,
            RelationKind::ToMany { fk_column, query } => (query, Some(fk_column), None),
            RelationKind::ToManyLinked {
                query,
                update_links,
            } => (query, None, Some(update_links)),
        };
        if !narrowed.contains(relation.target()) {
            trace!("save: dependants '{}' narrowed away", relation.name());
            continue;
        }
        let target_config = narrowed.entity(relation.target())?;
        let target_id_column = target_config.id_column_name();

        let self_id = node
            .id(config.id_column_name())
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| {
                DbError::PreconditionViolation(format!(
                    "dependant phase for entity '{}' requires a persisted node with id column '{}'",
                    config.name(),
                    config.id_column_name()
                ))
            })?;

        let current = query(&self_id)?;

        let children = match node.remove(relation.name()) {
            Some(Field::Many(children)) => children,
            Some(other) => {
                return Err(DbError::TypeMismatch(format!(
                    "relation field '{}' on entity '{}' must hold a node list, found {}",
                    relation.name(),
                    config.name(),
                    field_shape(&other)
                )));
            }
            None => Vec::new(),
        };

        let mut saved_children = Vec::with_capacity(children.len());
        for mut child in children {
            if let Some(fk) = fk_column {
                child.set_value(fk.clone(), self_id.clone());
            }
            let mut saved = save(narrowed, relation.target(), child)?;
            if let Some(fk) = fk_column {
                saved.remove(fk);
            }
            saved_children.push(saved);
        }

        let saved_ids: BTreeSet<Value> = saved_children
            .iter()
            .filter_map(|child| child.id(target_id_column))
            .filter(|v| !v.is_null())
            .cloned()
            .collect();

        for row in current {
            let row_id = row
                .get(target_id_column)
                .filter(|v| !v.is_null())
                .cloned()
                .ok_or_else(|| {
                    DbError::ExecutionError(format!(
                        "dependant row of relation '{}' is missing id column '{}'",
                        relation.name(),
                        target_id_column
                    ))
                })?;
            if saved_ids.contains(&row_id) {
                continue;
            }

            trace!(
                "save: orphan {} in relation '{}' ({})",
                row_id,
                relation.name(),
                if relation.is_owned() { "delete" } else { "detach" }
            );
            if relation.is_owned() {
                let orphan = Node::from_row(relation.target(), row);
                super::delete(narrowed, relation.target(), &orphan)?;
            } else if let Some(fk) = fk_column {
                // Best-effort detach: the update's success is not
                // re-verified and never retried.
                let mut patch = Row::new();
                patch.insert(target_id_column.to_string(), row_id);
                patch.insert(fk.clone(), Value::Null);
                target_config.access().update(patch)?;
            }
            // Linked orphans need no row update: their link row simply is
            // not reinserted below.
        }

        if let Some(update_links) = update_links {
            let rows: Vec<Row> = saved_children.iter().map(Node::to_row).collect();
            update_links(&self_id, &rows)?;
        }

        node.set_many(relation.name(), saved_children);
    }
    Ok(())
}

fn field_shape(field: &Field) -> &'static str {
    match field {
        Field::Value(_) => "a scalar",
        Field::One(_) => "a nested node",
        Field::Many(_) => "a node list",
    }
}
