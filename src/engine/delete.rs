use crate::core::{Node, Result, Row, Value};
use crate::model::{RelationKind, RelationModel};
use log::{debug, trace};

/// Delete a bare id: one delete-accessor call, no cascade.
///
/// Callers needing deep deletion from an id alone must load the aggregate
/// first or rely on store-level cascading constraints.
pub fn delete_by_id(model: &RelationModel, entity: &str, id: &Value) -> Result<usize> {
    let config = model.entity(entity)?;
    debug!("delete: entity={} id={} (by id, no cascade)", entity, id);
    config.access().delete(id)
}

/// Delete an aggregate node, returning the count of rows actually removed.
///
/// Three ordered phases, a hard contract: dependants lose their reference
/// to this row before it disappears, and to-one prerequisites go last
/// because this row held the only reference to them.
pub fn delete(model: &RelationModel, entity: &str, node: &Node) -> Result<usize> {
    let config = model.entity(entity)?;
    let id_column = config.id_column_name();
    let self_id = super::required_id(node, entity, id_column)?;
    debug!("delete: entity={} id={}", entity, self_id);

    let narrowed = model.without(&[entity]);
    let mut removed = 0;

    // Phase 1: dependants.
    for relation in config.relations().values() {
        match relation.kind() {
            RelationKind::ToOne { .. } => continue,
            RelationKind::ToMany { fk_column, .. } => {
                if !narrowed.contains(relation.target()) {
                    continue;
                }
                let target_config = narrowed.entity(relation.target())?;
                let children = node.many(relation.name()).unwrap_or(&[]);

                for child in children {
                    if relation.is_owned() {
                        removed += delete(&narrowed, relation.target(), child)?;
                    } else {
                        // Detach only: the child row survives with its
                        // foreign key nulled, contributing 0 to the count.
                        let child_id = super::required_id(
                            child,
                            relation.target(),
                            target_config.id_column_name(),
                        )?;
                        let mut patch = Row::new();
                        patch.insert(target_config.id_column_name().to_string(), child_id);
                        patch.insert(fk_column.clone(), Value::Null);
                        target_config.access().update(patch)?;
                    }
                }
            }
            RelationKind::ToManyLinked { update_links, .. } => {
                if !narrowed.contains(relation.target()) {
                    continue;
                }
                if relation.is_owned() {
                    for child in node.many(relation.name()).unwrap_or(&[]) {
                        removed += delete(&narrowed, relation.target(), child)?;
                    }
                }
                trace!("delete: clearing links of '{}'", relation.name());
                update_links(&self_id, &[])?;
            }
        }
    }

    // Phase 2: this row.
    removed += config.access().delete(&self_id)?;

    // Phase 3: owned to-one prerequisites.
    for relation in config.relations().values() {
        let RelationKind::ToOne { fk_column } = relation.kind() else {
            continue;
        };
        if !relation.is_owned() || !narrowed.contains(relation.target()) {
            continue;
        }

        if let Some(child) = node.one(relation.name()) {
            removed += delete(&narrowed, relation.target(), child)?;
        } else if let Some(fk) = node.value(fk_column).filter(|v| !v.is_null()) {
            removed += delete_by_id(&narrowed, relation.target(), fk)?;
        }
    }

    Ok(removed)
}
