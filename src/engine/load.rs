use crate::core::{Node, Result, Value};
use crate::model::{EntityConfig, RelationKind, RelationModel};
use log::{debug, trace};

/// Load the aggregate rooted at `id`, following every relation the model
/// still carries.
///
/// Read-only and repeatable: the result depends only on current store state
/// and the supplied (possibly narrowed) model. A missing root is `Ok(None)`,
/// a normal outcome.
pub fn load(model: &RelationModel, entity: &str, id: &Value) -> Result<Option<Node>> {
    let config = model.entity(entity)?;
    debug!("load: entity={} id={}", entity, id);

    let Some(row) = config.access().read(id)? else {
        return Ok(None);
    };

    let node = Node::from_row(entity, row);
    hydrate(model, config, node).map(Some)
}

// Follow the entity's relations on an already-read row. The model is
// narrowed by the current entity before every descent, which is what
// terminates cyclic relation graphs.
fn hydrate(model: &RelationModel, config: &EntityConfig, mut node: Node) -> Result<Node> {
    let narrowed = model.without(&[config.name()]);

    for relation in config.relations().values() {
        if !narrowed.contains(relation.target()) {
            trace!(
                "load: relation '{}' skipped, target '{}' narrowed away",
                relation.name(),
                relation.target()
            );
            continue;
        }

        match relation.kind() {
            RelationKind::ToOne { fk_column } => {
                let fk = match node.value(fk_column) {
                    Some(v) if !v.is_null() => v.clone(),
                    _ => continue,
                };
                match load(&narrowed, relation.target(), &fk)? {
                    Some(child) => node.set_one(relation.name(), child),
                    None => {
                        // Dangling reference: present the node as if the
                        // relation did not exist.
                        node.remove(relation.name());
                        node.remove(fk_column);
                    }
                }
            }
            RelationKind::ToMany { fk_column, query } => {
                let children =
                    hydrate_dependants(&narrowed, config, &node, relation.target(), query)?;
                let children = children
                    .into_iter()
                    .map(|mut child| {
                        // The owner's id is implied by the tree position;
                        // saved trees carry it the same way.
                        child.remove(fk_column);
                        child
                    })
                    .collect();
                node.set_many(relation.name(), children);
            }
            RelationKind::ToManyLinked { query, .. } => {
                let children =
                    hydrate_dependants(&narrowed, config, &node, relation.target(), query)?;
                node.set_many(relation.name(), children);
            }
        }
    }

    Ok(node)
}

fn hydrate_dependants(
    narrowed: &RelationModel,
    config: &EntityConfig,
    node: &Node,
    target: &str,
    query: &crate::interface::QueryFn,
) -> Result<Vec<Node>> {
    let target_config = narrowed.entity(target)?;
    let self_id = super::required_id(node, config.name(), config.id_column_name())?;

    let rows = query(&self_id)?;
    let mut children = Vec::with_capacity(rows.len());
    for row in rows {
        let child = Node::from_row(target, row);
        children.push(hydrate(narrowed, target_config, child)?);
    }
    Ok(children)
}
