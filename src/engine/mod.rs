//! The recursive traversal engines: load, save, delete.
//!
//! Each engine narrows the model by the entity it is currently processing
//! before descending into a relation, so traversal depth is bounded by the
//! narrowing chain and cyclic relation graphs terminate by construction.
//! Execution is strictly synchronous and single-threaded per call.

mod delete;
mod load;
mod save;

pub use delete::{delete, delete_by_id};
pub use load::load;
pub use save::save;

use crate::core::{DbError, Node, Result, Value};
use crate::model::RelationModel;

impl RelationModel {
    /// See [`load`].
    pub fn load(&self, entity: &str, id: &Value) -> Result<Option<Node>> {
        load(self, entity, id)
    }

    /// See [`save`].
    pub fn save(&self, entity: &str, node: Node) -> Result<Node> {
        save(self, entity, node)
    }

    /// See [`delete`].
    pub fn delete(&self, entity: &str, node: &Node) -> Result<usize> {
        delete(self, entity, node)
    }

    /// See [`delete_by_id`].
    pub fn delete_by_id(&self, entity: &str, id: &Value) -> Result<usize> {
        delete_by_id(self, entity, id)
    }
}

// A node's non-null id, required by query functions and delete accessors.
pub(crate) fn required_id(node: &Node, entity: &str, id_column: &str) -> Result<Value> {
    node.id(id_column)
        .filter(|v| !v.is_null())
        .cloned()
        .ok_or_else(|| {
            DbError::PreconditionViolation(format!(
                "node for entity '{}' is missing id column '{}'",
                entity, id_column
            ))
        })
}
