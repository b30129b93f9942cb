// ============================================================================
// aggrel Library
// ============================================================================

//! Persist and reconstitute nested data trees ("aggregates") as sets of
//! related records in a relational store.
//!
//! A [`model::RelationModel`] describes entities, their id columns, and the
//! typed relations between them (to-one, to-many, many-to-many through a
//! link table). Three recursive engines — [`load`], [`save`], [`delete`] —
//! walk that configuration and call per-entity accessors for every
//! single-table operation, so the same model works against any backend
//! implementing the [`interface::EntityAccess`] contract: the bundled
//! in-memory store, the templated-SQL layer, or your own.
//!
//! Ownership decides cascade semantics: owned relations delete their
//! orphans and dependants, non-owned relations only detach them. Narrowing
//! ([`model::RelationModel::only`] / [`without`](model::RelationModel::without))
//! derives restricted model copies, both to scope dangerous operations and —
//! internally, before every recursive descent — to terminate cyclic relation
//! graphs without runtime cycle detection.
//!
//! # Examples
//!
//! ```
//! use aggrel::core::Node;
//! use aggrel::mem::MemStore;
//! use aggrel::model::{EntityConfig, RelationConfig, RelationModel};
//!
//! fn main() -> aggrel::Result<()> {
//!     let store = MemStore::new();
//!     let model = RelationModel::builder()
//!         .entity(
//!             EntityConfig::new("project", store.accessor("project")).relation(
//!                 RelationConfig::to_many(
//!                     "tasks", "task", "project_id",
//!                     store.query_by_fk("task", "project_id"),
//!                 )
//!                 .owned(true),
//!             ),
//!         )
//!         .entity(EntityConfig::new("task", store.accessor("task")))
//!         .build()?;
//!
//!     // Save the whole tree: tasks are inserted with their foreign key set.
//!     let project = Node::new("project")
//!         .with_value("name", "X")
//!         .with_many("tasks", vec![
//!             Node::new("task").with_value("desc", "a"),
//!             Node::new("task").with_value("desc", "b"),
//!         ]);
//!     let saved = model.save("project", project)?;
//!     assert_eq!(store.row_count("task"), 2);
//!
//!     // Re-save with one task removed: the orphan is owned, so it is gone.
//!     let mut pruned = saved.clone();
//!     let first = saved.many("tasks").unwrap()[0].clone();
//!     pruned.set_many("tasks", vec![first]);
//!     model.save("project", pruned)?;
//!     assert_eq!(store.row_count("task"), 1);
//!
//!     // Load reconstitutes the remaining aggregate.
//!     let root_id = saved.id("id").unwrap();
//!     let loaded = model.load("project", root_id)?.unwrap();
//!     assert_eq!(loaded.many("tasks").unwrap().len(), 1);
//!
//!     // Delete cascades: one project row and one remaining task row.
//!     assert_eq!(model.delete("project", &loaded)?, 2);
//!     Ok(())
//! }
//! ```
//!
//! The engines hold no locks and manage no transactions: one save or delete
//! may issue many statements, so wrap top-level calls in a transaction
//! scoped to your accessors when atomicity is required.

pub mod core;
pub mod engine;
pub mod interface;
pub mod json;
pub mod mem;
pub mod model;
pub mod prelude;
pub mod sql;

// Re-export main types for convenience
pub use crate::core::{DbError, Field, Node, Result, Row, Value};
pub use crate::engine::{delete, delete_by_id, load, save};
pub use crate::interface::{EntityAccess, LinkFn, PersistedFn, QueryFn, SqlExecutor};
pub use crate::model::{EntityConfig, ModelBuilder, RelationConfig, RelationKind, RelationModel};
