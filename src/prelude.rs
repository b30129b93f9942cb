//! Curated imports for typical use.
//!
//! ```
//! use aggrel::prelude::*;
//! ```

pub use crate::core::{DbError, Field, Node, Result, Row, Value};
pub use crate::engine::{delete, delete_by_id, load, save};
pub use crate::interface::{
    EntityAccess, LinkFn, PersistedFn, QueryFn, SqlExecutor, default_persisted,
};
pub use crate::mem::MemStore;
pub use crate::model::{EntityConfig, ModelBuilder, RelationConfig, RelationKind, RelationModel};
