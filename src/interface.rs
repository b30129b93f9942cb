use crate::core::{Node, Result, Row, Value};
use std::sync::Arc;

/// Single-table accessor contract, one implementation per entity.
///
/// This trait is the engine's only window onto the store. Implementations
/// may be relational, remote, or in-memory; the engine never assumes more
/// than the contract below. Use [`crate::mem::MemStore`] for tests and
/// simple apps, or the [`crate::sql`] layer to wrap a real SQL backend.
pub trait EntityAccess: Send + Sync {
    /// Fetch one row by id. `Ok(None)` is a normal outcome, not an error.
    fn read(&self, id: &Value) -> Result<Option<Row>>;

    /// Insert a row, returning it augmented with the generated id.
    fn insert(&self, row: Row) -> Result<Row>;

    /// Update an existing row. Fails with a precondition violation if the
    /// id field is missing from `row`.
    fn update(&self, row: Row) -> Result<Row>;

    /// Delete one row by id, returning the number of rows removed (0 or 1).
    fn delete(&self, id: &Value) -> Result<usize>;
}

/// Fetch the rows currently linked to an owner id — by foreign key for
/// to-many relations, or by joining through the link table for linked
/// relations (join results must not carry the link table's own key columns).
pub type QueryFn = Arc<dyn Fn(&Value) -> Result<Vec<Row>> + Send + Sync>;

/// Replace all link rows for an owner id: remove every existing link, then
/// insert exactly one link row per child. Full replacement, not a diff.
pub type LinkFn = Arc<dyn Fn(&Value, &[Row]) -> Result<()> + Send + Sync>;

/// Decide whether a node already has a corresponding store record, given
/// the entity's id column.
pub type PersistedFn = Arc<dyn Fn(&str, &Node) -> bool + Send + Sync>;

/// Default persisted predicate: the id-column field is present on the node.
pub fn default_persisted() -> PersistedFn {
    Arc::new(|id_column, node| node.id(id_column).is_some())
}

/// Minimal synchronous SQL execution contract for the [`crate::sql`]
/// convenience layer.
///
/// Statements use `?` positional placeholders; `params` are bound in order.
/// Wrap a real driver (Postgres, MySQL, SQLite) to implement this trait for
/// production use.
pub trait SqlExecutor: Send + Sync {
    /// Execute a statement expected to return rows (SELECT).
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a statement that modifies data, returning the affected count.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Execute an INSERT and return the generated id.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<Value>;
}
