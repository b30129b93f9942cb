//! SQLite adapter for the templated accessor layer.

use crate::core::{DbError, Result, Row, Value};
use crate::interface::SqlExecutor;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};
use std::sync::Mutex;

/// [`SqlExecutor`] over a `rusqlite::Connection`.
///
/// The connection sits behind a mutex because accessors are shared
/// (`Send + Sync`) while the engine itself runs strictly synchronously;
/// there is never lock contention within one cascade.
///
/// Booleans are stored as integers, SQLite's own convention; they come
/// back as `Value::Integer`.
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

fn to_sql_value(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Float(f) => rusqlite::types::Value::Real(*f),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Boolean(b) => rusqlite::types::Value::Integer(i64::from(*b)),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Integer(i)),
        ValueRef::Real(f) => Ok(Value::Float(f)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Value::Text(s.to_string()))
            .map_err(|e| DbError::TypeMismatch(format!("non-UTF-8 text column: {}", e))),
        ValueRef::Blob(_) => Err(DbError::TypeMismatch(
            "BLOB columns are not representable as store values".to_string(),
        )),
    }
}

fn store_err(err: rusqlite::Error) -> DbError {
    DbError::StoreError(err.to_string())
}

impl SqlExecutor for SqliteExecutor {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(sql).map_err(store_err)?;
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();

        let bound = params.iter().map(to_sql_value);
        let mut rows = stmt.query(params_from_iter(bound)).map_err(store_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(store_err)? {
            let mut record = Row::new();
            for (i, column) in columns.iter().enumerate() {
                let value = row.get_ref(i).map_err(store_err)?;
                record.insert(column.clone(), from_sql_value(value)?);
            }
            out.push(record);
        }
        Ok(out)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let conn = self.conn.lock()?;
        let bound = params.iter().map(to_sql_value);
        conn.execute(sql, params_from_iter(bound)).map_err(store_err)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<Value> {
        let conn = self.conn.lock()?;
        let bound = params.iter().map(to_sql_value);
        conn.execute(sql, params_from_iter(bound)).map_err(store_err)?;
        Ok(Value::Integer(conn.last_insert_rowid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityConfig, RelationConfig, RelationModel};
    use crate::sql::{SqlAccess, query_by_fk};
    use crate::{load, save};
    use crate::core::Node;
    use std::sync::Arc;

    fn executor() -> Arc<SqliteExecutor> {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE project (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE task (id INTEGER PRIMARY KEY, desc TEXT, project_id INTEGER);",
        )
        .unwrap();
        Arc::new(SqliteExecutor::new(conn))
    }

    fn model(executor: Arc<SqliteExecutor>) -> RelationModel {
        let ex: Arc<dyn SqlExecutor> = executor;
        RelationModel::builder()
            .entity(
                EntityConfig::new("project", Arc::new(SqlAccess::new(ex.clone(), "project").unwrap()))
                    .relation(
                        RelationConfig::to_many(
                            "tasks",
                            "task",
                            "project_id",
                            query_by_fk(ex.clone(), "task", "project_id").unwrap(),
                        )
                        .owned(true),
                    ),
            )
            .entity(EntityConfig::new("task", Arc::new(SqlAccess::new(ex, "task").unwrap())))
            .build()
            .unwrap()
    }

    #[test]
    fn save_and_load_against_sqlite() {
        let executor = executor();
        let model = model(executor);

        let tree = Node::new("project")
            .with_value("name", "X")
            .with_many("tasks", vec![
                Node::new("task").with_value("desc", "a"),
                Node::new("task").with_value("desc", "b"),
            ]);

        let saved = save(&model, "project", tree).unwrap();
        let root_id = saved.id("id").unwrap().clone();

        let loaded = load(&model, "project", &root_id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.many("tasks").unwrap().len(), 2);
    }
}
