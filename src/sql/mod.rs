//! Default accessor generation for relational backends.
//!
//! Produces values satisfying the accessor contract from templated query
//! text, generic over any [`SqlExecutor`]. The engine itself stays
//! storage-agnostic; this layer is a convenience, not a requirement.
//!
//! Table and column names are interpolated into statement text, so every
//! identifier is validated against a conservative rule before templating;
//! all data values travel as `?` placeholders.

#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::core::{DbError, Result, Row, Value};
use crate::interface::{EntityAccess, LinkFn, QueryFn, SqlExecutor};
use log::trace;
use std::sync::Arc;

// `[A-Za-z_][A-Za-z0-9_]*` — anything else never reaches statement text.
fn ensure_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::ConfigError(format!(
            "invalid SQL identifier '{}'",
            name
        )))
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Entity accessor over one table of a relational backend.
///
/// Statement shapes:
/// - read:   `SELECT * FROM t WHERE id = ?`
/// - insert: `INSERT INTO t (c1, c2) VALUES (?, ?)` (or `DEFAULT VALUES`)
/// - update: `UPDATE t SET c1 = ? WHERE id = ?`
/// - delete: `DELETE FROM t WHERE id = ?`
pub struct SqlAccess {
    executor: Arc<dyn SqlExecutor>,
    table: String,
    id_column: String,
}

impl std::fmt::Debug for SqlAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlAccess")
            .field("table", &self.table)
            .field("id_column", &self.id_column)
            .finish_non_exhaustive()
    }
}

impl SqlAccess {
    pub fn new(executor: Arc<dyn SqlExecutor>, table: impl Into<String>) -> Result<Self> {
        Self::with_id_column(executor, table, "id")
    }

    pub fn with_id_column(
        executor: Arc<dyn SqlExecutor>,
        table: impl Into<String>,
        id_column: impl Into<String>,
    ) -> Result<Self> {
        let table = table.into();
        let id_column = id_column.into();
        ensure_identifier(&table)?;
        ensure_identifier(&id_column)?;
        Ok(Self {
            executor,
            table,
            id_column,
        })
    }
}

impl EntityAccess for SqlAccess {
    fn read(&self, id: &Value) -> Result<Option<Row>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            self.table, self.id_column
        );
        let rows = self.executor.query(&sql, std::slice::from_ref(id))?;
        Ok(rows.into_iter().next())
    }

    fn insert(&self, row: Row) -> Result<Row> {
        for column in row.keys() {
            ensure_identifier(column)?;
        }
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.table)
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                columns.join(", "),
                placeholders(columns.len())
            )
        };
        let params: Vec<Value> = row.values().cloned().collect();
        trace!("sql: {}", sql);
        let generated = self.executor.insert(&sql, &params)?;

        let mut row = row;
        if !row
            .get(&self.id_column)
            .is_some_and(|v| !v.is_null())
        {
            row.insert(self.id_column.clone(), generated);
        }
        Ok(row)
    }

    fn update(&self, row: Row) -> Result<Row> {
        let id = row
            .get(&self.id_column)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| {
                DbError::PreconditionViolation(format!(
                    "update on '{}' requires id column '{}'",
                    self.table, self.id_column
                ))
            })?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (column, value) in &row {
            if column == &self.id_column {
                continue;
            }
            ensure_identifier(column)?;
            assignments.push(format!("{} = ?", column));
            params.push(value.clone());
        }

        if !assignments.is_empty() {
            let sql = format!(
                "UPDATE {} SET {} WHERE {} = ?",
                self.table,
                assignments.join(", "),
                self.id_column
            );
            params.push(id.clone());
            trace!("sql: {}", sql);
            self.executor.execute(&sql, &params)?;
        }

        self.read(&id)?.ok_or_else(|| {
            DbError::StoreError(format!("update of missing row {} in '{}'", id, self.table))
        })
    }

    fn delete(&self, id: &Value) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", self.table, self.id_column);
        trace!("sql: {}", sql);
        self.executor.execute(&sql, std::slice::from_ref(id))
    }
}

/// Query function for a to-many relation:
/// `SELECT * FROM table WHERE fk_column = ?`.
pub fn query_by_fk(
    executor: Arc<dyn SqlExecutor>,
    table: impl Into<String>,
    fk_column: impl Into<String>,
) -> Result<QueryFn> {
    let table = table.into();
    let fk_column = fk_column.into();
    ensure_identifier(&table)?;
    ensure_identifier(&fk_column)?;

    let sql = format!("SELECT * FROM {} WHERE {} = ?", table, fk_column);
    Ok(Arc::new(move |id| {
        executor.query(&sql, std::slice::from_ref(id))
    }))
}

/// Query function for a linked relation, joining through the link table:
/// `SELECT c.* FROM child c JOIN link l ON c.id = l.child_col WHERE l.owner_col = ?`.
///
/// Selecting `c.*` is what strips the link table's own key columns from
/// each result row, as the accessor contract requires.
pub fn query_by_join(
    executor: Arc<dyn SqlExecutor>,
    child_table: impl Into<String>,
    child_id_column: impl Into<String>,
    link_table: impl Into<String>,
    owner_column: impl Into<String>,
    child_column: impl Into<String>,
) -> Result<QueryFn> {
    let child_table = child_table.into();
    let child_id_column = child_id_column.into();
    let link_table = link_table.into();
    let owner_column = owner_column.into();
    let child_column = child_column.into();
    for name in [
        &child_table,
        &child_id_column,
        &link_table,
        &owner_column,
        &child_column,
    ] {
        ensure_identifier(name)?;
    }

    let sql = format!(
        "SELECT c.* FROM {} c JOIN {} l ON c.{} = l.{} WHERE l.{} = ?",
        child_table, link_table, child_id_column, child_column, owner_column
    );
    Ok(Arc::new(move |id| {
        executor.query(&sql, std::slice::from_ref(id))
    }))
}

/// Link-update function over the link table: full replacement — delete all
/// link rows for the owner id, then insert one per child.
pub fn replace_links(
    executor: Arc<dyn SqlExecutor>,
    link_table: impl Into<String>,
    owner_column: impl Into<String>,
    child_column: impl Into<String>,
    child_id_column: impl Into<String>,
) -> Result<LinkFn> {
    let link_table = link_table.into();
    let owner_column = owner_column.into();
    let child_column = child_column.into();
    let child_id_column = child_id_column.into();
    for name in [&link_table, &owner_column, &child_column, &child_id_column] {
        ensure_identifier(name)?;
    }

    let delete_sql = format!("DELETE FROM {} WHERE {} = ?", link_table, owner_column);
    let insert_sql = format!(
        "INSERT INTO {} ({}, {}) VALUES (?, ?)",
        link_table, owner_column, child_column
    );
    Ok(Arc::new(move |id, children| {
        executor.execute(&delete_sql, std::slice::from_ref(id))?;
        for child in children {
            let child_id = child
                .get(&child_id_column)
                .filter(|v| !v.is_null())
                .ok_or_else(|| {
                    DbError::PreconditionViolation(format!(
                        "link child row is missing id column '{}'",
                        child_id_column
                    ))
                })?;
            executor.insert(&insert_sql, &[id.clone(), child_id.clone()])?;
        }
        Ok(())
    }))
}
