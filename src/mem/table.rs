use crate::core::{DbError, Result, Row, Value};
use std::collections::BTreeMap;

/// One in-memory table: rows keyed by id, with monotonic integer id
/// allocation for rows inserted without one.
#[derive(Debug)]
pub(super) struct MemTable {
    id_column: String,
    next_id: i64,
    rows: BTreeMap<Value, Row>,
}

impl MemTable {
    pub(super) fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    pub(super) fn read(&self, id: &Value) -> Option<Row> {
        self.rows.get(id).cloned()
    }

    pub(super) fn insert(&mut self, mut row: Row) -> Result<Row> {
        let id = match row.get(&self.id_column) {
            Some(explicit) if !explicit.is_null() => {
                // Honor caller-provided ids; keep the allocator ahead of them.
                if let Value::Integer(i) = explicit {
                    self.next_id = self.next_id.max(i + 1);
                }
                explicit.clone()
            }
            _ => {
                let id = Value::Integer(self.next_id);
                self.next_id += 1;
                row.insert(self.id_column.clone(), id.clone());
                id
            }
        };

        if self.rows.contains_key(&id) {
            return Err(DbError::ConstraintViolation(format!(
                "duplicate id {} in column '{}'",
                id, self.id_column
            )));
        }
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    /// Partial update: fields present in `row` overwrite the stored row.
    pub(super) fn update(&mut self, row: Row) -> Result<Row> {
        let id = row
            .get(&self.id_column)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| {
                DbError::PreconditionViolation(format!(
                    "update requires id column '{}'",
                    self.id_column
                ))
            })?;

        let stored = self.rows.get_mut(&id).ok_or_else(|| {
            DbError::StoreError(format!("update of missing row {}", id))
        })?;
        stored.extend(row);
        Ok(stored.clone())
    }

    pub(super) fn delete(&mut self, id: &Value) -> usize {
        usize::from(self.rows.remove(id).is_some())
    }

    pub(super) fn query_eq(&self, column: &str, value: &Value) -> Vec<Row> {
        self.rows
            .values()
            .filter(|row| row.get(column) == Some(value))
            .cloned()
            .collect()
    }

    pub(super) fn row_count(&self) -> usize {
        self.rows.len()
    }
}
