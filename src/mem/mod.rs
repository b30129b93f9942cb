//! In-memory store satisfying the accessor contract.
//!
//! The primary test fixture and a zero-setup playground: tables and link
//! tables are created on first touch, ids are monotonic integers unless the
//! caller provides one. A [`MemStore`] is a cheap-clone handle onto shared
//! state; clones see the same data.

mod table;

use crate::core::{Result, Row, Value};
use crate::interface::{EntityAccess, LinkFn, QueryFn};
use log::trace;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use table::MemTable;

#[derive(Default)]
struct Inner {
    tables: RwLock<HashMap<String, MemTable>>,
    links: RwLock<HashMap<String, Vec<(Value, Value)>>>,
}

/// Shared in-memory store of named tables and link tables.
///
/// ```
/// use aggrel::mem::MemStore;
/// use aggrel::core::{Row, Value};
///
/// let store = MemStore::new();
/// let people = store.accessor("person");
///
/// let mut row = Row::new();
/// row.insert("name".into(), Value::Text("Ada".into()));
/// let saved = people.insert(row).unwrap();
///
/// assert_eq!(saved.get("id"), Some(&Value::Integer(1)));
/// assert_eq!(store.row_count("person"), 1);
/// ```
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accessor for `table` with the default `"id"` id column.
    pub fn accessor(&self, table: impl Into<String>) -> Arc<dyn EntityAccess> {
        self.accessor_with_id(table, "id")
    }

    pub fn accessor_with_id(
        &self,
        table: impl Into<String>,
        id_column: impl Into<String>,
    ) -> Arc<dyn EntityAccess> {
        Arc::new(MemAccessor {
            store: self.clone(),
            table: table.into(),
            id_column: id_column.into(),
        })
    }

    /// A query function returning the rows of `table` whose `fk_column`
    /// equals the owner id.
    pub fn query_by_fk(&self, table: impl Into<String>, fk_column: impl Into<String>) -> QueryFn {
        let store = self.clone();
        let table = table.into();
        let fk_column = fk_column.into();
        Arc::new(move |id| store.query_eq(&table, &fk_column, id))
    }

    /// A query function joining through `link_table` to the rows of
    /// `child_table`. Result rows are child rows as stored; the link
    /// table's own key columns never appear in them.
    pub fn query_by_join(
        &self,
        link_table: impl Into<String>,
        child_table: impl Into<String>,
    ) -> QueryFn {
        let store = self.clone();
        let link_table = link_table.into();
        let child_table = child_table.into();
        Arc::new(move |id| {
            let child_ids: Vec<Value> = {
                let links = store.inner.links.read()?;
                links
                    .get(&link_table)
                    .map(|pairs| {
                        pairs
                            .iter()
                            .filter(|(owner, _)| owner == id)
                            .map(|(_, child)| child.clone())
                            .collect()
                    })
                    .unwrap_or_default()
            };

            let tables = store.inner.tables.read()?;
            let mut rows = Vec::with_capacity(child_ids.len());
            if let Some(table) = tables.get(&child_table) {
                for child_id in &child_ids {
                    if let Some(row) = table.read(child_id) {
                        rows.push(row);
                    }
                }
            }
            Ok(rows)
        })
    }

    /// A link-update function over `link_table`: full replacement of the
    /// owner's link rows, one per child, child ids taken from
    /// `child_id_column`.
    pub fn replace_links(
        &self,
        link_table: impl Into<String>,
        child_id_column: impl Into<String>,
    ) -> LinkFn {
        let store = self.clone();
        let link_table = link_table.into();
        let child_id_column = child_id_column.into();
        Arc::new(move |id, children| {
            let mut links = store.inner.links.write()?;
            let pairs = links.entry(link_table.clone()).or_default();
            pairs.retain(|(owner, _)| owner != id);
            for child in children {
                if let Some(child_id) = child.get(&child_id_column).filter(|v| !v.is_null()) {
                    pairs.push((id.clone(), child_id.clone()));
                }
            }
            trace!("mem: links of {} in '{}' replaced", id, link_table);
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Assertion helpers
    // ------------------------------------------------------------------

    pub fn row_count(&self, table: &str) -> usize {
        self.inner
            .tables
            .read()
            .map(|tables| tables.get(table).map_or(0, MemTable::row_count))
            .unwrap_or(0)
    }

    pub fn link_count(&self, link_table: &str) -> usize {
        self.inner
            .links
            .read()
            .map(|links| links.get(link_table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn links(&self, link_table: &str) -> Vec<(Value, Value)> {
        self.inner
            .links
            .read()
            .map(|links| links.get(link_table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn read(&self, table: &str, id: &Value) -> Option<Row> {
        self.inner
            .tables
            .read()
            .ok()
            .and_then(|tables| tables.get(table).and_then(|t| t.read(id)))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn query_eq(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
        let tables = self.inner.tables.read()?;
        Ok(tables
            .get(table)
            .map(|t| t.query_eq(column, value))
            .unwrap_or_default())
    }

    fn with_table<R>(
        &self,
        table: &str,
        id_column: &str,
        f: impl FnOnce(&mut MemTable) -> R,
    ) -> Result<R> {
        let mut tables = self.inner.tables.write()?;
        let table = tables
            .entry(table.to_string())
            .or_insert_with(|| MemTable::new(id_column));
        Ok(f(table))
    }
}

struct MemAccessor {
    store: MemStore,
    table: String,
    id_column: String,
}

impl EntityAccess for MemAccessor {
    fn read(&self, id: &Value) -> Result<Option<Row>> {
        let tables = self.store.inner.tables.read()?;
        Ok(tables.get(&self.table).and_then(|t| t.read(id)))
    }

    fn insert(&self, row: Row) -> Result<Row> {
        self.store
            .with_table(&self.table, &self.id_column, |t| t.insert(row))?
    }

    fn update(&self, row: Row) -> Result<Row> {
        self.store
            .with_table(&self.table, &self.id_column, |t| t.update(row))?
    }

    fn delete(&self, id: &Value) -> Result<usize> {
        self.store
            .with_table(&self.table, &self.id_column, |t| t.delete(id))
    }
}
