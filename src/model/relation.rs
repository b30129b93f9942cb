use crate::interface::{LinkFn, QueryFn};

/// Kind-specific payload of a relation edge.
///
/// A closed variant: each engine dispatches on it with one exhaustive
/// match, which keeps the three cascade algorithms auditable in one place
/// each. Required functions are constructor arguments, so a relation with a
/// missing query or link-update function cannot be built.
#[derive(Clone)]
pub enum RelationKind {
    /// This entity holds a foreign key pointing at one target row.
    ToOne { fk_column: String },
    /// Target rows hold a foreign key pointing back at this entity.
    ToMany { fk_column: String, query: QueryFn },
    /// Rows are associated through a separate link table; no foreign key
    /// ever lives on either side's row.
    ToManyLinked { query: QueryFn, update_links: LinkFn },
}

impl RelationKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToOne { .. } => "to-one",
            Self::ToMany { .. } => "to-many",
            Self::ToManyLinked { .. } => "to-many-linked",
        }
    }
}

/// A named, typed edge from one entity to another.
///
/// Built through one of the per-kind constructors:
///
/// ```
/// use aggrel::model::RelationConfig;
/// use aggrel::mem::MemStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemStore::new());
/// let tasks = RelationConfig::to_many(
///     "tasks", "task", "project_id",
///     store.query_by_fk("task", "project_id"),
/// ).owned(true);
///
/// assert_eq!(tasks.name(), "tasks");
/// assert!(tasks.is_owned());
/// ```
#[derive(Clone)]
pub struct RelationConfig {
    name: String,
    target: String,
    owned: bool,
    kind: RelationKind,
}

impl RelationConfig {
    /// A to-one relation: `fk_column` on this entity references the target.
    pub fn to_one(
        name: impl Into<String>,
        target: impl Into<String>,
        fk_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            owned: false,
            kind: RelationKind::ToOne {
                fk_column: fk_column.into(),
            },
        }
    }

    /// A to-many relation: `fk_column` on the target references this entity;
    /// `query` fetches the currently linked target rows by owner id.
    pub fn to_many(
        name: impl Into<String>,
        target: impl Into<String>,
        fk_column: impl Into<String>,
        query: QueryFn,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            owned: false,
            kind: RelationKind::ToMany {
                fk_column: fk_column.into(),
                query,
            },
        }
    }

    /// A many-to-many relation through a link table: `query` joins to the
    /// currently linked target rows, `update_links` replaces all link rows
    /// for an owner id.
    pub fn to_many_linked(
        name: impl Into<String>,
        target: impl Into<String>,
        query: QueryFn,
        update_links: LinkFn,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            owned: false,
            kind: RelationKind::ToManyLinked {
                query,
                update_links,
            },
        }
    }

    /// Bind the target's lifecycle to this relation: orphans and dependants
    /// are deleted instead of detached. Defaults to `false`.
    pub fn owned(mut self, owned: bool) -> Self {
        self.owned = owned;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn kind(&self) -> &RelationKind {
        &self.kind
    }
}
