use super::entity::EntityConfig;
use crate::core::{DbError, Node, Result};
use crate::interface::{PersistedFn, default_persisted};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Global model options: the default id column and the persisted predicate.
#[derive(Clone)]
pub struct ModelOptions {
    pub(super) id_column: String,
    pub(super) persisted: PersistedFn,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            persisted: default_persisted(),
        }
    }
}

/// The immutable entity-relation configuration driving the engines.
///
/// Built once through [`ModelBuilder`]; never mutated afterwards. Entity
/// configs are shared via `Arc`, so narrowed copies derived by
/// [`only`](RelationModel::only) / [`without`](RelationModel::without) are
/// cheap values, not mutations — the engines derive one narrowed copy per
/// recursive descent to de-cycle traversal.
#[derive(Clone)]
pub struct RelationModel {
    pub(super) entities: BTreeMap<String, Arc<EntityConfig>>,
    pub(super) options: ModelOptions,
}

impl std::fmt::Debug for RelationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationModel")
            .field("entities", &self.entities.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl RelationModel {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }

    /// Look up an entity, erring on absence. Use this for API-surface
    /// lookups; narrowing no-ops go through [`contains`](Self::contains).
    pub fn entity(&self, name: &str) -> Result<&EntityConfig> {
        self.entities
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| DbError::EntityNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn default_id_column(&self) -> &str {
        &self.options.id_column
    }

    pub(crate) fn is_persisted(&self, entity: &EntityConfig, node: &Node) -> bool {
        (self.options.persisted)(entity.id_column_name(), node)
    }
}

/// Staged, validating builder for [`RelationModel`].
///
/// ```
/// use aggrel::model::{EntityConfig, RelationConfig, RelationModel};
/// use aggrel::mem::MemStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemStore::new());
/// let model = RelationModel::builder()
///     .entity(
///         EntityConfig::new("project", store.accessor("project"))
///             .relation(RelationConfig::to_many(
///                 "tasks", "task", "project_id",
///                 store.query_by_fk("task", "project_id"),
///             ).owned(true)),
///     )
///     .entity(EntityConfig::new("task", store.accessor("task")))
///     .build()
///     .unwrap();
///
/// assert!(model.contains("task"));
/// ```
pub struct ModelBuilder {
    entities: Vec<EntityConfig>,
    options: ModelOptions,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            options: ModelOptions::default(),
        }
    }

    /// Change the model-wide default id column (initially `"id"`).
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.options.id_column = column.into();
        self
    }

    /// Install a custom persisted predicate. The default checks that the
    /// id-column field is present on the node.
    pub fn persisted_with<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &Node) -> bool + Send + Sync + 'static,
    {
        self.options.persisted = Arc::new(predicate);
        self
    }

    pub fn entity(mut self, entity: EntityConfig) -> Self {
        self.entities.push(entity);
        self
    }

    /// Validate and freeze the model.
    ///
    /// Configuration errors are fatal here, never at traversal time:
    /// duplicate entity or relation names, and relations referencing an
    /// entity not declared in the model.
    pub fn build(self) -> Result<RelationModel> {
        let mut entities: BTreeMap<String, Arc<EntityConfig>> = BTreeMap::new();

        for mut entity in self.entities {
            entity.resolve_id_column(&self.options.id_column);

            if let Some(relation) = entity.duplicate_relation() {
                return Err(DbError::ConfigError(format!(
                    "duplicate relation '{}' on entity '{}'",
                    relation,
                    entity.name()
                )));
            }

            let name = entity.name().to_string();
            if entities.insert(name.clone(), Arc::new(entity)).is_some() {
                return Err(DbError::ConfigError(format!(
                    "duplicate entity '{}'",
                    name
                )));
            }
        }

        for entity in entities.values() {
            for relation in entity.relations().values() {
                if !entities.contains_key(relation.target()) {
                    return Err(DbError::ConfigError(format!(
                        "relation '{}' on entity '{}' references undeclared entity '{}'",
                        relation.name(),
                        entity.name(),
                        relation.target()
                    )));
                }
            }
        }

        Ok(RelationModel {
            entities,
            options: self.options,
        })
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
