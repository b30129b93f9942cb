use super::relation::RelationConfig;
use crate::interface::EntityAccess;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Configuration of one entity: its table-like identity, id column,
/// accessor implementation, and outgoing relations.
#[derive(Clone)]
pub struct EntityConfig {
    name: String,
    id_column: Option<String>,
    access: Arc<dyn EntityAccess>,
    relations: BTreeMap<String, RelationConfig>,
    // First duplicate relation name seen while building, surfaced by
    // ModelBuilder::build as a configuration error.
    duplicate_relation: Option<String>,
}

impl EntityConfig {
    pub fn new(name: impl Into<String>, access: Arc<dyn EntityAccess>) -> Self {
        Self {
            name: name.into(),
            id_column: None,
            access,
            relations: BTreeMap::new(),
            duplicate_relation: None,
        }
    }

    /// Override the model-wide default id column for this entity.
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    pub fn relation(mut self, relation: RelationConfig) -> Self {
        let name = relation.name().to_string();
        if self.relations.insert(name.clone(), relation).is_some()
            && self.duplicate_relation.is_none()
        {
            self.duplicate_relation = Some(name);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id column, resolved against the model default at build time.
    pub fn id_column_name(&self) -> &str {
        self.id_column.as_deref().unwrap_or("id")
    }

    pub fn access(&self) -> &Arc<dyn EntityAccess> {
        &self.access
    }

    pub fn relations(&self) -> &BTreeMap<String, RelationConfig> {
        &self.relations
    }

    pub(super) fn duplicate_relation(&self) -> Option<&str> {
        self.duplicate_relation.as_deref()
    }

    pub(super) fn resolve_id_column(&mut self, default: &str) {
        if self.id_column.is_none() {
            self.id_column = Some(default.to_string());
        }
    }

    /// A copy retaining only the named relations.
    pub(super) fn retaining(&self, keep: &[&str]) -> Self {
        let mut copy = self.clone();
        copy.relations.retain(|name, _| keep.contains(&name.as_str()));
        copy
    }

    /// A copy with the named relations removed.
    pub(super) fn excluding(&self, drop: &[&str]) -> Self {
        let mut copy = self.clone();
        copy.relations.retain(|name, _| !drop.contains(&name.as_str()));
        copy
    }
}
