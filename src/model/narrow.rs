//! Configuration narrowing: derive restricted copies of a model.
//!
//! Narrowing serves two callers. Application code scopes dangerous
//! operations ("save this project but leave its members alone"), and the
//! engines drop the currently-processing entity before every recursive
//! descent, so cyclic relation graphs terminate by construction instead of
//! by runtime cycle detection.
//!
//! All derivations are pure: the source model is never mutated, and entity
//! configs untouched by the derivation stay shared behind their `Arc`.

use super::RelationModel;
use std::sync::Arc;

impl RelationModel {
    /// Retain, for each named entity, exactly the named relations; entities
    /// not mentioned are dropped entirely.
    ///
    /// ```
    /// # use aggrel::model::{EntityConfig, RelationModel};
    /// # use aggrel::mem::MemStore;
    /// # use std::sync::Arc;
    /// # let store = Arc::new(MemStore::new());
    /// # let model = RelationModel::builder()
    /// #     .entity(EntityConfig::new("project", store.accessor("project")))
    /// #     .entity(EntityConfig::new("task", store.accessor("task")))
    /// #     .build().unwrap();
    /// let scoped = model.only(&[("project", &[])]);
    /// assert!(scoped.contains("project"));
    /// assert!(!scoped.contains("task"));
    /// ```
    pub fn only(&self, keep: &[(&str, &[&str])]) -> Self {
        let mut entities = std::collections::BTreeMap::new();
        for &(entity_name, relations) in keep {
            if let Ok(entity) = self.entity(entity_name) {
                entities.insert(
                    entity_name.to_string(),
                    Arc::new(entity.retaining(relations)),
                );
            }
        }
        Self {
            entities,
            options: self.options.clone(),
        }
    }

    /// Remove the named entities wholesale. Relations elsewhere that target
    /// a removed entity become no-ops during traversal, not errors.
    pub fn without(&self, entities: &[&str]) -> Self {
        let mut copy = self.clone();
        for name in entities {
            copy.entities.remove(*name);
        }
        copy
    }

    /// Remove only the named relations from one entity, keeping the entity
    /// itself and everything else intact.
    pub fn without_relations(&self, entity: &str, relations: &[&str]) -> Self {
        let mut copy = self.clone();
        if let Some(existing) = copy.entities.get(entity) {
            let narrowed = existing.excluding(relations);
            copy.entities.insert(entity.to_string(), Arc::new(narrowed));
        }
        copy
    }
}
