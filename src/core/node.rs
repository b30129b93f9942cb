use super::{Row, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One field of an aggregate node: either a stored scalar or a nested part
/// of the tree (a to-one child, or an ordered list of to-many children).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Value(Value),
    One(Node),
    Many(Vec<Node>),
}

/// A node of an aggregate tree, tagged with the entity it belongs to.
///
/// Fields are an open mapping: scalar fields correspond to columns of the
/// entity's table, while relation-name fields hold nested nodes. Nodes are
/// transient values created per call; the engines never retain them.
///
/// # Examples
///
/// ```
/// use aggrel::core::{Node, Value};
///
/// let project = Node::new("project")
///     .with_value("name", "Skunkworks")
///     .with_many("tasks", vec![
///         Node::new("task").with_value("desc", "design"),
///         Node::new("task").with_value("desc", "build"),
///     ]);
///
/// assert_eq!(project.value("name"), Some(&Value::Text("Skunkworks".into())));
/// assert_eq!(project.many("tasks").map(|t| t.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    entity: String,
    fields: BTreeMap<String, Field>,
}

impl Node {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Build a node from a flat accessor row.
    pub fn from_row(entity: impl Into<String>, row: Row) -> Self {
        Self {
            entity: entity.into(),
            fields: row.into_iter().map(|(k, v)| (k, Field::Value(v))).collect(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn set_entity(&mut self, entity: impl Into<String>) {
        self.entity = entity.into();
    }

    // ------------------------------------------------------------------
    // Builder-style construction
    // ------------------------------------------------------------------

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_value(name, value);
        self
    }

    pub fn with_one(mut self, name: impl Into<String>, child: Node) -> Self {
        self.set_one(name, child);
        self
    }

    pub fn with_many(mut self, name: impl Into<String>, children: Vec<Node>) -> Self {
        self.set_many(name, children);
        self
    }

    // ------------------------------------------------------------------
    // Field access
    // ------------------------------------------------------------------

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(Field::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn one(&self, name: &str) -> Option<&Node> {
        match self.fields.get(name) {
            Some(Field::One(n)) => Some(n),
            _ => None,
        }
    }

    pub fn many(&self, name: &str) -> Option<&[Node]> {
        match self.fields.get(name) {
            Some(Field::Many(ns)) => Some(ns),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Field> {
        &self.fields
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), Field::Value(value.into()));
    }

    pub fn set_one(&mut self, name: impl Into<String>, child: Node) {
        self.fields.insert(name.into(), Field::One(child));
    }

    pub fn set_many(&mut self, name: impl Into<String>, children: Vec<Node>) {
        self.fields.insert(name.into(), Field::Many(children));
    }

    pub fn remove(&mut self, name: &str) -> Option<Field> {
        self.fields.remove(name)
    }

    /// The value of `id_column`, if the field is present and scalar.
    pub fn id(&self, id_column: &str) -> Option<&Value> {
        self.value(id_column)
    }

    // ------------------------------------------------------------------
    // Row conversions
    // ------------------------------------------------------------------

    /// Flatten to an accessor row: scalar fields only, nested parts dropped.
    pub fn to_row(&self) -> Row {
        self.fields
            .iter()
            .filter_map(|(k, f)| match f {
                Field::Value(v) => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }

    /// Overlay scalar fields returned by an accessor onto this node.
    pub fn merge_row(&mut self, row: Row) {
        for (k, v) in row {
            self.fields.insert(k, Field::Value(v));
        }
    }
}
