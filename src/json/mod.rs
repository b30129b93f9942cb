//! JSON interop for aggregate trees.
//!
//! Converts between `serde_json` documents and [`Node`] trees. Conversion
//! from JSON is model-driven: object fields whose name matches a configured
//! relation become nested nodes tagged with the relation's target entity,
//! everything else must be scalar. Conversion to JSON drops entity tags and
//! yields a plain document.

use crate::core::{DbError, Field, Node, Result, Value};
use crate::model::RelationModel;
use serde_json::{Map, Value as JsonValue};

/// Convert a scalar JSON value. Objects and arrays are a type mismatch:
/// nested structure goes through [`node_from_json`].
pub fn value_from_json(json: &JsonValue) -> Result<Value> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(DbError::TypeMismatch(format!(
                    "cannot convert number {} to a store value",
                    n
                )))
            }
        }
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(DbError::TypeMismatch(
            "nested JSON must map to a configured relation".to_string(),
        )),
    }
}

pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
    }
}

/// Build an aggregate node for `entity` from a JSON object.
///
/// Fields named like one of the entity's relations are converted
/// recursively and tagged with the relation's target entity: a to-one
/// relation expects an object, the to-many kinds expect an array of
/// objects. All other fields must be scalar.
pub fn node_from_json(model: &RelationModel, entity: &str, json: &JsonValue) -> Result<Node> {
    let config = model.entity(entity)?;
    let JsonValue::Object(object) = json else {
        return Err(DbError::TypeMismatch(format!(
            "entity '{}' expects a JSON object, got {}",
            entity,
            json_shape(json)
        )));
    };

    let mut node = Node::new(entity);
    for (name, value) in object {
        match config.relations().get(name) {
            Some(relation) => match value {
                JsonValue::Object(_) => {
                    let child = node_from_json(model, relation.target(), value)?;
                    node.set_one(name.clone(), child);
                }
                JsonValue::Array(items) => {
                    let mut children = Vec::with_capacity(items.len());
                    for item in items {
                        children.push(node_from_json(model, relation.target(), item)?);
                    }
                    node.set_many(name.clone(), children);
                }
                _ => {
                    return Err(DbError::TypeMismatch(format!(
                        "relation field '{}' of entity '{}' expects an object or array",
                        name, entity
                    )));
                }
            },
            None => node.set_value(name.clone(), value_from_json(value)?),
        }
    }
    Ok(node)
}

/// Flatten a node tree back into a plain JSON document (entity tags drop).
pub fn node_to_json(node: &Node) -> JsonValue {
    let mut object = Map::new();
    for (name, field) in node.fields() {
        let json = match field {
            Field::Value(v) => value_to_json(v),
            Field::One(child) => node_to_json(child),
            Field::Many(children) => {
                JsonValue::Array(children.iter().map(node_to_json).collect())
            }
        };
        object.insert(name.clone(), json);
    }
    JsonValue::Object(object)
}

fn json_shape(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
