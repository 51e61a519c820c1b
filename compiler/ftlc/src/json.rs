//! JSON documents as template data models.
//!
//! Strings, numbers and booleans become plain [`Value`]s. Objects and arrays
//! become host objects so that `null` members survive: `${obj.missing}` and
//! `${obj.nullMember}` both fail, and both are caught by `??` and `!`.
//!
//! Object keys keep `serde_json`'s map order, which is sorted by key.

use std::sync::Arc;

use ftl_eval::model::{HashExModel, HashModel, ModelResult, SequenceModel, TemplateModel};
use ftl_eval::{Number, Value};
use rustc_hash::FxHashMap;
use serde_json::Value as Json;

/// The root of a JSON data model isn't an object.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("the data model must be a JSON object, but it is {0}")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
}

/// Convert a JSON value; `None` for `null`.
pub fn to_value(json: Json) -> Option<Value> {
    match json {
        Json::Null => None,
        Json::Bool(b) => Some(Value::Boolean(b)),
        Json::Number(n) => Some(Value::Number(number(&n))),
        Json::String(s) => Some(Value::from(s)),
        Json::Array(items) => Some(Value::adapted(JsonArray::new(items))),
        Json::Object(map) => Some(Value::adapted(JsonObject::new(map))),
    }
}

/// A JSON object as the data model of a render.
pub fn data_model(json: Json) -> Result<Value, JsonError> {
    match json {
        Json::Object(map) => Ok(Value::adapted(JsonObject::new(map))),
        other => Err(JsonError::NotAnObject(kind(&other))),
    }
}

/// Parse JSON text into a data model.
pub fn data_model_from_str(text: &str) -> Result<Value, JsonError> {
    data_model(serde_json::from_str(text)?)
}

fn number(n: &serde_json::Number) -> Number {
    match n.as_i64() {
        Some(i) => Number::Int(i),
        None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

#[derive(Debug)]
struct JsonObject {
    keys: Vec<String>,
    values: Vec<Option<Value>>,
    index: FxHashMap<String, usize>,
}

impl JsonObject {
    fn new(map: serde_json::Map<String, Json>) -> Self {
        let mut keys = Vec::with_capacity(map.len());
        let mut values = Vec::with_capacity(map.len());
        let mut index = FxHashMap::default();
        for (key, value) in map {
            index.insert(key.clone(), keys.len());
            keys.push(key);
            values.push(to_value(value));
        }
        JsonObject {
            keys,
            values,
            index,
        }
    }
}

impl TemplateModel for JsonObject {
    fn as_hash(&self) -> Option<&dyn HashModel> {
        Some(self)
    }

    fn as_hash_ex(&self) -> Option<&dyn HashExModel> {
        Some(self)
    }
}

impl HashModel for JsonObject {
    fn get(&self, key: &str) -> ModelResult<Option<Value>> {
        Ok(self
            .index
            .get(key)
            .and_then(|&slot| self.values.get(slot).cloned().flatten()))
    }
}

impl HashExModel for JsonObject {
    fn keys(&self) -> ModelResult<Vec<String>> {
        Ok(self.keys.clone())
    }

    fn values(&self) -> ModelResult<Vec<Option<Value>>> {
        Ok(self.values.clone())
    }

    fn size(&self) -> ModelResult<usize> {
        Ok(self.keys.len())
    }
}

#[derive(Debug)]
struct JsonArray {
    items: Arc<[Option<Value>]>,
}

impl JsonArray {
    fn new(items: Vec<Json>) -> Self {
        JsonArray {
            items: items.into_iter().map(to_value).collect(),
        }
    }
}

impl TemplateModel for JsonArray {
    fn as_sequence(&self) -> Option<&dyn SequenceModel> {
        Some(self)
    }
}

impl SequenceModel for JsonArray {
    fn get(&self, index: usize) -> ModelResult<Option<Value>> {
        Ok(self.items.get(index).cloned().flatten())
    }

    fn size(&self) -> ModelResult<usize> {
        Ok(self.items.len())
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalars_become_plain_values() {
        assert!(to_value(Json::Null).is_none());
        assert!(matches!(
            to_value(serde_json::json!(3)),
            Some(Value::Number(Number::Int(3)))
        ));
        assert!(matches!(
            to_value(serde_json::json!(1.5)),
            Some(Value::Number(Number::Float(x))) if x == 1.5
        ));
        assert!(matches!(to_value(serde_json::json!(true)), Some(Value::Boolean(true))));
    }

    #[test]
    fn objects_keep_null_members() {
        let model = data_model_from_str(r#"{"a": 1, "b": null, "c": [1, null]}"#).unwrap();
        assert!(model.hash_get("a").unwrap().is_some());
        assert!(model.hash_get("b").unwrap().is_none());
        assert_eq!(model.hash_size().unwrap(), Some(3));
        let c = model.hash_get("c").unwrap().unwrap();
        assert_eq!(c.seq_size().unwrap(), Some(2));
        assert!(c.seq_get(1).unwrap().is_none());
    }

    #[test]
    fn root_must_be_an_object() {
        assert!(matches!(
            data_model_from_str("[1]"),
            Err(JsonError::NotAnObject("an array"))
        ));
        assert!(matches!(data_model_from_str("{"), Err(JsonError::Syntax(_))));
    }
}
