use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};

/// A completed value, already checked against the schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseValue {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ResponseValue>),
    Object(ResponseObject),
    /// Custom scalar output and precomputed meta fields.
    Json(serde_json::Value),
}

impl ResponseValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ResponseValue::Null)
    }

    pub fn as_object(&self) -> Option<&ResponseObject> {
        match self {
            ResponseValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn into_json(self) -> serde_json::Value {
        match self {
            ResponseValue::Null => serde_json::Value::Null,
            ResponseValue::Boolean(value) => value.into(),
            ResponseValue::Int(value) => value.into(),
            ResponseValue::Float(value) => value.into(),
            ResponseValue::String(value) => value.into(),
            ResponseValue::List(items) => items.into_iter().map(ResponseValue::into_json).collect(),
            ResponseValue::Object(object) => serde_json::Value::Object(
                object
                    .fields
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value.into_json()))
                    .collect(),
            ),
            ResponseValue::Json(value) => value,
        }
    }
}

/// Response object fields, in the order of the selection set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseObject {
    fields: Vec<(Arc<str>, ResponseValue)>,
}

impl ResponseObject {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        ResponseObject {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, key: Arc<str>, value: ResponseValue) {
        self.fields.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&ResponseValue> {
        self.fields
            .iter()
            .find_map(|(name, value)| (name.as_ref() == key).then_some(value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ResponseValue)> {
        self.fields.iter().map(|(key, value)| (key.as_ref(), value))
    }
}

impl serde::Serialize for ResponseObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key.as_ref(), value)?;
        }
        map.end()
    }
}

impl serde::Serialize for ResponseValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ResponseValue::Null => serializer.serialize_none(),
            ResponseValue::Boolean(value) => value.serialize(serializer),
            ResponseValue::Int(value) => value.serialize(serializer),
            ResponseValue::Float(value) => value.serialize(serializer),
            ResponseValue::String(value) => value.serialize(serializer),
            ResponseValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ResponseValue::Object(object) => object.serialize(serializer),
            ResponseValue::Json(value) => value.serialize(serializer),
        }
    }
}
