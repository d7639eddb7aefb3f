//! Application values as the executor sees them.
//!
//! Resolvers return plain Rust values which are converted into a [`HostValue`]
//! through [`IntoHostValue`]. Every convertible type also reports its static
//! [`Shape`], which is what the binder matches against the type schema before
//! any operation runs.

mod into_value;
mod scalar;
mod shape;
mod stream;

use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

use indexmap::IndexMap;

pub use into_value::IntoHostValue;
pub use scalar::{CustomScalar, ErasedScalar};
pub use shape::{Capability, CapabilityKind, Object, ObjectShape, ObjectShapeBuilder, Shape, ShapeRef, Signature};
pub(crate) use shape::{Invoke, ShapeKey};
pub use stream::{Event, EventReceiver, EventSource, EventStream};

/// A value produced by a resolver.
#[derive(Clone, Default)]
pub enum HostValue {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<HostValue>),
    Map(Arc<IndexMap<String, HostValue>>),
    /// A JSON object. Other JSON values are converted to their native
    /// variant by [`HostValue::from_json`].
    Json(Arc<serde_json::Value>),
    Object(HostObject),
    Scalar(Arc<dyn ErasedScalar>),
    Stream(EventSource),
}

impl HostValue {
    pub fn from_json(value: serde_json::Value) -> HostValue {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => HostValue::Int(i),
                None => HostValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => HostValue::String(s),
            serde_json::Value::Array(items) => HostValue::List(items.into_iter().map(HostValue::from_json).collect()),
            object @ serde_json::Value::Object(_) => HostValue::Json(Arc::new(object)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Short description of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Boolean(_) => "a boolean",
            HostValue::Int(_) => "an integer",
            HostValue::Float(_) => "a float",
            HostValue::String(_) => "a string",
            HostValue::List(_) => "a list",
            HostValue::Map(_) => "a map",
            HostValue::Json(_) => "a JSON object",
            HostValue::Object(_) => "an object",
            HostValue::Scalar(_) => "a custom scalar",
            HostValue::Stream(_) => "an event stream",
        }
    }

    /// Reads a keyed entry of a map or JSON object. `None` when the value
    /// isn't keyed at all, `Some(Null)` when the key is missing.
    pub fn entry(&self, key: &str) -> Option<HostValue> {
        match self {
            HostValue::Map(map) => Some(map.get(key).cloned().unwrap_or_default()),
            HostValue::Json(json) => match json.as_ref() {
                serde_json::Value::Object(object) => {
                    Some(object.get(key).cloned().map(HostValue::from_json).unwrap_or_default())
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// The `__typename` entry of a keyed value, used to discriminate abstract
    /// types when the value carries no static type.
    pub fn typename(&self) -> Option<String> {
        match self.entry("__typename")? {
            HostValue::String(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => f.write_str("Null"),
            HostValue::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            HostValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            HostValue::Float(x) => f.debug_tuple("Float").field(x).finish(),
            HostValue::String(s) => f.debug_tuple("String").field(s).finish(),
            HostValue::List(items) => f.debug_tuple("List").field(items).finish(),
            HostValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
            HostValue::Json(json) => f.debug_tuple("Json").field(json).finish(),
            HostValue::Object(object) => f.debug_tuple("Object").field(&object.shape.type_name()).finish(),
            HostValue::Scalar(scalar) => f.debug_tuple("Scalar").field(&scalar.name()).finish(),
            HostValue::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// A reference to an application object together with the shape describing
/// its capabilities.
#[derive(Clone)]
pub struct HostObject {
    value: Arc<dyn Any + Send + Sync>,
    shape: ShapeRef,
}

impl HostObject {
    pub fn new<T: Object>(value: Arc<T>) -> Self {
        HostObject {
            value,
            shape: ShapeRef::of::<T>(),
        }
    }

    pub fn shape(&self) -> ShapeRef {
        self.shape
    }

    pub fn type_id(&self) -> TypeId {
        self.shape.type_id()
    }

    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast<T: Object>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_values_become_native_variants() {
        let value = HostValue::from_json(json!({"name": "R2-D2", "friends": [1, 2.5, null], "__typename": "Droid"}));

        assert!(matches!(value.entry("name"), Some(HostValue::String(name)) if name == "R2-D2"));
        assert!(matches!(value.entry("missing"), Some(HostValue::Null)));
        assert_eq!(value.typename().as_deref(), Some("Droid"));

        let Some(HostValue::List(friends)) = value.entry("friends") else {
            unreachable!("expected a list");
        };
        assert!(matches!(friends[..], [HostValue::Int(1), HostValue::Float(_), HostValue::Null]));

        assert!(HostValue::Int(3).entry("name").is_none());
    }
}
