//! Binding of the type schema to application values.
//!
//! Binding walks the schema from the root operation types and pairs every
//! reachable object field with a way to resolve it, checking the declared
//! shapes against the schema along the way. All mismatches are reported
//! before any operation runs. The result is immutable and shared by every
//! execution.

mod binder;
mod error;

use std::{any::TypeId, ops::Index, sync::Arc};

use indexmap::{IndexMap, IndexSet};

pub use self::error::BindError;
pub(crate) use binder::bind;

use crate::{
    host::{HostObject, Object, Shape},
    registry::{MetaInputValue, TypeReference},
    resolver::FieldResolver,
    HostValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundObjectId(usize);

pub struct BoundSchema {
    objects: Vec<BoundObject>,
    pub(crate) query: BoundRoot,
    pub(crate) mutation: Option<BoundRoot>,
    pub(crate) subscription: Option<BoundRoot>,
}

impl BoundSchema {
    pub fn objects(&self) -> impl Iterator<Item = &BoundObject> {
        self.objects.iter()
    }
}

impl Index<BoundObjectId> for BoundSchema {
    type Output = BoundObject;

    fn index(&self, id: BoundObjectId) -> &BoundObject {
        &self.objects[id.0]
    }
}

pub(crate) struct BoundRoot {
    pub object: BoundObjectId,
    pub value: HostValue,
}

/// An object type paired with the application shape backing it. The same
/// GraphQL type may be bound several times, once per shape.
pub struct BoundObject {
    pub type_name: String,
    pub host: String,
    pub fields: IndexMap<String, Arc<BoundField>>,
}

pub struct BoundField {
    pub name: String,
    pub parent_type: String,
    pub ty: TypeReference,
    pub args: IndexMap<String, MetaInputValue>,
    pub resolver: FieldResolver,
    /// For subscription root fields, the type of each event.
    pub bound_type: BoundType,
    pub trace_label: String,
    /// Whether invoking the resolver may suspend. Fields that can't are
    /// resolved inline by the executor.
    pub is_async: bool,
}

impl BoundField {
    /// A meta field whose value is computed by the planner.
    pub(crate) fn fixed(
        parent_type: &str,
        name: &str,
        ty: TypeReference,
        bound_type: BoundType,
        value: crate::resolver::ResolverResult,
    ) -> Self {
        BoundField {
            name: name.to_string(),
            parent_type: parent_type.to_string(),
            ty,
            args: IndexMap::new(),
            resolver: FieldResolver::Fixed(value),
            bound_type,
            trace_label: format!("{parent_type}.{name}"),
            is_async: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BoundType {
    NonNull(Arc<BoundType>),
    List(Arc<BoundType>),
    Scalar(ScalarKind),
    Enum(Arc<EnumBinding>),
    Object(BoundObjectId),
    Abstract(Arc<AbstractBinding>),
    /// Already response-shaped JSON, written as is.
    Verbatim,
}

impl BoundType {
    pub fn is_nullable(&self) -> bool {
        !matches!(self, BoundType::NonNull(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Boolean,
    Id,
    Custom(Arc<str>),
}

impl ScalarKind {
    fn from_name(name: &str) -> Self {
        match name {
            "Int" => ScalarKind::Int,
            "Float" => ScalarKind::Float,
            "String" => ScalarKind::String,
            "Boolean" => ScalarKind::Boolean,
            "ID" => ScalarKind::Id,
            other => ScalarKind::Custom(other.into()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Id => "ID",
            ScalarKind::Custom(name) => name,
        }
    }

    fn accepts(&self, shape: &Shape) -> bool {
        match (self, shape) {
            (_, Shape::Json) => true,
            (ScalarKind::Int, Shape::Int) => true,
            (ScalarKind::Float, Shape::Float | Shape::Int) => true,
            (ScalarKind::String, Shape::String) => true,
            (ScalarKind::Boolean, Shape::Boolean) => true,
            (ScalarKind::Id, Shape::String | Shape::Int) => true,
            (ScalarKind::Custom(name), Shape::Scalar(other)) => name.as_ref() == *other,
            (ScalarKind::Custom(_), Shape::String | Shape::Int | Shape::Float | Shape::Boolean) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct EnumBinding {
    pub name: String,
    pub values: IndexSet<String>,
}

#[derive(Debug)]
pub struct AbstractBinding {
    pub name: String,
    pub options: Vec<AbstractOption>,
}

#[derive(Debug)]
pub struct AbstractOption {
    pub type_name: String,
    pub object: BoundObjectId,
    /// The application type of the option, `None` for keyed values
    /// discriminated by their `__typename` entry.
    pub host: Option<TypeId>,
}

impl AbstractBinding {
    /// Index of the option matching the runtime value.
    pub fn select(&self, value: &HostValue) -> Option<usize> {
        match value {
            HostValue::Object(object) => {
                let type_id = object.type_id();
                self.options.iter().position(|option| option.host == Some(type_id))
            }
            other => {
                let typename = other.typename()?;
                self.options
                    .iter()
                    .position(|option| option.host.is_none() && option.type_name == typename)
            }
        }
    }
}

/// The values operations start from, one per root operation type.
pub struct RootValue {
    pub(crate) query: (HostValue, Shape),
    pub(crate) mutation: Option<(HostValue, Shape)>,
    pub(crate) subscription: Option<(HostValue, Shape)>,
}

impl RootValue {
    pub fn new<Q: Object>(query: Q) -> Self {
        Self::from_arc(Arc::new(query))
    }

    pub fn from_arc<Q: Object>(query: Arc<Q>) -> Self {
        RootValue {
            query: object_root(query),
            mutation: None,
            subscription: None,
        }
    }

    /// A root made of plain JSON, every field is looked up by name.
    pub fn json(query: serde_json::Value) -> Self {
        RootValue {
            query: (HostValue::from_json(query), Shape::Json),
            mutation: None,
            subscription: None,
        }
    }

    #[must_use]
    pub fn mutation<M: Object>(mut self, mutation: M) -> Self {
        self.mutation = Some(object_root(Arc::new(mutation)));
        self
    }

    #[must_use]
    pub fn subscription<S: Object>(mut self, subscription: S) -> Self {
        self.subscription = Some(object_root(Arc::new(subscription)));
        self
    }
}

fn object_root<T: Object>(value: Arc<T>) -> (HostValue, Shape) {
    let object = HostObject::new(value);
    let shape = Shape::Object(object.shape());
    (HostValue::Object(object), shape)
}
