use std::{
    any::{type_name, TypeId},
    future::Future,
    marker::PhantomData,
    sync::Arc,
};

use error::ErrorCode;
use futures::future::BoxFuture;
use futures_util::FutureExt;

use super::{HostObject, HostValue, IntoHostValue};
use crate::{Arguments, ResolverContext, ResolverError};

/// An application type whose values can back GraphQL objects.
///
/// `describe` lists the capabilities, fields and methods, the binder may
/// match against schema fields.
///
/// ```ignore
/// impl Object for Human {
///     fn describe(shape: &mut ObjectShapeBuilder<Self>) {
///         shape
///             .field("name", |human| human.name.clone())
///             .async_method("friends", |human, ctx| async move { human.load_friends(&ctx).await });
///     }
/// }
/// ```
pub trait Object: Send + Sync + Sized + 'static {
    fn describe(shape: &mut ObjectShapeBuilder<Self>);
}

/// Static description of the values a capability produces.
#[derive(Clone)]
pub enum Shape {
    Boolean,
    Int,
    Float,
    String,
    /// A custom scalar, by schema name.
    Scalar(&'static str),
    Optional(Box<Shape>),
    List(Box<Shape>),
    /// String-keyed associative values.
    Map(Box<Shape>),
    /// Dynamic JSON, checked at runtime only.
    Json,
    Object(ShapeRef),
    /// A closed set of object types, used for unions and interfaces.
    OneOf(Vec<ShapeRef>),
    Stream(Box<Shape>),
}

impl Shape {
    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Optional(_))
    }

    /// Strips every optional layer.
    pub fn required(&self) -> &Shape {
        match self {
            Shape::Optional(inner) => inner.required(),
            other => other,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Shape::Boolean => "bool".to_string(),
            Shape::Int => "integer".to_string(),
            Shape::Float => "float".to_string(),
            Shape::String => "string".to_string(),
            Shape::Scalar(name) => format!("scalar {name}"),
            Shape::Optional(inner) => format!("Option<{}>", inner.describe()),
            Shape::List(inner) => format!("Vec<{}>", inner.describe()),
            Shape::Map(inner) => format!("Map<String, {}>", inner.describe()),
            Shape::Json => "JSON".to_string(),
            Shape::Object(shape) => shape.type_name().to_string(),
            Shape::OneOf(variants) => {
                let names: Vec<_> = variants.iter().map(|variant| variant.type_name()).collect();
                format!("one of {}", names.join(" | "))
            }
            Shape::Stream(inner) => format!("EventStream<{}>", inner.describe()),
        }
    }

    pub(crate) fn key(&self) -> ShapeKey {
        match self {
            Shape::Boolean => ShapeKey::Boolean,
            Shape::Int => ShapeKey::Int,
            Shape::Float => ShapeKey::Float,
            Shape::String => ShapeKey::String,
            Shape::Scalar(name) => ShapeKey::Scalar(name),
            Shape::Optional(inner) => ShapeKey::Optional(Box::new(inner.key())),
            Shape::List(inner) => ShapeKey::List(Box::new(inner.key())),
            Shape::Map(inner) => ShapeKey::Map(Box::new(inner.key())),
            Shape::Json => ShapeKey::Json,
            Shape::Object(shape) => ShapeKey::Object(shape.type_id()),
            Shape::OneOf(variants) => ShapeKey::OneOf(variants.iter().map(ShapeRef::type_id).collect()),
            Shape::Stream(inner) => ShapeKey::Stream(Box::new(inner.key())),
        }
    }
}

/// Hashable identity of a [`Shape`], used to memoize bindings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ShapeKey {
    Boolean,
    Int,
    Float,
    String,
    Scalar(&'static str),
    Optional(Box<ShapeKey>),
    List(Box<ShapeKey>),
    Map(Box<ShapeKey>),
    Json,
    Object(TypeId),
    OneOf(Vec<TypeId>),
    Stream(Box<ShapeKey>),
}

/// Lazy reference to an [`Object`] type. The capabilities are only listed on
/// demand, so self-referencing types are fine.
#[derive(Clone, Copy)]
pub struct ShapeRef {
    type_id: TypeId,
    type_name: &'static str,
    describe: fn() -> ObjectShape,
}

impl ShapeRef {
    pub fn of<T: Object>() -> Self {
        ShapeRef {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            describe: describe::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn describe(&self) -> ObjectShape {
        (self.describe)()
    }
}

fn describe<T: Object>() -> ObjectShape {
    let mut builder = ObjectShapeBuilder::<T> {
        name: None,
        capabilities: Vec::new(),
        _object: PhantomData,
    };
    T::describe(&mut builder);
    ObjectShape {
        name: builder.name,
        type_name: type_name::<T>(),
        capabilities: builder.capabilities,
    }
}

/// The capabilities of an [`Object`] type.
pub struct ObjectShape {
    name: Option<&'static str>,
    type_name: &'static str,
    pub capabilities: Vec<Arc<Capability>>,
}

impl ObjectShape {
    /// The GraphQL object name this type stands for: the explicit name from
    /// [`ObjectShapeBuilder::name`], or the unqualified Rust type name.
    pub fn graphql_name(&self) -> &'static str {
        if let Some(name) = self.name {
            return name;
        }
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// A plain member read.
    Field,
    Method,
}

/// What a capability needs when invoked. Anything beyond a plain read makes
/// the invocation asynchronous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signature {
    pub context: bool,
    pub arguments: bool,
    pub fallible: bool,
    pub blocking: bool,
}

impl Signature {
    pub fn is_async(&self) -> bool {
        self.context || self.arguments || self.fallible || self.blocking
    }
}

pub struct Capability {
    pub name: &'static str,
    pub kind: CapabilityKind,
    pub shape: Shape,
    pub signature: Signature,
    pub(crate) invoke: Invoke,
}

type SyncInvoke = dyn Fn(&HostObject, &Arguments) -> Result<HostValue, ResolverError> + Send + Sync;
type AsyncInvoke =
    dyn Fn(HostObject, ResolverContext, Arguments) -> BoxFuture<'static, Result<HostValue, ResolverError>> + Send + Sync;

#[derive(Clone)]
pub(crate) enum Invoke {
    Sync(Arc<SyncInvoke>),
    /// Synchronous but potentially slow, run on the blocking pool.
    Blocking(Arc<SyncInvoke>),
    Async(Arc<AsyncInvoke>),
}

pub struct ObjectShapeBuilder<T> {
    name: Option<&'static str>,
    capabilities: Vec<Arc<Capability>>,
    _object: PhantomData<fn(T)>,
}

impl<T: Object> ObjectShapeBuilder<T> {
    /// Names the GraphQL object this type stands for in unions and interfaces.
    pub fn name(&mut self, name: &'static str) -> &mut Self {
        self.name = Some(name);
        self
    }

    pub fn field<R, F>(&mut self, name: &'static str, read: F) -> &mut Self
    where
        R: IntoHostValue,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.push(
            name,
            CapabilityKind::Field,
            R::shape(),
            Signature::default(),
            Invoke::Sync(Arc::new(move |object, _| Ok(read(downcast(object)?).into_host_value()))),
        )
    }

    pub fn method<R, F>(&mut self, name: &'static str, resolve: F) -> &mut Self
    where
        R: IntoHostValue,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.push(
            name,
            CapabilityKind::Method,
            R::shape(),
            Signature::default(),
            Invoke::Sync(Arc::new(move |object, _| Ok(resolve(downcast(object)?).into_host_value()))),
        )
    }

    pub fn fallible_method<R, F>(&mut self, name: &'static str, resolve: F) -> &mut Self
    where
        R: IntoHostValue,
        F: Fn(&T) -> Result<R, ResolverError> + Send + Sync + 'static,
    {
        self.push(
            name,
            CapabilityKind::Method,
            R::shape(),
            Signature {
                fallible: true,
                ..Default::default()
            },
            Invoke::Sync(Arc::new(move |object, _| {
                resolve(downcast(object)?).map(IntoHostValue::into_host_value)
            })),
        )
    }

    pub fn method_with_args<R, F>(&mut self, name: &'static str, resolve: F) -> &mut Self
    where
        R: IntoHostValue,
        F: Fn(&T, &Arguments) -> Result<R, ResolverError> + Send + Sync + 'static,
    {
        self.push(
            name,
            CapabilityKind::Method,
            R::shape(),
            Signature {
                arguments: true,
                fallible: true,
                ..Default::default()
            },
            Invoke::Sync(Arc::new(move |object, arguments| {
                resolve(downcast(object)?, arguments).map(IntoHostValue::into_host_value)
            })),
        )
    }

    /// A method run on the blocking thread pool.
    pub fn blocking_method<R, F>(&mut self, name: &'static str, resolve: F) -> &mut Self
    where
        R: IntoHostValue,
        F: Fn(&T) -> Result<R, ResolverError> + Send + Sync + 'static,
    {
        self.push(
            name,
            CapabilityKind::Method,
            R::shape(),
            Signature {
                fallible: true,
                blocking: true,
                ..Default::default()
            },
            Invoke::Blocking(Arc::new(move |object, _| {
                resolve(downcast(object)?).map(IntoHostValue::into_host_value)
            })),
        )
    }

    pub fn async_method<R, F, Fut>(&mut self, name: &'static str, resolve: F) -> &mut Self
    where
        R: IntoHostValue,
        F: Fn(Arc<T>, ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ResolverError>> + Send + 'static,
    {
        self.push(
            name,
            CapabilityKind::Method,
            R::shape(),
            Signature {
                context: true,
                fallible: true,
                ..Default::default()
            },
            Invoke::Async(Arc::new(move |object, ctx, _| match object.downcast::<T>() {
                Some(this) => resolve(this, ctx).map(|result| result.map(IntoHostValue::into_host_value)).boxed(),
                None => futures::future::ready(Err(mismatch::<T>())).boxed(),
            })),
        )
    }

    pub fn async_method_with_args<R, F, Fut>(&mut self, name: &'static str, resolve: F) -> &mut Self
    where
        R: IntoHostValue,
        F: Fn(Arc<T>, ResolverContext, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ResolverError>> + Send + 'static,
    {
        self.push(
            name,
            CapabilityKind::Method,
            R::shape(),
            Signature {
                context: true,
                arguments: true,
                fallible: true,
                ..Default::default()
            },
            Invoke::Async(Arc::new(move |object, ctx, arguments| match object.downcast::<T>() {
                Some(this) => resolve(this, ctx, arguments)
                    .map(|result| result.map(IntoHostValue::into_host_value))
                    .boxed(),
                None => futures::future::ready(Err(mismatch::<T>())).boxed(),
            })),
        )
    }

    fn push(
        &mut self,
        name: &'static str,
        kind: CapabilityKind,
        shape: Shape,
        signature: Signature,
        invoke: Invoke,
    ) -> &mut Self {
        self.capabilities.push(Arc::new(Capability {
            name,
            kind,
            shape,
            signature,
            invoke,
        }));
        self
    }
}

fn downcast<T: Object>(object: &HostObject) -> Result<&T, ResolverError> {
    object.downcast_ref::<T>().ok_or_else(mismatch::<T>)
}

fn mismatch<T>() -> ResolverError {
    ResolverError::new(format!("expected a value of type `{}`", type_name::<T>())).with_code(ErrorCode::InternalServerError)
}
