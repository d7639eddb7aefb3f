use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;

use super::{CustomScalar, EventStream, HostObject, HostValue, Object, Shape, ShapeRef};

/// Conversion of resolver return values into [`HostValue`].
///
/// `shape` must describe every value `into_host_value` can produce: the binder
/// relies on it to check the schema before execution.
pub trait IntoHostValue: Send + 'static {
    fn shape() -> Shape;

    fn into_host_value(self) -> HostValue;
}

impl IntoHostValue for bool {
    fn shape() -> Shape {
        Shape::Boolean
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Boolean(self)
    }
}

macro_rules! integer {
    ($($ty:ty),*) => {
        $(
            impl IntoHostValue for $ty {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn into_host_value(self) -> HostValue {
                    HostValue::Int(i64::from(self))
                }
            }
        )*
    };
}

integer!(i8, i16, i32, i64, u8, u16, u32);

impl IntoHostValue for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Float(f64::from(self))
    }
}

impl IntoHostValue for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Float(self)
    }
}

impl IntoHostValue for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn into_host_value(self) -> HostValue {
        HostValue::String(self)
    }
}

impl IntoHostValue for &'static str {
    fn shape() -> Shape {
        Shape::String
    }

    fn into_host_value(self) -> HostValue {
        HostValue::String(self.to_string())
    }
}

impl<T: IntoHostValue> IntoHostValue for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn into_host_value(self) -> HostValue {
        self.map(IntoHostValue::into_host_value).unwrap_or_default()
    }
}

impl<T: IntoHostValue> IntoHostValue for Vec<T> {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn into_host_value(self) -> HostValue {
        HostValue::List(self.into_iter().map(IntoHostValue::into_host_value).collect())
    }
}

impl<T: IntoHostValue> IntoHostValue for IndexMap<String, T> {
    fn shape() -> Shape {
        Shape::Map(Box::new(T::shape()))
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Map(Arc::new(
            self.into_iter()
                .map(|(key, value)| (key, value.into_host_value()))
                .collect(),
        ))
    }
}

impl<T: IntoHostValue> IntoHostValue for HashMap<String, T> {
    fn shape() -> Shape {
        Shape::Map(Box::new(T::shape()))
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Map(Arc::new(
            self.into_iter()
                .map(|(key, value)| (key, value.into_host_value()))
                .collect(),
        ))
    }
}

impl IntoHostValue for serde_json::Value {
    fn shape() -> Shape {
        Shape::Json
    }

    fn into_host_value(self) -> HostValue {
        HostValue::from_json(self)
    }
}

impl<T: Object> IntoHostValue for Arc<T> {
    fn shape() -> Shape {
        Shape::Object(ShapeRef::of::<T>())
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Object(HostObject::new(self))
    }
}

impl<T: CustomScalar> IntoHostValue for T {
    fn shape() -> Shape {
        Shape::Scalar(T::NAME)
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Scalar(Arc::new(self))
    }
}

impl<T: IntoHostValue> IntoHostValue for EventStream<T> {
    fn shape() -> Shape {
        Shape::Stream(Box::new(T::shape()))
    }

    fn into_host_value(self) -> HostValue {
        HostValue::Stream(self.into_source())
    }
}
