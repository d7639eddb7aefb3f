use async_graphql_value::ConstValue;

use crate::ResolverError;

/// A custom scalar type known to the application.
///
/// `NAME` must match the scalar's name in the schema. Output values are
/// serialized with [`CustomScalar::to_json`], argument values are read back
/// with [`CustomScalar::from_input`].
pub trait CustomScalar: Send + Sync + Sized + 'static {
    const NAME: &'static str;

    fn to_json(&self) -> serde_json::Value;

    fn from_input(value: &ConstValue) -> Result<Self, ResolverError>;
}

/// Object-safe view of a [`CustomScalar`] value.
pub trait ErasedScalar: Send + Sync {
    fn name(&self) -> &'static str;

    fn to_json(&self) -> serde_json::Value;
}

impl<T: CustomScalar> ErasedScalar for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn to_json(&self) -> serde_json::Value {
        CustomScalar::to_json(self)
    }
}
