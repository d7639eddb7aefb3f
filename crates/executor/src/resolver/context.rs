use std::{any::Any, sync::Arc};

use async_graphql_value::ConstValue;
use error::ErrorPath;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{CustomScalar, Data, ResolverError};

/// The coerced arguments of a field, with schema defaults applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Arc<IndexMap<String, ConstValue>>);

impl Arguments {
    pub(crate) fn new(arguments: IndexMap<String, ConstValue>) -> Self {
        Arguments(Arc::new(arguments))
    }

    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Deserializes all arguments into a single struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ResolverError> {
        let value = serde_json::to_value(self.0.as_ref())?;
        Ok(serde_json::from_value(value)?)
    }

    /// Deserializes one argument. A missing argument deserializes from `null`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ResolverError> {
        let value = match self.0.get(name) {
            Some(value) => serde_json::to_value(value)?,
            None => serde_json::Value::Null,
        };
        serde_json::from_value(value).map_err(|error| ResolverError::new(format!("Invalid argument `{name}`: {error}")))
    }

    pub fn scalar<T: CustomScalar>(&self, name: &str) -> Result<T, ResolverError> {
        match self.0.get(name) {
            Some(value) => T::from_input(value),
            None => Err(ResolverError::new(format!("Missing argument `{name}`"))),
        }
    }
}

/// What a resolver gets to know about the invocation.
#[derive(Clone)]
pub struct ResolverContext {
    pub(crate) path: ErrorPath,
    pub(crate) schema_data: Arc<Data>,
    pub(crate) request_data: Arc<Data>,
    pub(crate) cancellation: CancellationToken,
}

impl ResolverContext {
    /// Request data first, then data registered on the schema.
    pub fn data<D: Any + Send + Sync>(&self) -> Result<&D, ResolverError> {
        self.data_opt::<D>()
            .ok_or_else(|| ResolverError::new(format!("Data `{}` does not exist.", std::any::type_name::<D>())))
    }

    pub fn data_opt<D: Any + Send + Sync>(&self) -> Option<&D> {
        self.request_data.get::<D>().or_else(|| self.schema_data.get::<D>())
    }

    pub fn path(&self) -> &ErrorPath {
        &self.path
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Completes once the operation is cancelled or timed out.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::Name;

    use super::*;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct ReviewInput {
        episode: String,
        stars: i32,
        commentary: Option<String>,
    }

    #[test]
    fn deserializes_arguments() {
        let arguments = Arguments::new(IndexMap::from([
            ("episode".to_string(), ConstValue::Enum(Name::new("JEDI"))),
            ("stars".to_string(), ConstValue::Number(5.into())),
        ]));

        assert_eq!(
            arguments.deserialize::<ReviewInput>().unwrap(),
            ReviewInput {
                episode: "JEDI".to_string(),
                stars: 5,
                commentary: None
            }
        );
        assert_eq!(arguments.get_as::<i32>("stars").unwrap(), 5);
        assert_eq!(arguments.get_as::<Option<String>>("commentary").unwrap(), None);
        assert!(arguments.get_as::<String>("commentary").is_err());
    }

    #[test]
    fn request_data_shadows_schema_data() {
        let mut schema_data = Data::default();
        schema_data.insert(String::from("schema"));
        schema_data.insert(7_u8);
        let mut request_data = Data::default();
        request_data.insert(String::from("request"));

        let ctx = ResolverContext {
            path: ErrorPath::default(),
            schema_data: Arc::new(schema_data),
            request_data: Arc::new(request_data),
            cancellation: CancellationToken::new(),
        };

        assert_eq!(ctx.data::<String>().unwrap(), "request");
        assert_eq!(ctx.data::<u8>().unwrap(), &7);
        assert_eq!(
            ctx.data::<u16>().unwrap_err().message,
            "Data `u16` does not exist."
        );
    }
}
