mod value;

use error::GraphqlError;
use executor_tracing::gql_response_status::GraphqlResponseStatus;
use indexmap::IndexMap;
use serde::ser::SerializeMap;

pub use value::{ResponseObject, ResponseValue};

/// The result of executing one operation, or one subscription event.
///
/// `data` is `None` when the operation never started executing, in which case
/// `errors` holds the reason. A `Some(ResponseValue::Null)` means null
/// propagation reached the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub data: Option<ResponseValue>,
    pub errors: Vec<GraphqlError>,
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl Response {
    pub(crate) fn request_error(error: impl Into<GraphqlError>) -> Self {
        Response {
            data: None,
            errors: vec![error.into()],
            extensions: IndexMap::new(),
        }
    }

    pub(crate) fn with_data(data: ResponseValue, errors: Vec<GraphqlError>) -> Self {
        Response {
            data: Some(data),
            errors,
            extensions: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn status(&self) -> GraphqlResponseStatus {
        match &self.data {
            _ if self.errors.is_empty() => GraphqlResponseStatus::Success,
            None => GraphqlResponseStatus::RequestError {
                count: self.errors.len() as u64,
            },
            Some(data) => GraphqlResponseStatus::FieldError {
                count: self.errors.len() as u64,
                data_is_null: data.is_null(),
            },
        }
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// `errors` comes first so clients streaming the body see failures early.
impl serde::Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", data)?;
        }
        if !self.extensions.is_empty() {
            map.serialize_entry("extensions", &self.extensions)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use error::{ErrorCode, GraphqlError};

    use super::*;

    #[test]
    fn serializes_errors_before_data() {
        let mut hero = ResponseObject::with_capacity(2);
        hero.push(Arc::from("name"), ResponseValue::String("R2-D2".into()));
        hero.push(Arc::from("friends"), ResponseValue::Null);
        let mut data = ResponseObject::default();
        data.push(Arc::from("hero"), ResponseValue::Object(hero));

        let response = Response::with_data(
            ResponseValue::Object(data),
            vec![GraphqlError::new("boom", ErrorCode::ResolverError).with_path(("hero", "friends"))],
        )
        .with_extension("traceId", "abc");

        insta::assert_snapshot!(String::from_utf8(response.to_json_bytes().unwrap()).unwrap(), @r###"{"errors":[{"message":"boom","path":["hero","friends"],"extensions":{"code":"RESOLVER_ERROR"}}],"data":{"hero":{"name":"R2-D2","friends":null}},"extensions":{"traceId":"abc"}}"###);
        assert_eq!(
            serde_json::to_value(&response).unwrap()["data"],
            response.data.clone().unwrap().into_json()
        );
    }

    #[test]
    fn request_errors_have_no_data() {
        let response = Response::request_error(GraphqlError::new("Operation name required in request.", ErrorCode::OperationPlanningError));

        assert!(matches!(response.status(), GraphqlResponseStatus::RequestError { count: 1 }));
        insta::assert_json_snapshot!(response, @r###"
        {
          "errors": [
            {
              "message": "Operation name required in request.",
              "extensions": {
                "code": "OPERATION_PLANNING_ERROR"
              }
            }
          ]
        }
        "###);
    }
}
