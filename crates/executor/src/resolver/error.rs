use std::fmt::Display;

use error::{ErrorCode, ErrorPath, GraphqlError, Location};

/// An error returned by a resolver.
///
/// Anything implementing [`Display`] converts into it, so `?` works on most
/// error types. Extensions end up in the `extensions` map of the GraphQL
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverError {
    pub message: String,
    pub extensions: Vec<(String, serde_json::Value)>,
    pub(crate) code: ErrorCode,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolverError {
            message: message.into(),
            extensions: Vec::new(),
            code: ErrorCode::ResolverError,
        }
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extensions.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub(crate) fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub(crate) fn into_graphql_error(self, path: ErrorPath, location: Location) -> GraphqlError {
        GraphqlError::new(self.message, self.code)
            .with_location(location)
            .with_path(path)
            .with_extensions(self.extensions)
    }
}

impl<T: Display + Send + Sync + 'static> From<T> for ResolverError {
    fn from(error: T) -> Self {
        ResolverError::new(error.to_string())
    }
}
