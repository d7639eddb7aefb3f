mod code;
mod path;

pub use code::*;
pub use path::*;
use std::borrow::Cow;

/// A position inside the executed document, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlError {
    pub message: Cow<'static, str>,
    pub code: ErrorCode,
    pub locations: Vec<Location>,
    pub path: Option<ErrorPath>,
    // Serialized as a map, but kept as a Vec for efficiency.
    pub extensions: Vec<(Cow<'static, str>, serde_json::Value)>,
}

impl GraphqlError {
    pub fn new(message: impl Into<Cow<'static, str>>, code: ErrorCode) -> Self {
        GraphqlError {
            message: message.into(),
            code,
            locations: Vec::new(),
            path: None,
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<ErrorPath>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        self.extensions.push((key, value.into()));
        self
    }

    #[must_use]
    pub fn with_extensions(
        mut self,
        extensions: impl IntoIterator<Item = (impl Into<Cow<'static, str>>, impl Into<serde_json::Value>)>,
    ) -> Self {
        for (key, value) in extensions {
            self.extensions.push((key.into(), value.into()));
        }
        self
    }

    pub fn extension(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions
            .iter()
            .find_map(|(name, value)| (name == key).then_some(value))
    }

    // ------------- //
    // Common errors //
    // ------------- //

    pub fn internal_server_error() -> Self {
        GraphqlError::new("Internal server error", ErrorCode::InternalServerError)
    }

    pub fn operation_cancelled() -> Self {
        GraphqlError::new("Operation was cancelled", ErrorCode::OperationCancelled)
    }

    pub fn operation_timeout() -> Self {
        GraphqlError::new("Operation timed out", ErrorCode::OperationTimeout)
    }
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.message.fmt(f)
    }
}

/// The `code` extension is only added when the error doesn't carry one already, resolvers are free
/// to set their own.
impl serde::Serialize for GraphqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", &self.message)?;
        if !self.locations.is_empty() {
            map.serialize_entry("locations", &self.locations)?;
        }
        if let Some(path) = &self.path {
            map.serialize_entry("path", path)?;
        }
        map.serialize_entry("extensions", &SerializableExtensions(self))?;
        map.end()
    }
}

struct SerializableExtensions<'a>(&'a GraphqlError);

impl serde::Serialize for SerializableExtensions<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let error = self.0;
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &error.extensions {
            map.serialize_entry(key, value)?;
        }
        if error.extension("code").is_none() {
            map.serialize_entry("code", &error.code)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_user_code_over_engine_code() {
        let error = GraphqlError::new("error [NotFound]: Product not found.", ErrorCode::ResolverError)
            .with_path("product")
            .with_location(Location::new(1, 3))
            .with_extension("code", "NotFound");

        insta::assert_json_snapshot!(error, @r###"
        {
          "message": "error [NotFound]: Product not found.",
          "locations": [
            {
              "line": 1,
              "column": 3
            }
          ],
          "path": [
            "product"
          ],
          "extensions": {
            "code": "NotFound"
          }
        }
        "###);
    }

    #[test]
    fn serializes_engine_code_when_missing() {
        let error = GraphqlError::operation_cancelled();

        insta::assert_json_snapshot!(error, @r###"
        {
          "message": "Operation was cancelled",
          "extensions": {
            "code": "OPERATION_CANCELLED"
          }
        }
        "###);
    }
}
