/// Outcome of a GraphQL operation from the point of view of observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphqlResponseStatus {
    /// No errors at all
    Success,
    /// Field errors happened, data is still present
    FieldError {
        /// Number of errors in the response
        count: u64,
        /// Whether null propagation reached the top-level `data`
        data_is_null: bool,
    },
    /// The operation never executed, `data` is absent
    RequestError {
        /// Number of errors in the response
        count: u64,
    },
}

impl GraphqlResponseStatus {
    /// Static label used as span attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphqlResponseStatus::Success => "SUCCESS",
            GraphqlResponseStatus::FieldError { data_is_null, .. } => {
                if *data_is_null {
                    "FIELD_ERROR_NULL_DATA"
                } else {
                    "FIELD_ERROR"
                }
            }
            GraphqlResponseStatus::RequestError { .. } => "REQUEST_ERROR",
        }
    }

    /// Whether any error was reported
    pub fn is_success(&self) -> bool {
        matches!(self, GraphqlResponseStatus::Success)
    }
}
