#![forbid(missing_docs)]

//! Graph executor [tracing](https://docs.rs/tracing/latest/tracing/) integration

/// Status of a GraphQL response, as recorded on spans
pub mod gql_response_status;
/// Spans that are represented using types
pub mod span;
