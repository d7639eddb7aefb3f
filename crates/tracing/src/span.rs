use crate::gql_response_status::GraphqlResponseStatus;

/// Tracing target for logging
pub const EXECUTOR_TARGET: &str = "graph-executor";

/// GraphQL operation span
pub mod gql;
/// Resolver span
pub mod resolver;

/// Extension trait to record gql request attributes
pub trait GqlRecorderSpanExt {
    /// Record GraphQL request attributes in the span
    fn record_gql_request(&self, attributes: GqlRequestAttributes<'_>);
    /// Record GraphQL response attributes in the span
    fn record_gql_response(&self, attributes: GqlResponseAttributes);
}

/// Wraps attributes of a graphql request intended to be recorded
pub struct GqlRequestAttributes<'a> {
    /// GraphQL operation type
    pub operation_type: &'a str,
    /// GraphQL operation name
    pub operation_name: Option<&'a str>,
}

/// Wraps attributes of a graphql response intended to be recorded
pub struct GqlResponseAttributes {
    /// Outcome of the operation
    pub status: GraphqlResponseStatus,
}

/// Extension trait to record resolver invocation attributes
pub trait ResolverInvocationRecorderSpanExt {
    /// Recording error details in the span
    fn record_failure(&self, error: &str);
}
