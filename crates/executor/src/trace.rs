use error::ErrorPath;
use executor_tracing::span::{
    gql::GqlRequestSpan, resolver::ResolverInvocationSpan, GqlRecorderSpanExt, GqlRequestAttributes,
    GqlResponseAttributes, ResolverInvocationRecorderSpanExt,
};
use tracing::Span;

use crate::{Arguments, Response, ResolverError};

pub struct OperationTraceInfo<'a> {
    pub operation_type: &'static str,
    pub operation_name: Option<&'a str>,
}

pub struct FieldTraceInfo<'a> {
    pub parent_type: &'a str,
    pub field_name: &'a str,
    pub arguments: &'a Arguments,
    /// Plain member reads and meta fields, which can't fail or suspend.
    pub trivial: bool,
    pub path: &'a ErrorPath,
}

/// Hooks around operations and resolver invocations.
///
/// Resolver futures are instrumented with the span returned by
/// [`Tracer::field_span`], so anything the resolver logs is attached to it.
pub trait Tracer: Send + Sync + 'static {
    fn operation_span(&self, info: &OperationTraceInfo<'_>) -> Span;

    fn record_operation_end(&self, span: &Span, response: &Response);

    fn field_span(&self, info: &FieldTraceInfo<'_>) -> Span;

    fn record_field_error(&self, span: &Span, error: &ResolverError);
}

/// Emits the `graphql` and `resolver` spans.
#[derive(Debug, Default, Clone)]
pub struct DefaultTracer {
    trace_trivial: bool,
}

impl DefaultTracer {
    pub fn new(trace_trivial: bool) -> Self {
        DefaultTracer { trace_trivial }
    }
}

impl Tracer for DefaultTracer {
    fn operation_span(&self, info: &OperationTraceInfo<'_>) -> Span {
        let span = GqlRequestSpan::create();
        span.record_gql_request(GqlRequestAttributes {
            operation_type: info.operation_type,
            operation_name: info.operation_name,
        });
        span
    }

    fn record_operation_end(&self, span: &Span, response: &Response) {
        span.record_gql_response(GqlResponseAttributes {
            status: response.status(),
        });
    }

    fn field_span(&self, info: &FieldTraceInfo<'_>) -> Span {
        if info.trivial && !self.trace_trivial {
            return Span::none();
        }
        let span = ResolverInvocationSpan::new(info.parent_type, info.field_name)
            .trivial(info.trivial)
            .into_span();
        if !info.arguments.is_empty() {
            tracing::trace!(
                target: executor_tracing::span::EXECUTOR_TARGET,
                parent: &span,
                path = %info.path,
                arguments = ?info.arguments,
                "resolver invoked"
            );
        }
        span
    }

    fn record_field_error(&self, span: &Span, error: &ResolverError) {
        span.record_failure(&error.message);
    }
}

/// Disables every span.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn operation_span(&self, _info: &OperationTraceInfo<'_>) -> Span {
        Span::none()
    }

    fn record_operation_end(&self, _span: &Span, _response: &Response) {}

    fn field_span(&self, _info: &FieldTraceInfo<'_>) -> Span {
        Span::none()
    }

    fn record_field_error(&self, _span: &Span, _error: &ResolverError) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_fields_are_skipped_unless_requested() {
        let arguments = Arguments::default();
        let path = ErrorPath::default();
        let info = FieldTraceInfo {
            parent_type: "Human",
            field_name: "name",
            arguments: &arguments,
            trivial: true,
            path: &path,
        };

        assert!(DefaultTracer::new(false).field_span(&info).is_none());
        assert!(NoopTracer.field_span(&info).is_none());
    }
}
