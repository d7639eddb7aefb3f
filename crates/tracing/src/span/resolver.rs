use tracing::{info_span, Span};

use crate::span::ResolverInvocationRecorderSpanExt;

/// The name of the resolver span
pub const RESOLVER_SPAN_NAME: &str = "resolver";

/// A span for a resolver invocation
pub struct ResolverInvocationSpan<'a> {
    parent_type: &'a str,
    field_name: &'a str,
    trivial: bool,
}

impl<'a> ResolverInvocationSpan<'a> {
    /// Create a new instance
    pub fn new(parent_type: &'a str, field_name: &'a str) -> Self {
        ResolverInvocationSpan {
            parent_type,
            field_name,
            trivial: false,
        }
    }

    /// Marks the resolver as trivial, a plain member read that cannot suspend
    pub fn trivial(mut self, trivial: bool) -> Self {
        self.trivial = trivial;
        self
    }

    /// Consume self and turn into a [Span]
    pub fn into_span(self) -> Span {
        info_span!(
            target: crate::span::EXECUTOR_TARGET,
            RESOLVER_SPAN_NAME,
            "otel.name" = %format!("{RESOLVER_SPAN_NAME}:{}.{}", self.parent_type, self.field_name),
            "resolver.parent_type" = self.parent_type,
            "resolver.field_name" = self.field_name,
            "resolver.trivial" = self.trivial,
            "resolver.invocation.error" = tracing::field::Empty,
            "resolver.invocation.is_error" = tracing::field::Empty,
        )
    }
}

impl ResolverInvocationRecorderSpanExt for Span {
    fn record_failure(&self, error: &str) {
        self.record("resolver.invocation.is_error", true);
        self.record("resolver.invocation.error", error);
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[test]
    fn span_is_enabled_with_a_subscriber() {
        let subscriber = tracing_subscriber::registry();
        tracing::subscriber::with_default(subscriber.with(tracing_subscriber::layer::Identity::new()), || {
            let span = ResolverInvocationSpan::new("Query", "hero").trivial(true).into_span();
            span.record_failure("boom");
            assert!(!span.is_disabled());
        });
    }
}
