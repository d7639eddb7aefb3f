#![allow(unused_crate_dependencies, clippy::panic)]

mod fixtures;

use std::sync::{Arc, Mutex};

use graph_executor::{
    bind::BoundField,
    trace::{FieldTraceInfo, OperationTraceInfo},
    FieldCall, HostValue, Resolution, ResolveStrategy, ResolverError, Response, Schema, Tracer,
};
use tracing::Span;

/// Hides where people live.
struct Redact;

impl ResolveStrategy for Redact {
    fn resolve(&self, call: &FieldCall<'_>) -> Option<Resolution> {
        (call.field.parent_type == "Human" && call.field.name == "homePlanet")
            .then(|| Resolution::Ready(Ok(HostValue::String("[redacted]".into()))))
    }

    fn forces_async(&self, field: &BoundField) -> bool {
        field.name == "homePlanet"
    }
}

#[derive(Clone, Default)]
struct Recorder {
    fields: Arc<Mutex<Vec<String>>>,
    operations: Arc<Mutex<Vec<String>>>,
}

impl Tracer for Recorder {
    fn operation_span(&self, info: &OperationTraceInfo<'_>) -> Span {
        self.operations.lock().unwrap().push(format!(
            "{} {}",
            info.operation_type,
            info.operation_name.unwrap_or("<anonymous>")
        ));
        Span::none()
    }

    fn record_operation_end(&self, _: &Span, response: &Response) {
        self.operations
            .lock()
            .unwrap()
            .push(format!("{} errors", response.errors.len()));
    }

    fn field_span(&self, info: &FieldTraceInfo<'_>) -> Span {
        if !info.trivial {
            self.fields
                .lock()
                .unwrap()
                .push(format!("{}.{} at {}", info.parent_type, info.field_name, info.path));
        }
        Span::none()
    }

    fn record_field_error(&self, _: &Span, error: &ResolverError) {
        self.fields.lock().unwrap().push(format!("failed: {}", error.message));
    }
}

#[tokio::test]
async fn custom_strategies_run_before_builtin_ones() {
    let schema = Schema::build(fixtures::registry(), fixtures::root())
        .strategy(Redact)
        .data(fixtures::Database::new())
        .finish()
        .unwrap();

    let response = schema
        .execute(r#"{ human(id: "1000") { name homePlanet __typename } }"#)
        .await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "human": {
          "name": "Luke Skywalker",
          "homePlanet": "[redacted]",
          "__typename": "Human"
        }
      }
    }
    "###);
}

#[tokio::test]
async fn tracer_sees_operations_and_resolver_calls() {
    let recorder = Recorder::default();
    let schema = Schema::build(fixtures::registry(), fixtures::root())
        .tracer(recorder.clone())
        .data(fixtures::Database::new())
        .finish()
        .unwrap();

    let response = schema
        .execute(r#"query Lookup { droid(id: "2000") { name } product(id: "1007") { name } }"#)
        .await;
    assert_eq!(response.errors.len(), 1);

    let operations = recorder.operations.lock().unwrap().clone();
    pretty_assertions::assert_eq!(operations, ["query Lookup", "1 errors"]);

    let mut fields = recorder.fields.lock().unwrap().clone();
    // Sibling root fields run concurrently.
    fields.sort();
    pretty_assertions::assert_eq!(
        fields,
        [
            "Query.droid at droid",
            "Query.product at product",
            "failed: error [NotFound]: Product not found.",
        ]
    );
}
