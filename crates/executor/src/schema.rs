use std::{any::Any, sync::Arc};

use ::error::{ErrorCode, GraphqlError, Location};
use async_graphql_parser::{parse_query, types::OperationType};
use futures::stream::BoxStream;
use tracing::Instrument;

use crate::{
    bind::{bind, BindError, BoundSchema, RootValue},
    execution,
    plan::{self, operation_type_name, Plan},
    registry::Registry,
    resolver::{ResolveStrategy, ResolverChain},
    subscription,
    trace::{DefaultTracer, OperationTraceInfo, Tracer},
    Data, ExecutorConfig, Request, Response,
};

pub(crate) struct SchemaInner {
    pub registry: Registry,
    pub bound: BoundSchema,
    pub chain: ResolverChain,
    pub config: ExecutorConfig,
    pub tracer: Arc<dyn Tracer>,
    pub data: Arc<Data>,
}

/// A type schema bound to application values, ready to execute operations.
///
/// Cloning is cheap, every clone shares the same bound schema.
#[derive(Clone)]
pub struct Schema(pub(crate) Arc<SchemaInner>);

pub struct SchemaBuilder {
    registry: Registry,
    root: RootValue,
    config: ExecutorConfig,
    tracer: Option<Arc<dyn Tracer>>,
    strategies: Vec<Arc<dyn ResolveStrategy>>,
    data: Data,
}

impl SchemaBuilder {
    #[must_use]
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default tracer, which emits the `graphql` and `resolver`
    /// spans.
    #[must_use]
    pub fn tracer(mut self, tracer: impl Tracer) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    /// Adds a resolver strategy, consulted before the built-in ones except
    /// for meta fields. Strategies run in the order they were added.
    #[must_use]
    pub fn strategy(mut self, strategy: impl ResolveStrategy) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Data shared by every operation, see [`ResolverContext::data`](crate::ResolverContext::data).
    #[must_use]
    pub fn data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data.insert(data);
        self
    }

    /// Binds the registry to the root value. Fails if any reachable field
    /// can't be resolved from the declared application types.
    pub fn finish(self) -> Result<Schema, BindError> {
        let bound = bind(&self.registry, self.root)?;
        let tracer = self
            .tracer
            .unwrap_or_else(|| Arc::new(DefaultTracer::new(self.config.trace_trivial_fields)));

        Ok(Schema(Arc::new(SchemaInner {
            registry: self.registry,
            bound,
            chain: ResolverChain::new(self.strategies),
            config: self.config,
            tracer,
            data: Arc::new(self.data),
        })))
    }
}

impl Schema {
    pub fn build(registry: Registry, root: RootValue) -> SchemaBuilder {
        SchemaBuilder {
            registry,
            root,
            config: ExecutorConfig::default(),
            tracer: None,
            strategies: Vec::new(),
            data: Data::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.0.registry
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.0.config
    }

    /// Executes a query or a mutation.
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let Request {
            query,
            operation_name,
            variables,
            data,
            cancellation,
        } = request.into();

        let plan = match self.prepare(&query, operation_name.as_deref(), &variables) {
            Ok(plan) => plan,
            Err(response) => return response,
        };

        if plan.operation_type == OperationType::Subscription {
            return Response::request_error(GraphqlError::new(
                "Subscriptions must be executed through `Schema::subscribe`.",
                ErrorCode::BadRequest,
            ));
        }

        let span = self.0.tracer.operation_span(&OperationTraceInfo {
            operation_type: operation_type_name(plan.operation_type),
            operation_name: plan.operation_name.as_deref(),
        });

        let response = execution::execute(self.0.clone(), plan, Arc::new(data), cancellation.unwrap_or_default())
            .instrument(span.clone())
            .await;

        self.0.tracer.record_operation_end(&span, &response);
        response
    }

    /// Executes a subscription, one response per event. Queries and
    /// mutations are accepted too and produce a single response.
    pub fn subscribe(&self, request: impl Into<Request>) -> BoxStream<'static, Response> {
        subscription::subscribe(self.clone(), request.into())
    }

    /// Parses and plans an operation. Failures are turned into the
    /// response to send back.
    pub(crate) fn prepare(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: &async_graphql_value::Variables,
    ) -> Result<Plan, Response> {
        let document = parse_query(query).map_err(|error| {
            tracing::debug!("operation parsing failed: {error}");
            let locations = error
                .positions()
                .map(|pos| Location::new(pos.line, pos.column))
                .collect::<Vec<_>>();
            Response::request_error(
                GraphqlError::new(error.to_string(), ErrorCode::OperationParsingError).with_locations(locations),
            )
        })?;

        plan::plan(&self.0, &document, operation_name, variables).map_err(|error| {
            tracing::debug!("operation planning failed: {error}");
            Response::request_error(error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        let registry = Registry::from_sdl("type Query { hello: String! }").unwrap();
        Schema::build(registry, RootValue::json(serde_json::json!({ "hello": "world" })))
            .finish()
            .unwrap()
    }

    #[tokio::test]
    async fn parse_errors_are_request_errors() {
        let response = schema().execute("{ hello ").await;
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].code, ErrorCode::OperationParsingError);
        assert!(!response.errors[0].locations.is_empty());
    }

    #[tokio::test]
    async fn executes_json_roots() {
        let response = schema().execute("{ hello }").await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "hello": "world"
          }
        }
        "###);
    }
}
