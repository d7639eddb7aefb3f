//! Walks a plan against application values and builds the response.
//!
//! Field errors travel up as `Err` until they reach a position whose type is
//! nullable, which is then written as `null` while the error is recorded on
//! the shared context. Cancellation travels all the way up.

mod complete;
mod container;
mod context;

use std::{future::Future, sync::Arc, time::Duration};

use ::error::{ErrorPath, GraphqlError};
use async_graphql_parser::types::OperationType;
use tokio_util::sync::CancellationToken;

use self::container::{finish_field, resolve_container, resolve_field_value, ExecutionMode};
pub(crate) use self::context::{Ctx, ExecutionContext, ExecutionError};

use crate::{
    host::{EventReceiver, HostValue},
    plan::{Plan, SelectionSet},
    resolver::ResolverResult,
    response::{ResponseObject, ResponseValue},
    schema::SchemaInner,
    Data, Response,
};

/// Executes a query or a mutation.
pub(crate) async fn execute(
    schema: Arc<SchemaInner>,
    plan: Plan,
    request_data: Arc<Data>,
    cancellation: CancellationToken,
) -> Response {
    let mode = match plan.operation_type {
        OperationType::Mutation => ExecutionMode::Serial,
        _ => ExecutionMode::Concurrent,
    };
    let timeout = schema.config.operation_timeout;
    let selection_set = plan.selection_set;
    let root_value = plan.root_value;

    run(schema, request_data, cancellation, timeout, move |ctx| async move {
        resolve_container(&ctx, selection_set, root_value, ErrorPath::default(), mode).await
    })
    .await
}

/// Resolves the single root field of a subscription into its event source.
/// On failure the response to send in place of the stream is returned.
pub(crate) async fn subscribe(
    schema: Arc<SchemaInner>,
    plan: &Plan,
    request_data: Arc<Data>,
    cancellation: CancellationToken,
) -> Result<EventReceiver, Response> {
    if cancellation.is_cancelled() {
        return Err(Response::request_error(GraphqlError::operation_cancelled()));
    }

    let ctx = Arc::new(ExecutionContext::new(schema, request_data, cancellation.child_token()));
    let Some(field) = plan.selection_set.fields.first() else {
        return Err(Response::request_error(GraphqlError::internal_server_error()));
    };
    let path = ErrorPath::default().child(&field.response_key);

    let result = match resolve_field_value(&ctx, field, &plan.root_value, &path).await {
        Ok(HostValue::Stream(source)) => match source.take() {
            Some(receiver) => return Ok(receiver),
            None => Err(ExecutionError::Field(
                GraphqlError::new(
                    format!("The event stream of `{}` was already consumed", field.field.trace_label),
                    ::error::ErrorCode::InternalServerError,
                )
                .with_location(field.location)
                .with_path(path),
            )),
        },
        Ok(other) => Err(ExecutionError::Field(
            GraphqlError::new(
                format!("Expected an event stream for `{}`, found {}", field.field.trace_label, other.kind()),
                ::error::ErrorCode::TypeMismatch,
            )
            .with_location(field.location)
            .with_path(path),
        )),
        Err(error) => Err(error),
    };

    let result = finish_field(&ctx, field, result).map(|value| {
        let mut object = ResponseObject::with_capacity(1);
        object.push(field.response_key.clone(), value);
        object
    });

    Err(ctx.build_response(result, false))
}

/// Executes the sub-selection of the subscription field for one event.
pub(crate) async fn execute_event(
    schema: Arc<SchemaInner>,
    selection_set: Arc<SelectionSet>,
    event: ResolverResult,
    request_data: Arc<Data>,
    cancellation: CancellationToken,
) -> Response {
    let timeout = Some(schema.config.subscription_event_timeout);

    run(schema, request_data, cancellation, timeout, move |ctx| async move {
        let Some(field) = selection_set.fields.first() else {
            return Ok(ResponseObject::default());
        };
        let path = ErrorPath::default().child(&field.response_key);

        let result = match event {
            Ok(payload) => {
                complete::complete_value(&ctx, &field.field.bound_type, &field.selection, payload, &path, field).await
            }
            Err(error) => Err(ExecutionError::Field(error.into_graphql_error(path, field.location))),
        };

        let value = finish_field(&ctx, field, result)?;
        let mut object = ResponseObject::with_capacity(1);
        object.push(field.response_key.clone(), value);
        Ok(object)
    })
    .await
}

async fn run<F, Fut>(
    schema: Arc<SchemaInner>,
    request_data: Arc<Data>,
    cancellation: CancellationToken,
    timeout: Option<Duration>,
    operation: F,
) -> Response
where
    F: FnOnce(Ctx) -> Fut,
    Fut: Future<Output = Result<ResponseObject, ExecutionError>>,
{
    if cancellation.is_cancelled() {
        return Response::request_error(GraphqlError::operation_cancelled());
    }

    // The caller's token stays untouched when the operation times out. Tasks
    // still running when this future is dropped see the child cancelled.
    let cancellation = cancellation.child_token();
    let _abandoned = cancellation.clone().drop_guard();
    let ctx = Arc::new(ExecutionContext::new(schema, request_data, cancellation));
    let future = operation(ctx.clone());

    let (result, timed_out) = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, future).await {
            Ok(result) => (result, false),
            Err(_) => {
                tracing::debug!(?timeout, "operation timed out");
                ctx.cancellation.cancel();
                (Err(ExecutionError::Cancelled), true)
            }
        },
        None => (future.await, false),
    };

    ctx.build_response(result, timed_out)
}

impl ExecutionContext {
    fn build_response(&self, result: Result<ResponseObject, ExecutionError>, timed_out: bool) -> Response {
        match result {
            Ok(object) => Response::with_data(ResponseValue::Object(object), self.take_errors()),
            Err(ExecutionError::Field(error)) => {
                self.add_error(error);
                Response::with_data(ResponseValue::Null, self.take_errors())
            }
            Err(ExecutionError::Cancelled) => {
                self.cancellation.cancel();
                self.add_error(if timed_out {
                    GraphqlError::operation_timeout()
                } else {
                    GraphqlError::operation_cancelled()
                });
                Response::with_data(ResponseValue::Null, self.take_errors())
            }
        }
    }
}
