use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use ::error::{ErrorCode, ErrorPath};
use async_recursion::async_recursion;
use futures_util::FutureExt;
use tracing::Instrument;

use super::{complete::complete_value, Ctx, ExecutionContext, ExecutionError};
use crate::{
    plan::{SelectionField, SelectionSet},
    resolver::{FieldCall, FieldResolver, Resolution},
    response::{ResponseObject, ResponseValue},
    trace::FieldTraceInfo,
    HostValue, ResolverError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionMode {
    /// One field after the other, for the root fields of mutations.
    Serial,
    /// One task per field when any of them may suspend, inline otherwise.
    Concurrent,
}

#[async_recursion]
pub(super) async fn resolve_container(
    ctx: &Ctx,
    set: Arc<SelectionSet>,
    parent: HostValue,
    path: ErrorPath,
    mode: ExecutionMode,
) -> Result<ResponseObject, ExecutionError> {
    ctx.check_cancelled()?;

    let mut object = ResponseObject::with_capacity(set.fields.len());

    if mode == ExecutionMode::Concurrent && set.is_async {
        let tasks = (0..set.fields.len())
            .map(|index| {
                let ctx = ctx.clone();
                let set = set.clone();
                let parent = parent.clone();
                let path = path.clone();
                tokio::spawn(async move { resolve_field(&ctx, &set.fields[index], &parent, &path).await })
            })
            .collect::<Vec<_>>();

        let mut failure = None;
        for (field, outcome) in set.fields.iter().zip(futures_util::future::join_all(tasks).await) {
            let result = outcome.unwrap_or_else(|error| Err(join_error(error, field, &path)));
            match result {
                Ok(value) => object.push(field.response_key.clone(), value),
                Err(error) => failure = Some(merge_failures(ctx, failure, error)),
            }
        }

        return match failure {
            Some(error) => Err(error),
            None => Ok(object),
        };
    }

    for field in &set.fields {
        let value = resolve_field(ctx, field, &parent, &path).await?;
        object.push(field.response_key.clone(), value);
    }

    Ok(object)
}

async fn resolve_field(
    ctx: &Ctx,
    field: &SelectionField,
    parent: &HostValue,
    path: &ErrorPath,
) -> Result<ResponseValue, ExecutionError> {
    let path = path.child(&field.response_key);

    let result = match resolve_field_value(ctx, field, parent, &path).await {
        Ok(value) => complete_value(ctx, &field.field.bound_type, &field.selection, value, &path, field).await,
        Err(error) => Err(error),
    };

    finish_field(ctx, field, result)
}

/// A nullable field absorbs the error of its own value.
pub(super) fn finish_field(
    ctx: &ExecutionContext,
    field: &SelectionField,
    result: Result<ResponseValue, ExecutionError>,
) -> Result<ResponseValue, ExecutionError> {
    match result {
        Err(ExecutionError::Field(error)) if field.field.bound_type.is_nullable() => {
            ctx.add_error(error);
            Ok(ResponseValue::Null)
        }
        other => other,
    }
}

/// Invokes the resolver of `selection` on `parent`, converting resolver
/// errors and panics into field errors located at `path`.
pub(super) async fn resolve_field_value(
    ctx: &Ctx,
    selection: &SelectionField,
    parent: &HostValue,
    path: &ErrorPath,
) -> Result<HostValue, ExecutionError> {
    ctx.check_cancelled()?;

    let field = &selection.field;
    let tracer = &ctx.schema.tracer;
    let trivial = !field.is_async
        && matches!(
            field.resolver,
            FieldResolver::Field { .. } | FieldResolver::Map { .. } | FieldResolver::Fixed(_)
        );
    let span = tracer.field_span(&FieldTraceInfo {
        parent_type: &field.parent_type,
        field_name: &field.name,
        arguments: &selection.arguments,
        trivial,
        path,
    });

    let context = ctx.resolver_context(path);
    let call = FieldCall {
        parent,
        field,
        arguments: &selection.arguments,
        context: &context,
    };

    // Plain reads on the inline path do not count against the limit.
    let mut slot = if selection.is_async || !trivial {
        ctx.acquire_slot().await?
    } else {
        None
    };

    let resolution = span.in_scope(|| std::panic::catch_unwind(AssertUnwindSafe(|| ctx.schema.chain.resolve(&call))));

    let result = match resolution {
        Ok(Resolution::Ready(result)) => result,
        Ok(Resolution::Pending(future)) => {
            if slot.is_none() {
                slot = ctx.acquire_slot().await?;
            }
            tokio::select! {
                biased;
                _ = ctx.cancellation.cancelled() => return Err(ExecutionError::Cancelled),
                outcome = AssertUnwindSafe(future).catch_unwind().instrument(span.clone()) => {
                    outcome.unwrap_or_else(|payload| Err(panic_error(payload, path)))
                }
            }
        }
        Err(payload) => Err(panic_error(payload, path)),
    };
    drop(slot);

    result.map_err(|error| {
        tracer.record_field_error(&span, &error);
        tracing::debug!(%path, field = %field.trace_label, code = %error.code(), "resolver failed: {}", error.message);
        ExecutionError::Field(error.into_graphql_error(path.clone(), selection.location))
    })
}

fn panic_error(payload: Box<dyn Any + Send>, path: &ErrorPath) -> ResolverError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Box<dyn Any>".to_string());

    tracing::warn!(%path, "resolver panicked: {message}");
    ResolverError::new(format!("panic occurred: {message}")).with_code(ErrorCode::ResolverPanic)
}

fn join_error(error: tokio::task::JoinError, field: &SelectionField, path: &ErrorPath) -> ExecutionError {
    if error.is_panic() {
        let path = path.child(&field.response_key);
        let error = panic_error(error.into_panic(), &path);
        ExecutionError::Field(error.into_graphql_error(path, field.location))
    } else {
        ExecutionError::Cancelled
    }
}

/// Keeps the first failure of a sibling group, unless the operation was
/// cancelled meanwhile. The others are recorded.
pub(super) fn merge_failures(ctx: &ExecutionContext, current: Option<ExecutionError>, error: ExecutionError) -> ExecutionError {
    match (current, error) {
        (None, error) => error,
        (Some(ExecutionError::Cancelled), error) | (Some(error), ExecutionError::Cancelled) => {
            ctx.record(error);
            ExecutionError::Cancelled
        }
        (Some(first), error) => {
            ctx.record(error);
            first
        }
    }
}

#[cfg(test)]
mod tests {
    use ::error::GraphqlError;

    use super::*;

    #[test]
    fn panic_messages() {
        let path = ErrorPath::from("hero");
        let error = panic_error(Box::new("boom"), &path);
        assert_eq!(error.message, "panic occurred: boom");
        assert_eq!(error.code(), ErrorCode::ResolverPanic);

        let error = panic_error(Box::new(String::from("owned boom")), &path);
        assert_eq!(error.message, "panic occurred: owned boom");
    }

    #[test]
    fn first_failure_wins_unless_cancelled() {
        fn field_error(message: &'static str) -> ExecutionError {
            ExecutionError::Field(GraphqlError::new(message, ErrorCode::ResolverError))
        }

        let ctx = ExecutionContext::for_tests();
        let merged = merge_failures(&ctx, Some(field_error("first")), field_error("second"));
        assert!(matches!(merged, ExecutionError::Field(error) if error.message == "first"));

        let merged = merge_failures(&ctx, Some(field_error("third")), ExecutionError::Cancelled);
        assert!(matches!(merged, ExecutionError::Cancelled));

        let recorded: Vec<_> = ctx.take_errors().into_iter().map(|error| error.message).collect();
        assert_eq!(recorded, ["second", "third"]);
    }
}
