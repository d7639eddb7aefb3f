use std::sync::Arc;

use async_graphql_parser::types::OperationType;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use tracing::Instrument;

use crate::{
    execution,
    host::Event,
    plan::operation_type_name,
    trace::OperationTraceInfo,
    Request, Response, Schema,
};

/// One response per event of the subscription field, until the event source
/// closes or the request is cancelled.
pub(crate) fn subscribe(schema: Schema, request: Request) -> BoxStream<'static, Response> {
    async_stream::stream! {
        let Request {
            query,
            operation_name,
            variables,
            data,
            cancellation,
        } = request;
        let request_data = Arc::new(data);
        // Dropping the stream cancels whatever the current event still runs.
        let cancellation = cancellation.unwrap_or_default().child_token();
        let _abandoned = cancellation.clone().drop_guard();

        let plan = match schema.prepare(&query, operation_name.as_deref(), &variables) {
            Ok(plan) => plan,
            Err(response) => {
                yield response;
                return;
            }
        };

        let tracer = schema.0.tracer.clone();
        let span = tracer.operation_span(&OperationTraceInfo {
            operation_type: operation_type_name(plan.operation_type),
            operation_name: plan.operation_name.as_deref(),
        });

        if plan.operation_type != OperationType::Subscription {
            let response = execution::execute(schema.0.clone(), plan, request_data, cancellation)
                .instrument(span.clone())
                .await;
            tracer.record_operation_end(&span, &response);
            yield response;
            return;
        }

        let selection_set = plan.selection_set.clone();
        let mut receiver = match execution::subscribe(schema.0.clone(), &plan, request_data.clone(), cancellation.clone())
            .instrument(span.clone())
            .await
        {
            Ok(receiver) => receiver,
            Err(response) => {
                tracer.record_operation_end(&span, &response);
                yield response;
                return;
            }
        };
        tracing::debug!(parent: &span, "subscription started");

        loop {
            let event = tokio::select! {
                biased;
                () = cancellation.cancelled() => break,
                event = receiver.next() => event,
            };

            let Event::Next(event) = event else {
                tracing::debug!(parent: &span, "event source closed");
                break;
            };

            let response = execution::execute_event(
                schema.0.clone(),
                selection_set.clone(),
                event,
                request_data.clone(),
                cancellation.clone(),
            )
            .instrument(span.clone())
            .await;

            if cancellation.is_cancelled() {
                break;
            }
            tracer.record_operation_end(&span, &response);
            yield response;
        }

        tracing::debug!(parent: &span, cancelled = cancellation.is_cancelled(), "subscription ended");
    }
    .boxed()
}
