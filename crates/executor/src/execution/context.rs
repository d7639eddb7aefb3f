use std::sync::{Arc, Mutex};

use ::error::{ErrorPath, GraphqlError};
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;

use crate::{schema::SchemaInner, Data, ResolverContext};

pub(crate) type Ctx = Arc<ExecutionContext>;

/// State shared by every task of one operation.
pub(crate) struct ExecutionContext {
    pub schema: Arc<SchemaInner>,
    pub request_data: Arc<Data>,
    pub cancellation: CancellationToken,
    errors: Mutex<Vec<GraphqlError>>,
    limiter: Semaphore,
}

pub(crate) enum ExecutionError {
    /// Propagates up to the nearest nullable position.
    Field(GraphqlError),
    /// Aborts the whole operation.
    Cancelled,
}

impl From<GraphqlError> for ExecutionError {
    fn from(error: GraphqlError) -> Self {
        ExecutionError::Field(error)
    }
}

impl ExecutionContext {
    pub fn new(schema: Arc<SchemaInner>, request_data: Arc<Data>, cancellation: CancellationToken) -> Self {
        let permits = schema.config.max_parallelism.max(1);
        ExecutionContext {
            schema,
            request_data,
            cancellation,
            errors: Mutex::new(Vec::new()),
            limiter: Semaphore::new(permits),
        }
    }

    pub fn add_error(&self, error: GraphqlError) {
        self.lock_errors().push(error);
    }

    /// Records errors which lost the race to bubble up. Cancellation needs no
    /// record, the operation reports it once.
    pub fn record(&self, error: ExecutionError) {
        if let ExecutionError::Field(error) = error {
            self.add_error(error);
        }
    }

    pub fn take_errors(&self) -> Vec<GraphqlError> {
        std::mem::take(&mut *self.lock_errors())
    }

    pub fn check_cancelled(&self) -> Result<(), ExecutionError> {
        if self.cancellation.is_cancelled() {
            Err(ExecutionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// A slot for one resolver invocation, held until the resolver produced
    /// its value. The inner `None` means the limiter is closed, which never
    /// happens during an operation.
    pub async fn acquire_slot(&self) -> Result<Option<SemaphorePermit<'_>>, ExecutionError> {
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(ExecutionError::Cancelled),
            permit = self.limiter.acquire() => Ok(permit.ok()),
        }
    }

    pub fn resolver_context(&self, path: &ErrorPath) -> ResolverContext {
        ResolverContext {
            path: path.clone(),
            schema_data: self.schema.data.clone(),
            request_data: self.request_data.clone(),
            cancellation: self.cancellation.clone(),
        }
    }

    fn lock_errors(&self) -> std::sync::MutexGuard<'_, Vec<GraphqlError>> {
        self.errors.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
impl ExecutionContext {
    pub fn for_tests() -> Self {
        let registry = crate::Registry::from_sdl("type Query { hello: String }").unwrap();
        let schema = crate::Schema::build(registry, crate::RootValue::json(serde_json::json!({ "hello": "world" })))
            .finish()
            .unwrap();
        ExecutionContext::new(schema.0.clone(), Arc::default(), CancellationToken::new())
    }
}
