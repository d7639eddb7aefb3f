//! Resolver dispatch.
//!
//! Every field invocation runs through a [`ResolverChain`]: an ordered list of
//! [`ResolveStrategy`] implementations, the first one recognizing the parent
//! value and the bound field produces the result. The default chain handles,
//! in order, meta fields, methods, plain member reads and keyed lookups into
//! maps and JSON objects. Custom strategies run right after meta fields.

mod context;
mod error;
mod strategies;

use std::{any::TypeId, sync::Arc};

use ::error::ErrorCode;
use futures::future::BoxFuture;

pub use self::context::{Arguments, ResolverContext};
pub use self::error::ResolverError;
pub use self::strategies::{FieldAccessStrategy, MapLookupStrategy, MetadataStrategy, MethodStrategy};

use crate::{bind::BoundField, host::Capability, HostValue};

pub type ResolverResult = Result<HostValue, ResolverError>;

/// How a bound field obtains its value, decided when the schema is bound.
#[derive(Clone)]
pub enum FieldResolver {
    /// Meta fields whose value is known when the operation is planned.
    Fixed(ResolverResult),
    Method { capability: Arc<Capability>, host: TypeId },
    Field { capability: Arc<Capability>, host: TypeId },
    Map { key: String },
}

/// The outcome of a strategy: either computed on the spot, or a future to be
/// driven by the executor.
pub enum Resolution {
    Ready(ResolverResult),
    Pending(BoxFuture<'static, ResolverResult>),
}

/// Everything a strategy needs to resolve one field of one parent value.
pub struct FieldCall<'a> {
    pub parent: &'a HostValue,
    pub field: &'a BoundField,
    pub arguments: &'a Arguments,
    pub context: &'a ResolverContext,
}

pub trait ResolveStrategy: Send + Sync + 'static {
    /// `None` when this strategy doesn't apply to the parent value or field.
    fn resolve(&self, call: &FieldCall<'_>) -> Option<Resolution>;

    /// Forces fields handled by this strategy onto the concurrent execution
    /// path, regardless of what their signature suggests.
    fn forces_async(&self, _field: &BoundField) -> bool {
        false
    }
}

#[derive(Clone)]
pub(crate) struct ResolverChain {
    strategies: Vec<Arc<dyn ResolveStrategy>>,
}

impl ResolverChain {
    pub(crate) fn new(custom: Vec<Arc<dyn ResolveStrategy>>) -> Self {
        let mut strategies: Vec<Arc<dyn ResolveStrategy>> = Vec::with_capacity(custom.len() + 4);
        strategies.push(Arc::new(MetadataStrategy));
        strategies.extend(custom);
        strategies.push(Arc::new(MethodStrategy));
        strategies.push(Arc::new(FieldAccessStrategy));
        strategies.push(Arc::new(MapLookupStrategy));
        ResolverChain { strategies }
    }

    pub(crate) fn resolve(&self, call: &FieldCall<'_>) -> Resolution {
        for strategy in &self.strategies {
            if let Some(resolution) = strategy.resolve(call) {
                return resolution;
            }
        }

        Resolution::Ready(Err(ResolverError::new(format!(
            "No resolver can provide `{}.{}` from {}",
            call.field.parent_type,
            call.field.name,
            call.parent.kind()
        ))
        .with_code(ErrorCode::TypeMismatch)))
    }

    pub(crate) fn forces_async(&self, field: &BoundField) -> bool {
        self.strategies.iter().any(|strategy| strategy.forces_async(field))
    }
}
