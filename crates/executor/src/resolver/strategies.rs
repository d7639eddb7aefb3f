use error::ErrorCode;
use futures_util::FutureExt;

use super::{FieldCall, FieldResolver, Resolution, ResolveStrategy, ResolverError};
use crate::{
    host::{Capability, HostObject, Invoke},
    HostValue,
};

/// `__typename` and introspection fields, precomputed by the planner.
pub struct MetadataStrategy;

impl ResolveStrategy for MetadataStrategy {
    fn resolve(&self, call: &FieldCall<'_>) -> Option<Resolution> {
        match &call.field.resolver {
            FieldResolver::Fixed(result) => Some(Resolution::Ready(result.clone())),
            _ => None,
        }
    }
}

/// Methods of application objects, possibly taking the resolver context and
/// the field arguments.
pub struct MethodStrategy;

impl ResolveStrategy for MethodStrategy {
    fn resolve(&self, call: &FieldCall<'_>) -> Option<Resolution> {
        match (&call.field.resolver, call.parent) {
            (FieldResolver::Method { capability, host }, HostValue::Object(object)) if object.type_id() == *host => {
                Some(invoke(capability, object, call))
            }
            _ => None,
        }
    }
}

/// Plain member reads of application objects.
pub struct FieldAccessStrategy;

impl ResolveStrategy for FieldAccessStrategy {
    fn resolve(&self, call: &FieldCall<'_>) -> Option<Resolution> {
        match (&call.field.resolver, call.parent) {
            (FieldResolver::Field { capability, host }, HostValue::Object(object)) if object.type_id() == *host => {
                Some(invoke(capability, object, call))
            }
            _ => None,
        }
    }
}

/// Keyed entries of maps and JSON objects. The key is the field name unless
/// the binder recorded another one.
pub struct MapLookupStrategy;

impl ResolveStrategy for MapLookupStrategy {
    fn resolve(&self, call: &FieldCall<'_>) -> Option<Resolution> {
        let key = match &call.field.resolver {
            FieldResolver::Map { key } => key.as_str(),
            _ => call.field.name.as_str(),
        };
        call.parent.entry(key).map(|value| Resolution::Ready(Ok(value)))
    }
}

fn invoke(capability: &Capability, object: &HostObject, call: &FieldCall<'_>) -> Resolution {
    match &capability.invoke {
        Invoke::Sync(resolve) => Resolution::Ready(resolve(object, call.arguments)),
        Invoke::Blocking(resolve) => {
            let resolve = resolve.clone();
            let object = object.clone();
            let arguments = call.arguments.clone();
            Resolution::Pending(
                async move {
                    match tokio::task::spawn_blocking(move || resolve(&object, &arguments)).await {
                        Ok(result) => result,
                        Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
                        Err(error) => {
                            Err(ResolverError::new(error.to_string()).with_code(ErrorCode::OperationCancelled))
                        }
                    }
                }
                .boxed(),
            )
        }
        Invoke::Async(resolve) => Resolution::Pending(resolve(
            object.clone(),
            call.context.clone(),
            call.arguments.clone(),
        )),
    }
}
