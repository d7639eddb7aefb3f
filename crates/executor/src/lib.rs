//! A GraphQL executor binding a type schema to application values at
//! runtime.
//!
//! The schema is described in SDL and loaded into a [`Registry`]. Application
//! types describe what they can provide by implementing [`Object`]; the two
//! are matched once by [`Schema::build`], after which operations are planned
//! and executed against the bound schema:
//!
//! ```ignore
//! let registry = Registry::from_sdl("type Query { hero: Character! } ...")?;
//! let schema = Schema::build(registry, RootValue::new(Query::default())).finish()?;
//! let response = schema.execute("{ hero { name } }").await;
//! ```
#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod bind;
mod config;
mod data;
mod execution;
pub mod host;
mod plan;
pub mod registry;
mod request;
pub mod resolver;
pub mod response;
mod schema;
mod subscription;
pub mod trace;

pub use bind::{BindError, RootValue};
pub use config::{ConfigError, ExecutorConfig};
pub use data::Data;
pub use error::{ErrorCode, ErrorPath, GraphqlError, Location};
pub use host::{CustomScalar, EventStream, HostValue, IntoHostValue, Object, ObjectShapeBuilder};
pub use plan::PlanError;
pub use registry::{Registry, SdlError, TypeReference};
pub use request::Request;
pub use resolver::{Arguments, FieldCall, Resolution, ResolveStrategy, ResolverContext, ResolverError};
pub use response::{Response, ResponseObject, ResponseValue};
pub use schema::{Schema, SchemaBuilder};
pub use trace::{DefaultTracer, NoopTracer, Tracer};
