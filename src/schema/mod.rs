//! Structural contract layer
//!
//! Schemas are declared with a `SchemaBuilder` and registered once into a
//! `SchemaRegistry`, which classifies each one and enforces the requirement
//! contract:
//!
//! - Root schemas declare required (and unique) keys
//! - Node schemas are abstract and forward requirements
//! - Leaf schemas fulfil every inherited requirement and are the only ones
//!   records can be built from
//!
//! Every check runs at registration and is fatal; none is repeated when a
//! record is constructed.

mod builder;
mod errors;
mod registry;
mod types;
mod view;

pub use builder::SchemaBuilder;
pub use errors::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use types::{Classification, CompileHook, Member, Schema, SchemaId, SchemaRef};
pub use view::SchemaView;
