//! dataobject - Declarative, runtime-enforced schemas for validated records
//!
//! Schemas are declared once through a `SchemaRegistry`; records built from
//! them hold exactly the schema's keys and reject any value outside the
//! restriction declared for its key.

pub mod common;
pub mod config;
pub mod dynamic;
pub mod errors;
pub mod observability;
pub mod record;
pub mod restriction;
pub mod schema;
pub mod validator;
pub mod value;

pub use config::{DuplicatePolicy, RegistryConfig};
pub use dynamic::{Discriminated, Discriminator};
pub use errors::ErrorClass;
pub use record::{Record, RecordError, RecordResult};
pub use restriction::{Declaration, ManagedRestriction, Restriction, RestrictionError, RestrictionKind};
pub use schema::{Classification, SchemaBuilder, SchemaError, SchemaRef, SchemaRegistry};
pub use validator::CrossFieldValidator;
pub use value::{Fields, Value, ValueType};
