//! Value model for validated records
//!
//! Restrictions validate `Value`s; records store them. The serialised form of
//! a value is JSON-representable once its leaves are primitives.

mod json;
mod types;

pub use json::{fields_from_json, fields_to_json};
pub(crate) use json::serialize_fields;
pub use types::{Fields, Value, ValueType};
