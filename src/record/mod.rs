//! Validated record container
//!
//! Records are built from a leaf schema and caller data, and every later
//! mutation goes through the same restriction checks.

mod container;
mod errors;

pub use container::Record;
pub use errors::{RecordError, RecordResult};
