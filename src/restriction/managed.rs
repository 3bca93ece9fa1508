//! Managed restrictions
//!
//! A managed restriction owns the acceptance logic for one key. It wraps a
//! plain restriction (the shape its output must have, plus the default) and
//! normalises or rejects incoming values in `manage`.
//!
//! ```ignore
//! #[derive(Debug)]
//! struct Title(Restriction);
//!
//! impl ManagedRestriction for Title {
//!     fn name(&self) -> &str { "Title" }
//!     fn restriction(&self) -> &Restriction { &self.0 }
//!     fn manage(&self, value: Value) -> RestrictionResult<Value> {
//!         match value {
//!             Value::Str(s) if !s.is_empty() => Ok(Value::Str(s.to_uppercase())),
//!             other => Err(RestrictionError::managed(self.name(), &other, "empty title")),
//!         }
//!     }
//! }
//! ```

use std::fmt::Debug;

use serde_json::Value as JsonValue;

use super::errors::RestrictionResult;
use super::types::Restriction;
use crate::value::Value;

/// Custom validate-and-normalise logic for a single key
pub trait ManagedRestriction: Debug + Send + Sync {
    /// Name used in error messages
    fn name(&self) -> &str;

    /// Restriction the managed output must satisfy; also supplies the default
    fn restriction(&self) -> &Restriction;

    /// Validates and normalises `value`; called for every supplied value
    fn manage(&self, value: Value) -> RestrictionResult<Value>;

    /// Index mapping override; `None` derives it from `restriction()`
    fn index_mapping(&self) -> Option<JsonValue> {
        None
    }
}
