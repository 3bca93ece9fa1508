//! Record error types
//!
//! Error codes:
//! - DO_UNKNOWN_KEY (REJECT)
//! - DO_REQUIRED_KEY (REJECT)
//! - DO_VALUE_REJECTED (REJECT)
//! - DO_MISSING_KEY (REJECT)
//! - DO_MISSING_ATTRIBUTE (REJECT)
//! - DO_NOT_NESTED (REJECT)
//! - DO_NOT_A_MAPPING (REJECT)
//! - DO_INVARIANT_FAILED (REJECT)
//! - DO_NOT_INSTANTIABLE (REJECT)
//!
//! A rejected construction yields no record; a rejected mutation leaves the
//! record exactly as it was.

use thiserror::Error;

use crate::errors::ErrorClass;
use crate::restriction::RestrictionError;
use crate::schema::Classification;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Debug, Clone, Error)]
pub enum RecordError {
    // ==================
    // Key Set Errors
    // ==================
    /// Key not declared by the schema
    #[error("Unknown key '{key}' for {schema}")]
    UnknownKey { schema: String, key: String },

    /// Strict construction without a declared key
    #[error("Required key '{key}' missing for {schema}")]
    RequiredKey { schema: String, key: String },

    /// Read of a key the schema does not declare
    #[error("{schema} has no key '{key}'")]
    MissingKey { schema: String, key: String },

    /// Attribute found in neither the record, its free namespace nor the schema
    #[error("'{schema}' object has no attribute '{name}'")]
    MissingAttribute { schema: String, name: String },

    // ==================
    // Value Errors
    // ==================
    /// Restriction refused the value for `key`
    #[error("{schema}.{key}: {source}")]
    Rejected {
        schema: String,
        key: String,
        #[source]
        source: RestrictionError,
    },

    /// `modify_nested` on a key that does not hold a record
    #[error("{schema}.{key} does not hold a nested record")]
    NotNested { schema: String, key: String },

    /// Construction input is not a key to value mapping
    #[error("{schema} expects a mapping, got {found}")]
    NotAMapping { schema: String, found: String },

    /// Cross-field validator refused the record
    #[error("{schema} invariant failed: {reason}")]
    Invariant { schema: String, reason: String },

    // ==================
    // Contract Errors
    // ==================
    /// Record requested for a Root or Node schema
    #[error("{schema} is a {classification} schema and may not be instantiated")]
    NotInstantiable {
        schema: String,
        classification: Classification,
    },
}

impl RecordError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::UnknownKey { .. } => "DO_UNKNOWN_KEY",
            RecordError::RequiredKey { .. } => "DO_REQUIRED_KEY",
            RecordError::MissingKey { .. } => "DO_MISSING_KEY",
            RecordError::MissingAttribute { .. } => "DO_MISSING_ATTRIBUTE",
            RecordError::Rejected { .. } => "DO_VALUE_REJECTED",
            RecordError::NotNested { .. } => "DO_NOT_NESTED",
            RecordError::NotAMapping { .. } => "DO_NOT_A_MAPPING",
            RecordError::Invariant { .. } => "DO_INVARIANT_FAILED",
            RecordError::NotInstantiable { .. } => "DO_NOT_INSTANTIABLE",
        }
    }

    /// Data errors are recoverable by the caller
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Reject
    }

    /// Key the error is about, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            RecordError::UnknownKey { key, .. }
            | RecordError::RequiredKey { key, .. }
            | RecordError::MissingKey { key, .. }
            | RecordError::Rejected { key, .. }
            | RecordError::NotNested { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Restriction error behind a rejected value
    pub fn restriction_error(&self) -> Option<&RestrictionError> {
        match self {
            RecordError::Rejected { source, .. } => Some(source),
            _ => None,
        }
    }
}
