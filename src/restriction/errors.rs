//! Restriction error types
//!
//! Error codes:
//! - DO_BAD_DATA (REJECT)
//! - DO_MANAGED_REJECTED (REJECT)
//! - DO_NESTED_REJECTED (REJECT)
//! - DO_MIXED_RESTRICTION (FATAL)
//! - DO_SCHEMA_COMBINATION (FATAL)
//! - DO_INVALID_DEFAULT (FATAL)
//! - DO_NOT_INSTANTIABLE (FATAL)
//! - DO_AMBIGUOUS_MAPPING (FATAL)
//! - DO_NOT_MAPPABLE (FATAL)
//!
//! Declaration errors surface while a schema is registered, validation errors
//! while a record is built or mutated.

use thiserror::Error;

use super::types::{Restriction, RestrictionKind};
use crate::errors::ErrorClass;
use crate::record::RecordError;
use crate::value::Value;

/// Result type for restriction operations
pub type RestrictionResult<T> = Result<T, RestrictionError>;

/// Restriction declaration and validation errors
#[derive(Debug, Clone, Error)]
pub enum RestrictionError {
    // ==================
    // Validation Errors
    // ==================
    /// Value outside the allowed set
    #[error("'{value}' not allowed per restriction '{allowed}'")]
    BadData { value: String, allowed: String },

    /// Custom manager refused the value
    #[error("managed restriction '{name}' rejected '{value}': {reason}")]
    Managed {
        name: String,
        value: String,
        reason: String,
    },

    /// Nested schema refused the raw mapping
    #[error("nested {schema} rejected data: {source}")]
    Nested {
        schema: String,
        #[source]
        source: Box<RecordError>,
    },

    // ==================
    // Declaration Errors
    // ==================
    /// Types and literal values in one declaration
    #[error("Mixed type and value restrictions unsupported '{allowed}'")]
    MixedTypesAndValues { allowed: String },

    /// Schema combined with anything except null
    #[error("schema {schema} in restriction list '{allowed}' only valid with null")]
    SchemaWithOthers { schema: String, allowed: String },

    /// Two schemas in one declaration
    #[error("only one schema allowed in restriction list '{allowed}'")]
    MultipleSchemas { allowed: String },

    /// Default unusable for the restriction kind
    #[error("Invalid default '{default}': {reason}")]
    InvalidDefault { default: String, reason: String },

    /// Nested restriction over a Root or Node schema
    #[error("schema {0} is not a leaf and cannot back a nested restriction")]
    NotInstantiable(String),

    // ==================
    // Index Mapping Errors
    // ==================
    /// Several candidate field types
    #[error("ambiguous index mapping for restriction '{allowed}'")]
    AmbiguousMapping { allowed: String },

    /// No field type applies
    #[error("no index mapping for {kind} restriction '{allowed}'")]
    NotMappable {
        kind: RestrictionKind,
        allowed: String,
    },
}

impl RestrictionError {
    /// Rejection of `value` by `restriction`.
    pub fn bad_data(value: &Value, restriction: &Restriction) -> Self {
        RestrictionError::BadData {
            value: value.to_string(),
            allowed: restriction.allowed_display(),
        }
    }

    /// Rejection raised from inside a managed restriction.
    pub fn managed(name: impl Into<String>, value: &Value, reason: impl Into<String>) -> Self {
        RestrictionError::Managed {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            RestrictionError::BadData { .. } => "DO_BAD_DATA",
            RestrictionError::Managed { .. } => "DO_MANAGED_REJECTED",
            RestrictionError::Nested { .. } => "DO_NESTED_REJECTED",
            RestrictionError::MixedTypesAndValues { .. } => "DO_MIXED_RESTRICTION",
            RestrictionError::SchemaWithOthers { .. } | RestrictionError::MultipleSchemas { .. } => {
                "DO_SCHEMA_COMBINATION"
            }
            RestrictionError::InvalidDefault { .. } => "DO_INVALID_DEFAULT",
            RestrictionError::NotInstantiable(_) => "DO_NOT_INSTANTIABLE",
            RestrictionError::AmbiguousMapping { .. } => "DO_AMBIGUOUS_MAPPING",
            RestrictionError::NotMappable { .. } => "DO_NOT_MAPPABLE",
        }
    }

    /// Returns the error class
    pub fn class(&self) -> ErrorClass {
        if self.is_validation() {
            ErrorClass::Reject
        } else {
            ErrorClass::Fatal
        }
    }

    /// True for errors raised while validating data rather than declaring
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RestrictionError::BadData { .. }
                | RestrictionError::Managed { .. }
                | RestrictionError::Nested { .. }
        )
    }
}
