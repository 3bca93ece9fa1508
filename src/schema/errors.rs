//! Schema definition errors
//!
//! Error codes:
//! - DO_RESTRICTION_DECLARATION (FATAL)
//! - DO_REQUIRED_FOR (FATAL)
//! - DO_DUPLICATE_UNIQUE (FATAL)
//! - DO_RESERVED_NAME (FATAL)
//! - DO_ALREADY_REGISTERED (FATAL)
//! - DO_ALREADY_DECLARED (FATAL)
//! - DO_UNIQUE_NOT_REQUIRED (FATAL)
//! - DO_UNKNOWN_SCHEMA (FATAL)
//! - DO_COMPILE_FAILED (FATAL)
//!
//! All of these abort registration; nothing is recorded in the registry.

use thiserror::Error;

use crate::errors::ErrorClass;
use crate::restriction::RestrictionError;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    // ==================
    // Declaration Errors
    // ==================
    /// A field declaration could not be classified
    #[error("{schema}.{key}: {source}")]
    Restriction {
        schema: String,
        key: String,
        #[source]
        source: RestrictionError,
    },

    /// Restriction key shadows an attribute
    #[error("'{name}' is both a restriction key and an attribute in {schema}")]
    ReservedName { schema: String, name: String },

    /// Parent was not registered in this registry
    #[error("{schema} extends {parent}, which is not registered")]
    UnknownSchema { schema: String, parent: String },

    // ==================
    // Contract Errors
    // ==================
    /// Leaf does not fulfil an inherited requirement
    #[error("{key} is required for {schema}!")]
    RequiredFor { schema: String, key: String },

    /// Unique value claimed by another leaf
    #[error("Unique value \"{value}\" for {key} has already been declared in {other}")]
    DuplicateUnique {
        schema: String,
        key: String,
        value: String,
        other: String,
    },

    /// Requirement declared twice in the chain or registry
    #[error("{kind} attribute \"{key}\" has already been declared in {owner}!")]
    AlreadyDeclared {
        kind: &'static str,
        key: String,
        owner: String,
    },

    /// Unique names must be a subset of the same requirement list
    #[error("unique attribute {key} of {schema} must be in its required attributes")]
    UniqueNotRequired { schema: String, key: String },

    // ==================
    // Registry Errors
    // ==================
    /// Same (module, name) registered twice under the reject policy
    #[error("schema {module}.{name} is already registered")]
    AlreadyRegistered { module: String, name: String },

    /// A compile hook refused the schema
    #[error("compile check failed for {schema}: {reason}")]
    Compile { schema: String, reason: String },
}

impl SchemaError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Restriction { .. } => "DO_RESTRICTION_DECLARATION",
            SchemaError::ReservedName { .. } => "DO_RESERVED_NAME",
            SchemaError::UnknownSchema { .. } => "DO_UNKNOWN_SCHEMA",
            SchemaError::RequiredFor { .. } => "DO_REQUIRED_FOR",
            SchemaError::DuplicateUnique { .. } => "DO_DUPLICATE_UNIQUE",
            SchemaError::AlreadyDeclared { .. } => "DO_ALREADY_DECLARED",
            SchemaError::UniqueNotRequired { .. } => "DO_UNIQUE_NOT_REQUIRED",
            SchemaError::AlreadyRegistered { .. } => "DO_ALREADY_REGISTERED",
            SchemaError::Compile { .. } => "DO_COMPILE_FAILED",
        }
    }

    /// Schema definition errors are always fatal
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }

    /// Declaration error raised by the restriction engine, if any
    pub fn restriction_error(&self) -> Option<&RestrictionError> {
        match self {
            SchemaError::Restriction { source, .. } => Some(source),
            _ => None,
        }
    }
}
