//! Error class shared by every error family in the crate
//!
//! - Schema-definition errors are FATAL: they abort schema registration and are
//!   expected to surface while the program declares its schemas.
//! - Data-validation errors are REJECT: the offending construction or mutation
//!   is refused and prior state is left untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a crate error affects the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Caller data rejected, state unchanged
    Reject,
    /// Schema declaration is unusable
    Fatal,
}

impl ErrorClass {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Reject => "REJECT",
            ErrorClass::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
