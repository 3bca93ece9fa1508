//! Registry configuration
//!
//! Embeddable in a host configuration file:
//!
//! ```json
//! { "duplicate_policy": "replace", "log_threshold": "INFO" }
//! ```

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

/// What registering an already known (module, name) does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with `AlreadyRegistered`
    #[default]
    Reject,
    /// Drop the earlier registration and its unique-value claims
    Replace,
}

/// Configuration for a `SchemaRegistry`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Minimum severity logged; `None` keeps logging off
    pub log_threshold: Option<Severity>,
}

impl RegistryConfig {
    /// Config for sessions that re-run schema declarations.
    pub fn interactive() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Replace,
            ..Self::default()
        }
    }

    pub fn with_log_threshold(mut self, threshold: Severity) -> Self {
        self.log_threshold = Some(threshold);
        self
    }

    pub fn replaces_duplicates(&self) -> bool {
        self.duplicate_policy == DuplicatePolicy::Replace
    }
}
