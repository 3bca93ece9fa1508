//! Cross-field validation
//!
//! Per-key restrictions cannot express rules like "city must belong to
//! state". A `CrossFieldValidator` attached to a schema sees the whole record
//! and runs:
//!
//! - after strict construction
//! - after strict re-initialisation
//! - after every assignment, against the candidate state
//!
//! Records stage every mutation on a candidate and only commit it once all
//! validators pass, so a failing validator leaves the record untouched.
//! Validators are inherited by descendant schemas.

use crate::record::{Record, RecordError, RecordResult};

/// Multi-key invariant over a whole record
pub trait CrossFieldValidator: Send + Sync {
    /// Returns the reason the record is invalid
    fn validate(&self, record: &Record) -> Result<(), String>;
}

impl<F> CrossFieldValidator for F
where
    F: Fn(&Record) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, record: &Record) -> Result<(), String> {
        self(record)
    }
}

/// Runs every validator of the record's schema chain, stopping at the first failure.
pub(crate) fn check(record: &Record) -> RecordResult<()> {
    for validator in record.schema().validators() {
        validator
            .validate(record)
            .map_err(|reason| RecordError::Invariant {
                schema: record.schema().name().to_string(),
                reason,
            })?;
    }
    Ok(())
}
