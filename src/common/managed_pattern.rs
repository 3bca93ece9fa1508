//! String restriction matched against a regular expression
//!
//! The whole string must match; the pattern is anchored on construction.

use regex::Regex;

use crate::restriction::{ManagedRestriction, Restriction, RestrictionError, RestrictionResult};
use crate::value::{Value, ValueType};

#[derive(Debug)]
pub struct ManagedPattern {
    pattern: Regex,
    nullable: bool,
    restriction: Restriction,
}

impl ManagedPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
            nullable: false,
            restriction: Restriction::type_set([ValueType::Str], Value::Null),
        })
    }

    /// Accepts null as a value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self.restriction = Restriction::type_set([ValueType::Str, ValueType::Null], Value::Null);
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl ManagedRestriction for ManagedPattern {
    fn name(&self) -> &str {
        "ManagedPattern"
    }

    fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    fn manage(&self, value: Value) -> RestrictionResult<Value> {
        match value {
            Value::Str(s) if !self.pattern.is_match(&s) => Err(RestrictionError::managed(
                self.name(),
                &Value::Str(s),
                format!("does not match {}", self.pattern.as_str()),
            )),
            other => Ok(other),
        }
    }
}
