//! Float restriction that also takes integers

use crate::restriction::{ManagedRestriction, Restriction, RestrictionResult};
use crate::value::{Value, ValueType};

#[derive(Debug)]
pub struct ManagedFloat {
    restriction: Restriction,
}

impl ManagedFloat {
    pub fn new() -> Self {
        Self {
            restriction: Restriction::type_set([ValueType::Float], Value::Null),
        }
    }

    pub fn nullable() -> Self {
        Self {
            restriction: Restriction::type_set([ValueType::Float, ValueType::Null], Value::Null),
        }
    }
}

impl Default for ManagedFloat {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedRestriction for ManagedFloat {
    fn name(&self) -> &str {
        "ManagedFloat"
    }

    fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    fn manage(&self, value: Value) -> RestrictionResult<Value> {
        match value {
            Value::Int(i) => Ok(Value::Float(i as f64)),
            other => Ok(other),
        }
    }
}
