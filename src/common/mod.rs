//! Commonly used declarations and managed restrictions
//!
//! Shorthands return fresh `Declaration`s; chain `.with_default(..)` where a
//! default is needed. All of them except `bool_int` are type sets.

mod managed_datetime;
mod managed_float;
mod managed_list;
mod managed_pattern;

pub use managed_datetime::{DefaultBound, ManagedDatetime, Precision};
pub use managed_float::ManagedFloat;
pub use managed_list::ManagedList;
pub use managed_pattern::ManagedPattern;

use crate::restriction::Declaration;
use crate::value::ValueType;

pub fn int() -> Declaration {
    Declaration::types([ValueType::Int])
}

pub fn float() -> Declaration {
    Declaration::types([ValueType::Float])
}

pub fn string() -> Declaration {
    Declaration::types([ValueType::Str])
}

pub fn boolean() -> Declaration {
    Declaration::types([ValueType::Bool])
}

pub fn list() -> Declaration {
    Declaration::types([ValueType::List])
}

pub fn set() -> Declaration {
    Declaration::types([ValueType::Set])
}

pub fn date() -> Declaration {
    Declaration::types([ValueType::Date])
}

pub fn datetime() -> Declaration {
    Declaration::types([ValueType::DateTime])
}

pub fn null_int() -> Declaration {
    Declaration::types([ValueType::Int, ValueType::Null])
}

pub fn null_float() -> Declaration {
    Declaration::types([ValueType::Float, ValueType::Null])
}

pub fn null_string() -> Declaration {
    Declaration::types([ValueType::Str, ValueType::Null])
}

pub fn null_list() -> Declaration {
    Declaration::types([ValueType::List, ValueType::Null])
}

pub fn null_date() -> Declaration {
    Declaration::types([ValueType::Date, ValueType::Null])
}

pub fn null_datetime() -> Declaration {
    Declaration::types([ValueType::DateTime, ValueType::Null])
}

/// Boolean stored as the integers 0 and 1 (a value set)
pub fn bool_int() -> Declaration {
    Declaration::values([0, 1])
}
