//! Managed date and datetime restriction
//!
//! | input                  | `from` bound | `to` bound  | no bound            |
//! |------------------------|--------------|-------------|---------------------|
//! | null                   | Unix epoch   | now / today | null if nullable    |
//! | date / datetime value  | kept         | kept        | kept                |
//! | string                 | parsed       | parsed      | parsed              |
//!
//! Strings are parsed strictly (`%Y-%m-%d` or `%Y-%m-%dT%H:%M:%S`); datetimes
//! are truncated to whole seconds. The manager runs for every supplied value,
//! strict or lenient; a key missing from lenient data takes null.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

use crate::restriction::{ManagedRestriction, Restriction, RestrictionError, RestrictionResult};
use crate::value::{Value, ValueType};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Date,
    DateTime,
}

/// Value substituted for null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultBound {
    /// Unix epoch
    From,
    /// Current local time
    To,
}

#[derive(Debug)]
pub struct ManagedDatetime {
    precision: Precision,
    bound: Option<DefaultBound>,
    nullable: bool,
    restriction: Restriction,
}

impl ManagedDatetime {
    pub fn new(precision: Precision, bound: Option<DefaultBound>, nullable: bool) -> Self {
        let mut allowed = vec![match precision {
            Precision::Date => ValueType::Date,
            Precision::DateTime => ValueType::DateTime,
        }];
        if nullable {
            allowed.push(ValueType::Null);
        }
        Self {
            precision,
            bound,
            nullable,
            restriction: Restriction::type_set(allowed, Value::Null),
        }
    }

    pub fn date() -> Self {
        Self::new(Precision::Date, None, false)
    }

    pub fn datetime() -> Self {
        Self::new(Precision::DateTime, None, false)
    }

    pub fn null_date() -> Self {
        Self::new(Precision::Date, None, true)
    }

    pub fn null_datetime() -> Self {
        Self::new(Precision::DateTime, None, true)
    }

    /// Date defaulting to the epoch.
    pub fn from_date() -> Self {
        Self::new(Precision::Date, Some(DefaultBound::From), false)
    }

    /// Date defaulting to today.
    pub fn to_date() -> Self {
        Self::new(Precision::Date, Some(DefaultBound::To), false)
    }

    /// Datetime defaulting to the epoch.
    pub fn from_datetime() -> Self {
        Self::new(Precision::DateTime, Some(DefaultBound::From), false)
    }

    /// Datetime defaulting to now.
    pub fn to_datetime() -> Self {
        Self::new(Precision::DateTime, Some(DefaultBound::To), false)
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    fn bound_value(&self, bound: DefaultBound) -> Value {
        match (bound, self.precision) {
            (DefaultBound::From, Precision::Date) => Value::Date(NaiveDate::default()),
            (DefaultBound::From, Precision::DateTime) => Value::DateTime(NaiveDateTime::default()),
            (DefaultBound::To, Precision::Date) => Value::Date(Local::now().date_naive()),
            (DefaultBound::To, Precision::DateTime) => {
                Value::DateTime(truncate(Local::now().naive_local()))
            }
        }
    }

    fn parse(&self, raw: &str) -> RestrictionResult<Value> {
        let parsed = match self.precision {
            Precision::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT).map(Value::Date),
            Precision::DateTime => {
                NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map(Value::DateTime)
            }
        };
        parsed.map_err(|e| RestrictionError::managed(self.name(), &Value::from(raw), e.to_string()))
    }
}

fn truncate(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

impl ManagedRestriction for ManagedDatetime {
    fn name(&self) -> &str {
        match self.precision {
            Precision::Date => "ManagedDate",
            Precision::DateTime => "ManagedDatetime",
        }
    }

    fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    fn manage(&self, value: Value) -> RestrictionResult<Value> {
        match value {
            Value::Null => match self.bound {
                Some(bound) => Ok(self.bound_value(bound)),
                None if self.nullable => Ok(Value::Null),
                None => Err(RestrictionError::bad_data(&value, &self.restriction)),
            },
            Value::Str(raw) => self.parse(&raw),
            Value::DateTime(dt) => Ok(Value::DateTime(truncate(dt))),
            // Wrong kinds fall through to the type check
            other => Ok(other),
        }
    }
}
