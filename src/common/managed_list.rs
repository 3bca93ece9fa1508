//! Managed list of nested records
//!
//! Every item is coerced to a record of one schema: records of that schema
//! are kept, mappings and records of other schemas are rebuilt strictly.
//! Items may optionally be ordered by one of their keys.

use serde_json::Value as JsonValue;

use crate::record::Record;
use crate::restriction::{mapping, ManagedRestriction, Restriction, RestrictionError, RestrictionResult};
use crate::schema::SchemaRef;
use crate::value::{Value, ValueType};

#[derive(Debug)]
pub struct ManagedList {
    schema: SchemaRef,
    nullable: bool,
    order: Option<(String, bool)>,
    restriction: Restriction,
}

impl ManagedList {
    pub fn new(schema: &SchemaRef) -> Self {
        Self {
            schema: SchemaRef::clone(schema),
            nullable: false,
            order: None,
            restriction: Restriction::type_set([ValueType::List, ValueType::Null], Value::Null),
        }
    }

    /// Accepts null as a value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sorts items by `key`, descending if `reverse`.
    pub fn ordered_by(mut self, key: impl Into<String>, reverse: bool) -> Self {
        self.order = Some((key.into(), reverse));
        self
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    fn coerce(&self, item: Value) -> RestrictionResult<Record> {
        let data = match item {
            Value::Record(record) if record.schema().id() == self.schema.id() => return Ok(*record),
            Value::Record(record) => record.into_fields(),
            Value::Map(fields) => fields,
            other => {
                return Err(RestrictionError::managed(
                    self.name(),
                    &other,
                    format!("items must be {} records or mappings", self.schema.name()),
                ))
            }
        };
        Record::new(&self.schema, Some(data), true).map_err(|e| RestrictionError::Nested {
            schema: self.schema.name().to_string(),
            source: Box::new(e),
        })
    }

    fn sort(&self, records: &mut [Record]) -> RestrictionResult<()> {
        let (key, reverse) = match &self.order {
            Some(order) => order,
            None => return Ok(()),
        };
        if !self.schema.has_key(key) {
            return Err(RestrictionError::managed(
                self.name(),
                &Value::from(key.as_str()),
                format!("{} has no key to order by", self.schema.name()),
            ));
        }
        records.sort_by(|a, b| {
            let ordering = a.fields().get(key).cmp(&b.fields().get(key));
            if *reverse {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Ok(())
    }
}

impl ManagedRestriction for ManagedList {
    fn name(&self) -> &str {
        "ManagedList"
    }

    fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    fn manage(&self, value: Value) -> RestrictionResult<Value> {
        let items = match value {
            Value::Null if self.nullable => return Ok(Value::Null),
            Value::List(items) => items,
            other => {
                return Err(RestrictionError::managed(
                    self.name(),
                    &other,
                    "expected a list",
                ))
            }
        };
        let mut records = items
            .into_iter()
            .map(|item| self.coerce(item))
            .collect::<RestrictionResult<Vec<Record>>>()?;
        self.sort(&mut records)?;
        Ok(Value::List(records.into_iter().map(Value::from).collect()))
    }

    fn index_mapping(&self) -> Option<JsonValue> {
        mapping::nested(&self.schema).ok()
    }
}
