//! Validated record container
//!
//! A record's key set is fixed to its schema's restriction keys. Values only
//! enter through validation:
//!
//! | Operation      | Validation                                   | On failure         |
//! |----------------|----------------------------------------------|--------------------|
//! | `new(strict)`  | every key present, every value checked       | no record          |
//! | `new(lenient)` | missing keys take their default              | no record          |
//! | `set`          | value checked, discriminator, validators     | record unchanged   |
//! | `reinit`       | as `new`, in place                           | record unchanged   |
//!
//! There is no way to delete, clear or bulk-update keys.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::errors::{RecordError, RecordResult};
use crate::observability::{log_event, Event};
use crate::restriction::RestrictionError;
use crate::schema::{Schema, SchemaRef};
use crate::validator;
use crate::value::{fields_from_json, fields_to_json, serialize_fields, Fields, Value};

/// A mapping whose keys and values conform to a leaf schema
#[derive(Clone)]
pub struct Record {
    schema: SchemaRef,
    fields: Fields,
    /// Unvalidated attributes outside the key set
    free: Fields,
}

impl Record {
    /// Builds a record of `schema` from `data`.
    ///
    /// Unknown keys are rejected in both modes. In strict mode every key must
    /// be present and cross-field validators run; in lenient mode missing keys
    /// take their restriction's default.
    pub fn new(schema: &SchemaRef, data: Option<Fields>, strict: bool) -> RecordResult<Record> {
        let result = Self::build(schema, data.unwrap_or_default(), strict);
        if let Err(err) = &result {
            log_event(
                Event::RecordRejected,
                &[
                    ("schema", schema.name()),
                    ("code", err.code()),
                    ("reason", &err.to_string()),
                ],
            );
        }
        result
    }

    /// Strict construction.
    pub fn strict(schema: &SchemaRef, data: Fields) -> RecordResult<Record> {
        Self::new(schema, Some(data), true)
    }

    /// Lenient construction with every key at its default.
    pub fn lenient(schema: &SchemaRef) -> RecordResult<Record> {
        Self::new(schema, None, false)
    }

    /// Builds a record from a JSON object (`null` means no data).
    pub fn from_json(schema: &SchemaRef, json: &JsonValue, strict: bool) -> RecordResult<Record> {
        let data = match json {
            JsonValue::Object(object) => Some(fields_from_json(object)),
            JsonValue::Null => None,
            other => {
                return Err(RecordError::NotAMapping {
                    schema: schema.name().to_string(),
                    found: other.to_string(),
                })
            }
        };
        Self::new(schema, data, strict)
    }

    fn build(schema: &SchemaRef, data: Fields, strict: bool) -> RecordResult<Record> {
        if !schema.is_instantiable() {
            return Err(RecordError::NotInstantiable {
                schema: schema.name().to_string(),
                classification: schema.classification(),
            });
        }
        let record = Record {
            schema: Arc::clone(schema),
            fields: validate_data(schema, data, strict)?,
            free: Fields::new(),
        };
        if strict {
            validator::check(&record)?;
        }
        Ok(record)
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> RecordResult<&Value> {
        self.fields.get(key).ok_or_else(|| RecordError::MissingKey {
            schema: self.schema.name().to_string(),
            key: key.to_string(),
        })
    }

    /// Validates and stores `value` under `key`; on error nothing changes.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> RecordResult<()> {
        let result = self.try_set(key, value.into());
        self.log_rollback(key, &result);
        result
    }

    fn try_set(&mut self, key: &str, value: Value) -> RecordResult<()> {
        let restriction = self
            .schema
            .restriction(key)
            .ok_or_else(|| RecordError::UnknownKey {
                schema: self.schema.name().to_string(),
                key: key.to_string(),
            })?;
        let value = restriction
            .validate(value, true)
            .map_err(|source| rejected(&self.schema, key, source))?;

        let discriminator = self
            .schema
            .discriminator()
            .filter(|d| d.governs(key))
            .cloned();
        if discriminator.is_none() && self.schema.validators().is_empty() {
            self.fields.insert(key.to_string(), value);
            return Ok(());
        }

        let mut candidate = self.fields.clone();
        candidate.insert(key.to_string(), value);
        if let Some(discriminator) = discriminator {
            discriminator.apply(&self.schema, &mut candidate, true)?;
        }
        let staged = Record {
            schema: Arc::clone(&self.schema),
            fields: candidate,
            free: Fields::new(),
        };
        validator::check(&staged)?;
        self.fields = staged.fields;
        Ok(())
    }

    /// Re-runs construction in place. Free attributes are kept; on error
    /// nothing changes.
    pub fn reinit(&mut self, data: Option<Fields>, strict: bool) -> RecordResult<()> {
        let result = Self::build(&self.schema, data.unwrap_or_default(), strict)
            .map(|staged| self.fields = staged.fields);
        self.log_rollback("*", &result);
        result
    }

    /// Attribute lookup: record keys, then free attributes, then schema attributes.
    pub fn attr(&self, name: &str) -> RecordResult<&Value> {
        self.fields
            .get(name)
            .or_else(|| self.free.get(name))
            .or_else(|| self.schema.attribute(name))
            .ok_or_else(|| RecordError::MissingAttribute {
                schema: self.schema.name().to_string(),
                name: name.to_string(),
            })
    }

    /// Attribute assignment. Schema keys go through `set`; any other name is
    /// stored unvalidated in the free namespace.
    pub fn set_attr(&mut self, name: &str, value: impl Into<Value>) -> RecordResult<()> {
        if self.schema.has_key(name) {
            return self.set(name, value);
        }
        self.free.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Free attributes; not part of the record's contents
    pub fn free_attrs(&self) -> &Fields {
        &self.free
    }

    /// Edits the nested record under `key` on a copy and assigns it back
    /// through `set`.
    pub fn modify_nested<F>(&mut self, key: &str, edit: F) -> RecordResult<()>
    where
        F: FnOnce(&mut Record) -> RecordResult<()>,
    {
        let mut nested = match self.get(key)? {
            Value::Record(record) => (**record).clone(),
            _ => {
                return Err(RecordError::NotNested {
                    schema: self.schema.name().to_string(),
                    key: key.to_string(),
                })
            }
        };
        edit(&mut nested)?;
        self.set(key, nested)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Plain key to value copy of the record.
    pub fn to_fields(&self) -> Fields {
        self.fields.clone()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(fields_to_json(&self.fields))
    }

    fn log_rollback(&self, key: &str, result: &RecordResult<()>) {
        if let Err(err) = result {
            log_event(
                Event::RecordRollback,
                &[
                    ("schema", self.schema.name()),
                    ("key", key),
                    ("code", err.code()),
                    ("reason", &err.to_string()),
                ],
            );
        }
    }
}

/// Checks `data` against the schema's key set and restrictions.
fn validate_data(schema: &Schema, mut data: Fields, strict: bool) -> RecordResult<Fields> {
    if let Some(unknown) = data.keys().find(|key| !schema.has_key(key)) {
        return Err(RecordError::UnknownKey {
            schema: schema.name().to_string(),
            key: unknown.clone(),
        });
    }

    let mut fields = Fields::new();
    for (key, restriction) in schema.restrictions() {
        let value = match data.remove(key) {
            Some(value) => restriction
                .validate(value, strict)
                .map_err(|source| rejected(schema, key, source))?,
            None if strict => {
                return Err(RecordError::RequiredKey {
                    schema: schema.name().to_string(),
                    key: key.clone(),
                })
            }
            None => restriction.default_value(),
        };
        fields.insert(key.clone(), value);
    }

    if let Some(discriminator) = schema.discriminator() {
        discriminator.apply(schema, &mut fields, strict)?;
    }
    Ok(fields)
}

fn rejected(schema: &Schema, key: &str, source: RestrictionError) -> RecordError {
    RecordError::Rejected {
        schema: schema.name().to_string(),
        key: key.to_string(),
        source,
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("schema", &self.schema.name())
            .field("fields", &self.fields)
            .finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.schema.name(), self.to_json())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.fields == other.fields
    }
}

impl Eq for Record {}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.schema
            .id()
            .cmp(&other.schema.id())
            .then_with(|| self.fields.cmp(&other.fields))
    }
}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.id().hash(state);
        self.fields.hash(state);
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_fields(serializer, &self.fields)
    }
}
