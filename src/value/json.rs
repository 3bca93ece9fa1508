//! JSON conversion for values
//!
//! Outbound, dates and datetimes become ISO-8601 strings, sets become arrays and
//! records become their key to value mapping. Inbound, integral numbers become
//! ints and objects become maps; nothing is turned back into a date.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

use super::types::{Fields, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl Value {
    /// Converts this value into a JSON tree.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number(Number::from(*i)),
            // Non-finite floats have no JSON form
            Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Date(d) => JsonValue::String(d.format(DATE_FORMAT).to_string()),
            Value::DateTime(dt) => JsonValue::String(dt.format(DATETIME_FORMAT).to_string()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Set(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => JsonValue::Object(fields_to_json(map)),
            Value::Record(record) => JsonValue::Object(fields_to_json(record.fields())),
        }
    }
}

/// Converts a field mapping into a JSON object.
pub fn fields_to_json(fields: &Fields) -> Map<String, JsonValue> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

/// Converts a JSON object into a field mapping.
pub fn fields_from_json(object: &Map<String, JsonValue>) -> Fields {
    object
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(value)))
        .collect()
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Str(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            JsonValue::Object(object) => Value::Map(fields_from_json(object)),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from(&json)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            Value::DateTime(dt) => serializer.collect_str(&dt.format(DATETIME_FORMAT)),
            Value::List(items) => serialize_items(serializer, items.len(), items.iter()),
            Value::Set(items) => serialize_items(serializer, items.len(), items.iter()),
            Value::Map(map) => serialize_fields(serializer, map),
            Value::Record(record) => serialize_fields(serializer, record.fields()),
        }
    }
}

fn serialize_items<'a, S: Serializer>(
    serializer: S,
    len: usize,
    items: impl Iterator<Item = &'a Value>,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(len))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

pub(crate) fn serialize_fields<S: Serializer>(
    serializer: S,
    fields: &Fields,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (key, value) in fields {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
