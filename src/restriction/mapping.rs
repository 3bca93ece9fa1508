//! Search-index mapping descriptors
//!
//! Each restriction derives the field mapping an external indexer would use.
//! Ambiguous type sets (int or float, say) fail instead of picking one.

use serde_json::{json, Map, Value as JsonValue};

use super::errors::{RestrictionError, RestrictionResult};
use super::types::Restriction;
use crate::schema::Schema;
use crate::value::ValueType;

/// Index field types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFieldType {
    Integer,
    Float,
    Boolean,
    Date,
    Text,
    Keyword,
    Object,
    Nested,
}

impl IndexFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexFieldType::Integer => "integer",
            IndexFieldType::Float => "float",
            IndexFieldType::Boolean => "boolean",
            IndexFieldType::Date => "date",
            IndexFieldType::Text => "text",
            IndexFieldType::Keyword => "keyword",
            IndexFieldType::Object => "object",
            IndexFieldType::Nested => "nested",
        }
    }

    /// Field type for a single value type
    pub fn for_type(value_type: ValueType) -> Option<IndexFieldType> {
        match value_type {
            ValueType::Int => Some(IndexFieldType::Integer),
            ValueType::Float => Some(IndexFieldType::Float),
            ValueType::Bool => Some(IndexFieldType::Boolean),
            ValueType::Date | ValueType::DateTime => Some(IndexFieldType::Date),
            ValueType::Str => Some(IndexFieldType::Text),
            ValueType::Map => Some(IndexFieldType::Object),
            ValueType::Null | ValueType::List | ValueType::Set | ValueType::Record => None,
        }
    }

    pub fn descriptor(&self) -> JsonValue {
        json!({ "type": self.as_str() })
    }
}

impl Restriction {
    /// Field mapping descriptor for this restriction.
    pub fn index_mapping(&self) -> RestrictionResult<JsonValue> {
        match self {
            Restriction::TypeSet { allowed, .. } => {
                let candidates: Vec<ValueType> = allowed
                    .iter()
                    .copied()
                    .filter(|t| *t != ValueType::Null)
                    .collect();
                match candidates.as_slice() {
                    [single] => IndexFieldType::for_type(*single)
                        .map(|field| field.descriptor())
                        .ok_or_else(|| self.not_mappable()),
                    [] => Err(self.not_mappable()),
                    _ => Err(RestrictionError::AmbiguousMapping {
                        allowed: self.allowed_display(),
                    }),
                }
            }
            Restriction::ValueSet { .. } => Ok(IndexFieldType::Keyword.descriptor()),
            Restriction::Unrestricted { .. } => Err(self.not_mappable()),
            Restriction::Managed { manager, .. } => match manager.index_mapping() {
                Some(mapping) => Ok(mapping),
                None => manager.restriction().index_mapping(),
            },
            Restriction::Nested { schema, .. } => Ok(json!({ "properties": properties(schema)? })),
        }
    }

    fn not_mappable(&self) -> RestrictionError {
        RestrictionError::NotMappable {
            kind: self.kind(),
            allowed: self.allowed_display(),
        }
    }
}

/// Per-key mappings of a schema, honouring its index overrides.
pub fn properties(schema: &Schema) -> RestrictionResult<JsonValue> {
    let mut props = Map::new();
    for (key, restriction) in schema.restrictions() {
        let mapping = match schema.index_override(key) {
            Some(mapping) => mapping.clone(),
            None => restriction.index_mapping()?,
        };
        props.insert(key.clone(), mapping);
    }
    Ok(JsonValue::Object(props))
}

/// Mapping for a list of records of `schema`.
pub fn nested(schema: &Schema) -> RestrictionResult<JsonValue> {
    Ok(json!({
        "type": IndexFieldType::Nested.as_str(),
        "properties": properties(schema)?,
    }))
}
