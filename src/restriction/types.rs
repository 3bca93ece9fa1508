//! Restriction value objects
//!
//! A `Declaration` is the raw "what is allowed here" written in a schema. The
//! factory (`Restriction::make`) classifies it into exactly one
//! `Restriction` variant:
//!
//! | Kind          | allowed                       | validation                        |
//! |---------------|-------------------------------|-----------------------------------|
//! | TypeSet       | set of `ValueType`            | `value_type()` is a member        |
//! | ValueSet      | set of literal `Value`        | value is a member                 |
//! | Unrestricted  | nothing                       | always passes                     |
//! | Managed       | `ManagedRestriction`          | delegated to the manager          |
//! | Nested        | a schema (optionally or null) | record built from a raw mapping   |

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{RestrictionError, RestrictionResult};
use super::managed::ManagedRestriction;
use crate::record::Record;
use crate::schema::SchemaRef;
use crate::value::{Fields, Value, ValueType};

/// One element of an allowed list
#[derive(Debug, Clone)]
pub enum Item {
    Type(ValueType),
    Value(Value),
    Schema(SchemaRef),
}

impl From<ValueType> for Item {
    fn from(t: ValueType) -> Self {
        Item::Type(t)
    }
}

impl From<Value> for Item {
    fn from(v: Value) -> Self {
        Item::Value(v)
    }
}

impl From<&SchemaRef> for Item {
    fn from(schema: &SchemaRef) -> Self {
        Item::Schema(Arc::clone(schema))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Type(t) => write!(f, "{}", t),
            Item::Value(v) => write!(f, "{}", v),
            Item::Schema(s) => write!(f, "{}", s.name()),
        }
    }
}

/// The allowed part of a declaration
#[derive(Debug, Clone)]
pub enum Allowed {
    /// A list of types, literal values or one schema (plus null)
    Items(Vec<Item>),
    /// A schema reference on its own
    Schema(SchemaRef),
    /// Custom validation and normalisation
    Managed(Arc<dyn ManagedRestriction>),
}

/// A raw restriction declaration as written in a schema
#[derive(Debug, Clone)]
pub struct Declaration {
    allowed: Allowed,
    default: Option<Value>,
}

impl Declaration {
    pub fn new(allowed: Allowed) -> Self {
        Self {
            allowed,
            default: None,
        }
    }

    /// Declaration from a raw item list, classified by the factory.
    pub fn items(items: impl IntoIterator<Item = Item>) -> Self {
        Self::new(Allowed::Items(items.into_iter().collect()))
    }

    /// Allow values of the given types.
    pub fn types(types: impl IntoIterator<Item = ValueType>) -> Self {
        Self::items(types.into_iter().map(Item::Type))
    }

    /// Allow exactly the given literal values.
    pub fn values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::items(values.into_iter().map(|v| Item::Value(v.into())))
    }

    /// Allow anything.
    pub fn any() -> Self {
        Self::items(Vec::new())
    }

    /// Nested record of `schema`.
    pub fn schema(schema: &SchemaRef) -> Self {
        Self::new(Allowed::Schema(Arc::clone(schema)))
    }

    /// Nested record of `schema`, or null.
    pub fn nullable_schema(schema: &SchemaRef) -> Self {
        Self::items([Item::Schema(Arc::clone(schema)), Item::Type(ValueType::Null)])
    }

    /// Custom managed restriction.
    pub fn managed(manager: impl ManagedRestriction + 'static) -> Self {
        Self::new(Allowed::Managed(Arc::new(manager)))
    }

    /// Value used for a missing key in lenient construction.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn allowed(&self) -> &Allowed {
        &self.allowed
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Allowed, Option<Value>) {
        (self.allowed, self.default)
    }
}

/// Restriction kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    TypeSet,
    ValueSet,
    Unrestricted,
    Managed,
    Nested,
    NullableNested,
}

impl RestrictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictionKind::TypeSet => "type-set",
            RestrictionKind::ValueSet => "value-set",
            RestrictionKind::Unrestricted => "unrestricted",
            RestrictionKind::Managed => "managed",
            RestrictionKind::Nested => "nested",
            RestrictionKind::NullableNested => "nullable-nested",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable rule describing the values a key may hold, plus its default
#[derive(Debug)]
pub enum Restriction {
    TypeSet {
        allowed: BTreeSet<ValueType>,
        default: Value,
    },
    ValueSet {
        allowed: BTreeSet<Value>,
        default: Value,
    },
    Unrestricted {
        default: Value,
    },
    Managed {
        manager: Arc<dyn ManagedRestriction>,
        /// Overrides the manager's own default when set
        default: Option<Value>,
    },
    Nested {
        schema: SchemaRef,
        nullable: bool,
        /// Lenient instance of `schema`
        default: Value,
    },
}

impl Restriction {
    /// Type-set restriction.
    pub fn type_set(allowed: impl IntoIterator<Item = ValueType>, default: Value) -> Self {
        Restriction::TypeSet {
            allowed: allowed.into_iter().collect(),
            default,
        }
    }

    /// Value-set restriction.
    pub fn value_set<V: Into<Value>>(allowed: impl IntoIterator<Item = V>, default: Value) -> Self {
        Restriction::ValueSet {
            allowed: allowed.into_iter().map(Into::into).collect(),
            default,
        }
    }

    /// Restriction that accepts anything.
    pub fn unrestricted(default: Value) -> Self {
        Restriction::Unrestricted { default }
    }

    pub fn kind(&self) -> RestrictionKind {
        match self {
            Restriction::TypeSet { .. } => RestrictionKind::TypeSet,
            Restriction::ValueSet { .. } => RestrictionKind::ValueSet,
            Restriction::Unrestricted { .. } => RestrictionKind::Unrestricted,
            Restriction::Managed { .. } => RestrictionKind::Managed,
            Restriction::Nested { nullable: false, .. } => RestrictionKind::Nested,
            Restriction::Nested { nullable: true, .. } => RestrictionKind::NullableNested,
        }
    }

    /// Value used for a missing key in lenient construction.
    pub fn default_value(&self) -> Value {
        match self {
            Restriction::TypeSet { default, .. }
            | Restriction::ValueSet { default, .. }
            | Restriction::Unrestricted { default }
            | Restriction::Nested { default, .. } => default.clone(),
            Restriction::Managed { manager, default } => default
                .clone()
                .unwrap_or_else(|| manager.restriction().default_value()),
        }
    }

    /// Literal values of a value-set restriction.
    pub fn allowed_values(&self) -> Option<&BTreeSet<Value>> {
        match self {
            Restriction::ValueSet { allowed, .. } => Some(allowed),
            _ => None,
        }
    }

    /// Types of a type-set restriction.
    pub fn allowed_types(&self) -> Option<&BTreeSet<ValueType>> {
        match self {
            Restriction::TypeSet { allowed, .. } => Some(allowed),
            _ => None,
        }
    }

    /// Schema of a nested restriction.
    pub fn nested_schema(&self) -> Option<&SchemaRef> {
        match self {
            Restriction::Nested { schema, .. } => Some(schema),
            _ => None,
        }
    }

    pub fn manager(&self) -> Option<&Arc<dyn ManagedRestriction>> {
        match self {
            Restriction::Managed { manager, .. } => Some(manager),
            _ => None,
        }
    }

    /// Renders the allowed set for error messages
    pub fn allowed_display(&self) -> String {
        match self {
            Restriction::TypeSet { allowed, .. } => join(allowed.iter()),
            Restriction::ValueSet { allowed, .. } => join(allowed.iter()),
            Restriction::Unrestricted { .. } => "[]".to_string(),
            Restriction::Managed { manager, .. } => manager.name().to_string(),
            Restriction::Nested {
                schema,
                nullable: false,
                ..
            } => schema.name().to_string(),
            Restriction::Nested {
                schema,
                nullable: true,
                ..
            } => format!("[{}, null]", schema.name()),
        }
    }

    /// Validates `value`, returning the accepted (possibly normalised) value.
    ///
    /// `strict` only matters for nested restrictions: lenient nested
    /// validation lets a partial mapping fall back to per-key defaults.
    /// Managers run in both modes.
    pub fn validate(&self, value: Value, strict: bool) -> RestrictionResult<Value> {
        match self {
            Restriction::TypeSet { allowed, .. } => {
                if allowed.contains(&value.value_type()) {
                    Ok(value)
                } else {
                    Err(RestrictionError::bad_data(&value, self))
                }
            }
            Restriction::ValueSet { allowed, .. } => {
                if allowed.contains(&value) {
                    Ok(value)
                } else {
                    Err(RestrictionError::bad_data(&value, self))
                }
            }
            Restriction::Unrestricted { .. } => Ok(value),
            Restriction::Managed { manager, .. } => {
                let managed = manager.manage(value)?;
                manager.restriction().validate(managed, strict)
            }
            Restriction::Nested {
                schema, nullable, ..
            } => match value {
                Value::Null if *nullable => Ok(Value::Null),
                Value::Record(record) if record.schema().id() == schema.id() => {
                    Ok(Value::Record(record))
                }
                Value::Record(record) => build_nested(schema, Some(record.into_fields()), strict),
                Value::Map(fields) => build_nested(schema, Some(fields), strict),
                Value::Null if !strict => build_nested(schema, None, false),
                other => Err(RestrictionError::bad_data(&other, self)),
            },
        }
    }
}

fn build_nested(schema: &SchemaRef, data: Option<Fields>, strict: bool) -> RestrictionResult<Value> {
    Record::new(schema, data, strict)
        .map(Value::from)
        .map_err(|e| RestrictionError::Nested {
            schema: schema.name().to_string(),
            source: Box::new(e),
        })
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let parts: Vec<String> = items.map(|item| item.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
