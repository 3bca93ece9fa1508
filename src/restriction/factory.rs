//! Declaration classification
//!
//! `Restriction::make` turns a raw `Declaration` into exactly one restriction
//! kind. Malformed declarations fail here, while the owning schema is being
//! registered, never during validation.

use std::collections::BTreeSet;

use super::errors::{RestrictionError, RestrictionResult};
use super::types::{Allowed, Declaration, Item, Restriction};
use crate::record::Record;
use crate::schema::{Classification, SchemaRef};
use crate::value::{Value, ValueType};

impl Restriction {
    /// Classifies a declaration.
    ///
    /// Dispatch order, first match wins:
    /// 1. managed
    /// 2. empty item list -> unrestricted
    /// 3. `[schema, null]` in either order -> nullable nested
    /// 4. any other list holding a schema -> error
    /// 5. any type in the list -> type set (types only)
    /// 6. otherwise -> value set
    ///
    /// A bare schema reference yields a nested restriction.
    pub fn make(declaration: Declaration) -> RestrictionResult<Restriction> {
        let (allowed, default) = declaration.into_parts();
        match allowed {
            Allowed::Managed(manager) => Ok(Restriction::Managed { manager, default }),
            Allowed::Schema(schema) => nested(schema, false, default),
            Allowed::Items(items) => from_items(items, default),
        }
    }
}

fn from_items(items: Vec<Item>, default: Option<Value>) -> RestrictionResult<Restriction> {
    if items.is_empty() {
        return Ok(Restriction::Unrestricted {
            default: default.unwrap_or(Value::Null),
        });
    }

    let schemas: Vec<&SchemaRef> = items
        .iter()
        .filter_map(|item| match item {
            Item::Schema(schema) => Some(schema),
            _ => None,
        })
        .collect();

    match schemas.as_slice() {
        [] => {}
        [schema] => {
            let with_null = items.len() == 2
                && items
                    .iter()
                    .any(|item| matches!(item, Item::Type(ValueType::Null)));
            if with_null {
                return nested((*schema).clone(), true, default);
            }
            return Err(RestrictionError::SchemaWithOthers {
                schema: schema.name().to_string(),
                allowed: display_items(&items),
            });
        }
        _ => {
            return Err(RestrictionError::MultipleSchemas {
                allowed: display_items(&items),
            })
        }
    }

    let default = default.unwrap_or(Value::Null);

    if items.iter().any(|item| matches!(item, Item::Type(_))) {
        let mut types = BTreeSet::new();
        for item in &items {
            match item {
                Item::Type(t) => {
                    types.insert(*t);
                }
                _ => {
                    return Err(RestrictionError::MixedTypesAndValues {
                        allowed: display_items(&items),
                    })
                }
            }
        }
        return Ok(Restriction::TypeSet {
            allowed: types,
            default,
        });
    }

    let values = items
        .into_iter()
        .filter_map(|item| match item {
            Item::Value(v) => Some(v),
            _ => None,
        })
        .collect();
    Ok(Restriction::ValueSet {
        allowed: values,
        default,
    })
}

fn nested(
    schema: SchemaRef,
    nullable: bool,
    default: Option<Value>,
) -> RestrictionResult<Restriction> {
    if let Some(default) = default {
        return Err(RestrictionError::InvalidDefault {
            default: default.to_string(),
            reason: format!(
                "nested {} restriction defaults to a lenient instance",
                schema.name()
            ),
        });
    }
    if schema.classification() != Classification::Leaf {
        return Err(RestrictionError::NotInstantiable(schema.name().to_string()));
    }
    let instance = Record::lenient(&schema).map_err(|e| RestrictionError::Nested {
        schema: schema.name().to_string(),
        source: Box::new(e),
    })?;
    Ok(Restriction::Nested {
        schema,
        nullable,
        default: Value::from(instance),
    })
}

pub(crate) fn display_items(items: &[Item]) -> String {
    let parts: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
