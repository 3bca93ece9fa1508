//! Discriminated schemas
//!
//! The restriction of a dependent key is chosen by the current value of an
//! independent key:
//!
//! ```ignore
//! let mixin = Discriminated::new("item", "item_metadata")
//!     .variant("milk", &milk)
//!     .variant("cereal", &cereal)
//!     .register(&mut registry, "breakfast")?;
//!
//! let breakfast = SchemaBuilder::new("breakfast", "Breakfast")
//!     .extends(&mixin)
//!     .field("item", Declaration::values(["milk", "cereal"]))
//!     .field("item_metadata", Declaration::any())
//!     .register(&mut registry)?;
//! ```
//!
//! The mixin is an abstract Node carrying a `Discriminator`. Leaves extending
//! it re-validate the dependent value under the selected variant at
//! construction and whenever either key is assigned. The schema's own
//! restriction map is never modified.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::record::{RecordError, RecordResult};
use crate::restriction::{Declaration, Restriction};
use crate::schema::{
    CompileHook, Schema, SchemaBuilder, SchemaError, SchemaRef, SchemaRegistry, SchemaResult,
};
use crate::value::{Fields, Value};

/// Independent value -> nested restriction for the dependent key
#[derive(Debug)]
pub struct Discriminator {
    independent_key: String,
    dependent_key: String,
    variants: BTreeMap<Value, Arc<Restriction>>,
}

impl Discriminator {
    pub fn independent_key(&self) -> &str {
        &self.independent_key
    }

    pub fn dependent_key(&self) -> &str {
        &self.dependent_key
    }

    pub fn variants(&self) -> &BTreeMap<Value, Arc<Restriction>> {
        &self.variants
    }

    /// True if assigning `key` requires re-selecting the variant
    pub fn governs(&self, key: &str) -> bool {
        key == self.independent_key || key == self.dependent_key
    }

    pub fn variant_for(&self, independent: &Value) -> Option<&Arc<Restriction>> {
        self.variants.get(independent)
    }

    /// Re-validates the dependent value under the active variant.
    ///
    /// An independent value without a variant (a lenient default) selects
    /// nothing and leaves `fields` alone.
    pub(crate) fn apply(&self, schema: &Schema, fields: &mut Fields, strict: bool) -> RecordResult<()> {
        let variant = match fields
            .get(&self.independent_key)
            .and_then(|value| self.variant_for(value))
        {
            Some(variant) => Arc::clone(variant),
            None => return Ok(()),
        };
        let current = fields.remove(&self.dependent_key).unwrap_or(Value::Null);
        let accepted = variant
            .validate(current, strict)
            .map_err(|source| RecordError::Rejected {
                schema: schema.name().to_string(),
                key: self.dependent_key.clone(),
                source,
            })?;
        fields.insert(self.dependent_key.clone(), accepted);
        Ok(())
    }
}

/// Builder for a discriminated mixin schema
#[derive(Debug, Clone)]
pub struct Discriminated {
    independent_key: String,
    dependent_key: String,
    variants: Vec<(Value, SchemaRef)>,
}

impl Discriminated {
    pub fn new(independent_key: impl Into<String>, dependent_key: impl Into<String>) -> Self {
        Self {
            independent_key: independent_key.into(),
            dependent_key: dependent_key.into(),
            variants: Vec::new(),
        }
    }

    /// Maps an independent value to the nested schema of the dependent key.
    pub fn variant(mut self, value: impl Into<Value>, schema: &SchemaRef) -> Self {
        self.variants.push((value.into(), Arc::clone(schema)));
        self
    }

    /// Name the mixin is registered under
    pub fn mixin_name(&self) -> String {
        format!("dynamic_{}_mixin", self.dependent_key)
    }

    /// Registers the mixin Node in `module`.
    pub fn register(self, registry: &mut SchemaRegistry, module: &str) -> SchemaResult<SchemaRef> {
        let name = self.mixin_name();
        let mut variants = BTreeMap::new();
        for (value, schema) in self.variants {
            let restriction = registry
                .intern_mut()
                .intern(Declaration::schema(&schema))
                .map_err(|source| SchemaError::Restriction {
                    schema: name.clone(),
                    key: self.dependent_key.clone(),
                    source,
                })?;
            variants.insert(value, restriction);
        }

        let check = DiscriminatorCheck {
            independent_key: self.independent_key.clone(),
            dependent_key: self.dependent_key.clone(),
            values: variants.keys().cloned().collect(),
        };
        let discriminator = Discriminator {
            independent_key: self.independent_key,
            dependent_key: self.dependent_key,
            variants,
        };

        SchemaBuilder::new(module, name)
            .abstract_schema()
            .discriminator(discriminator)
            .hook(check)
            .register(registry)
    }
}

/// Static checks for leaves extending a discriminated mixin
struct DiscriminatorCheck {
    independent_key: String,
    dependent_key: String,
    values: BTreeSet<Value>,
}

impl CompileHook for DiscriminatorCheck {
    fn compile(&self, schema: &Schema) -> Result<(), String> {
        for key in [&self.independent_key, &self.dependent_key] {
            if !schema.has_key(key) {
                return Err(format!(
                    "{}.{} required in restrictions for dynamic restrictions",
                    schema.name(),
                    key
                ));
            }
        }

        let allowed = schema
            .restriction(&self.independent_key)
            .and_then(|r| r.allowed_values())
            .ok_or_else(|| {
                format!(
                    "{}.{} must be a value-set restriction",
                    schema.name(),
                    self.independent_key
                )
            })?;

        let missing: Vec<String> = allowed
            .difference(&self.values)
            .map(|v| v.to_string())
            .collect();
        let extra: Vec<String> = self
            .values
            .difference(allowed)
            .map(|v| v.to_string())
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            return Err(format!(
                "variants for {} must cover exactly its allowed values (missing [{}], extra [{}])",
                self.independent_key,
                missing.join(", "),
                extra.join(", ")
            ));
        }
        Ok(())
    }
}
