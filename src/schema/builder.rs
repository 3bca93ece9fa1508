//! Schema declaration
//!
//! ```ignore
//! let base = SchemaBuilder::new("catalog", "Product")
//!     .require(["code"])
//!     .unique(["code"])
//!     .register(&mut registry)?;
//!
//! let shoe = SchemaBuilder::new("catalog", "Shoe")
//!     .extends(&base)
//!     .attribute("code", "SHOE")
//!     .field("size", common::int())
//!     .register(&mut registry)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::errors::SchemaResult;
use super::registry::SchemaRegistry;
use super::types::{CompileHook, SchemaRef};
use crate::dynamic::Discriminator;
use crate::restriction::{Declaration, Restriction};
use crate::validator::CrossFieldValidator;
use crate::value::Value;

/// How a key's restriction was given
#[derive(Debug, Clone)]
pub(crate) enum FieldSpec {
    /// Classified and interned at registration
    Declared(Declaration),
    /// Already built, used as is
    Shared(Arc<Restriction>),
}

/// Collects a schema declaration until it is registered
pub struct SchemaBuilder {
    pub(crate) module: String,
    pub(crate) name: String,
    pub(crate) parents: Vec<SchemaRef>,
    pub(crate) fields: BTreeMap<String, FieldSpec>,
    pub(crate) attributes: BTreeMap<String, Value>,
    pub(crate) required: Option<Vec<String>>,
    pub(crate) unique: Vec<String>,
    pub(crate) is_abstract: bool,
    pub(crate) validators: Vec<Arc<dyn CrossFieldValidator>>,
    pub(crate) hooks: Vec<Arc<dyn CompileHook>>,
    pub(crate) index_overrides: BTreeMap<String, JsonValue>,
    pub(crate) discriminator: Option<Arc<Discriminator>>,
}

impl SchemaBuilder {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            parents: Vec::new(),
            fields: BTreeMap::new(),
            attributes: BTreeMap::new(),
            required: None,
            unique: Vec::new(),
            is_abstract: false,
            validators: Vec::new(),
            hooks: Vec::new(),
            index_overrides: BTreeMap::new(),
            discriminator: None,
        }
    }

    /// Adds a parent. Earlier parents win on key clashes.
    pub fn extends(mut self, parent: &SchemaRef) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    /// Declares a key.
    pub fn field(mut self, key: impl Into<String>, declaration: Declaration) -> Self {
        self.fields.insert(key.into(), FieldSpec::Declared(declaration));
        self
    }

    /// Declares a key with an already built restriction.
    pub fn restriction(mut self, key: impl Into<String>, restriction: Arc<Restriction>) -> Self {
        self.fields.insert(key.into(), FieldSpec::Shared(restriction));
        self
    }

    /// Adds a schema-level attribute (not a record key).
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Declares keys descendants must fulfil. Makes this schema a Root.
    pub fn require<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required
            .get_or_insert_with(Vec::new)
            .extend(keys.into_iter().map(Into::into));
        self
    }

    /// Marks required keys whose values must differ between leaves.
    pub fn unique<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Marks the schema abstract (Node).
    pub fn abstract_schema(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn validator(mut self, validator: impl CrossFieldValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Adds a check run when a leaf schema (this one or a descendant) registers.
    pub fn hook(mut self, hook: impl CompileHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Replaces the derived index mapping of `key`.
    pub fn index_override(mut self, key: impl Into<String>, mapping: JsonValue) -> Self {
        self.index_overrides.insert(key.into(), mapping);
        self
    }

    pub(crate) fn discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(Arc::new(discriminator));
        self
    }

    /// Registers under the registry's duplicate policy.
    pub fn register(self, registry: &mut SchemaRegistry) -> SchemaResult<SchemaRef> {
        registry.register(self)
    }

    /// Registers, replacing an earlier schema of the same module and name.
    pub fn replace(self, registry: &mut SchemaRegistry) -> SchemaResult<SchemaRef> {
        registry.replace(self)
    }
}
