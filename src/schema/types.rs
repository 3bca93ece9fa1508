//! Registered schema descriptors
//!
//! A `Schema` is immutable once registered. Descendants refer to their
//! parents by `SchemaRef`; the parent graph is a DAG by construction because
//! a parent must be registered before its children.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::view::SchemaView;
use crate::dynamic::Discriminator;
use crate::restriction::Restriction;
use crate::validator::CrossFieldValidator;
use crate::value::Value;

/// Shared handle to a registered schema
pub type SchemaRef = Arc<Schema>;

/// Process-unique schema identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaId(u64);

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

impl SchemaId {
    pub(crate) fn next() -> Self {
        SchemaId(NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Role of a schema in the requirement contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Declares required (and unique) keys; not instantiable
    Root,
    /// Abstract; forwards requirements; not instantiable
    Node,
    /// Concrete; fulfils every inherited requirement
    Leaf,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Root => "root",
            Classification::Node => "node",
            Classification::Leaf => "leaf",
        }
    }

    /// Root and Node schemas carry requirements
    pub fn declares_requirements(&self) -> bool {
        matches!(self, Classification::Root | Classification::Node)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a namespace entry holds
///
/// Only attribute values take part in unique-value checks. Restriction keys
/// compare by restriction identity.
#[derive(Debug, Clone)]
pub enum Member {
    Attribute(Value),
    Field(Arc<Restriction>),
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Member::Attribute(a), Member::Attribute(b)) => a == b,
            (Member::Field(a), Member::Field(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Attribute(value) => write!(f, "{}", value),
            Member::Field(restriction) => write!(f, "{}", restriction.allowed_display()),
        }
    }
}

/// Static check run once when a leaf schema is registered
pub trait CompileHook: Send + Sync {
    fn compile(&self, schema: &Schema) -> Result<(), String>;
}

impl<F> CompileHook for F
where
    F: Fn(&Schema) -> Result<(), String> + Send + Sync,
{
    fn compile(&self, schema: &Schema) -> Result<(), String> {
        self(schema)
    }
}

/// A registered schema
pub struct Schema {
    pub(crate) id: SchemaId,
    pub(crate) module: String,
    pub(crate) name: String,
    pub(crate) classification: Classification,
    /// Own plus inherited requirements
    pub(crate) required: BTreeSet<String>,
    pub(crate) unique: BTreeSet<String>,
    pub(crate) parents: Vec<SchemaRef>,
    /// Every ancestor, depth-first in parent order, without repeats
    pub(crate) ancestors: Vec<SchemaRef>,
    pub(crate) attributes: BTreeMap<String, Value>,
    pub(crate) own_keys: BTreeSet<String>,
    /// Effective key set: inherited keys overlaid by own keys
    pub(crate) restrictions: BTreeMap<String, Arc<Restriction>>,
    pub(crate) validators: Vec<Arc<dyn CrossFieldValidator>>,
    pub(crate) hooks: Vec<Arc<dyn CompileHook>>,
    pub(crate) discriminator: Option<Arc<Discriminator>>,
    pub(crate) index_overrides: BTreeMap<String, JsonValue>,
    pub(crate) view: OnceLock<SchemaView>,
}

impl Schema {
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `module.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn is_instantiable(&self) -> bool {
        self.classification == Classification::Leaf
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn unique(&self) -> &BTreeSet<String> {
        &self.unique
    }

    pub fn parents(&self) -> &[SchemaRef] {
        &self.parents
    }

    pub fn ancestors(&self) -> &[SchemaRef] {
        &self.ancestors
    }

    /// Key to restriction mapping records of this schema are checked against
    pub fn restrictions(&self) -> &BTreeMap<String, Arc<Restriction>> {
        &self.restrictions
    }

    pub fn restriction(&self, key: &str) -> Option<&Arc<Restriction>> {
        self.restrictions.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.restrictions.keys().map(String::as_str)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.restrictions.contains_key(key)
    }

    /// Attributes declared on this schema itself
    pub fn own_attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Attribute lookup through the ancestor chain, own first
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).or_else(|| {
            self.ancestors
                .iter()
                .find_map(|ancestor| ancestor.attributes.get(name))
        })
    }

    /// True if `name` is an own attribute or own restriction key
    pub fn in_namespace(&self, name: &str) -> bool {
        self.attributes.contains_key(name) || self.own_keys.contains(name)
    }

    /// Own namespace entry for `name`
    pub fn own_member(&self, name: &str) -> Option<Member> {
        if let Some(value) = self.attributes.get(name) {
            return Some(Member::Attribute(value.clone()));
        }
        if self.own_keys.contains(name) {
            return self.restrictions.get(name).cloned().map(Member::Field);
        }
        None
    }

    /// Namespace entry for `name`, searching ancestors after this schema
    pub fn member(&self, name: &str) -> Option<Member> {
        self.own_member(name).or_else(|| {
            self.ancestors
                .iter()
                .find_map(|ancestor| ancestor.own_member(name))
        })
    }

    pub fn validators(&self) -> &[Arc<dyn CrossFieldValidator>] {
        &self.validators
    }

    pub fn discriminator(&self) -> Option<&Arc<Discriminator>> {
        self.discriminator.as_ref()
    }

    pub fn index_override(&self, key: &str) -> Option<&JsonValue> {
        self.index_overrides.get(key)
    }

    /// Structural view, computed on first use
    pub fn view(&self) -> &SchemaView {
        self.view.get_or_init(|| SchemaView::of(self))
    }

    pub(crate) fn hooks(&self) -> &[Arc<dyn CompileHook>] {
        &self.hooks
    }

    /// True if `other` is this schema or one of its ancestors
    pub fn extends(&self, other: &Schema) -> bool {
        self.id == other.id || self.ancestors.iter().any(|a| a.id == other.id)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("module", &self.module)
            .field("name", &self.name)
            .field("classification", &self.classification)
            .field("required", &self.required)
            .field("unique", &self.unique)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("keys", &self.restrictions.keys().collect::<Vec<_>>())
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
