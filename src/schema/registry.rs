//! Schema registry
//!
//! Registration is the only place structural contracts are checked. Every
//! check runs against a staged schema; the registry (schemas, unique-value
//! claims) only changes once all checks and compile hooks have passed.
//!
//! Classification:
//! - requirements declared -> Root (Node when also abstract)
//! - abstract, no requirements -> Node
//! - otherwise -> Leaf

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, OnceLock};

use super::builder::{FieldSpec, SchemaBuilder};
use super::errors::{SchemaError, SchemaResult};
use super::types::{Classification, CompileHook, Member, Schema, SchemaId, SchemaRef};
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::observability::{log_event, Event, Logger};
use crate::restriction::{InternTable, Restriction};
use crate::validator::CrossFieldValidator;
use crate::value::Value;

/// A leaf's value for a unique key
#[derive(Debug, Clone)]
struct UniqueClaim {
    module: String,
    name: String,
    value: Member,
}

/// Owns registered schemas, their unique-value claims and the intern table
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    config: RegistryConfig,
    intern: InternTable,
    schemas: BTreeMap<(String, String), SchemaRef>,
    /// Ids of every schema ever registered here, replaced ones included
    known_ids: HashSet<SchemaId>,
    /// Unique key -> claims of the leaves fulfilling it
    claims: BTreeMap<String, Vec<UniqueClaim>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        if config.log_threshold.is_some() {
            Logger::set_threshold(config.log_threshold);
        }
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers under the configured duplicate policy.
    pub fn register(&mut self, builder: SchemaBuilder) -> SchemaResult<SchemaRef> {
        let policy = self.config.duplicate_policy;
        self.define(builder, policy)
    }

    /// Registers, replacing any schema with the same module and name.
    pub fn replace(&mut self, builder: SchemaBuilder) -> SchemaResult<SchemaRef> {
        self.define(builder, DuplicatePolicy::Replace)
    }

    pub fn get(&self, module: &str, name: &str) -> Option<&SchemaRef> {
        self.schemas.get(&(module.to_string(), name.to_string()))
    }

    pub fn exists(&self, module: &str, name: &str) -> bool {
        self.get(module, name).is_some()
    }

    /// Current schemas in (module, name) order
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaRef> {
        self.schemas.values()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Root and Node schemas
    pub fn roots(&self) -> impl Iterator<Item = &SchemaRef> {
        self.schemas
            .values()
            .filter(|s| s.classification().declares_requirements())
    }

    pub fn intern(&self) -> &InternTable {
        &self.intern
    }

    pub fn intern_mut(&mut self) -> &mut InternTable {
        &mut self.intern
    }

    fn define(&mut self, builder: SchemaBuilder, policy: DuplicatePolicy) -> SchemaResult<SchemaRef> {
        let module = builder.module.clone();
        let name = builder.name.clone();
        match self.stage(builder, policy) {
            Ok((schema, claims)) => Ok(self.commit(schema, claims)),
            Err(err) => {
                log_event(
                    Event::SchemaRejected,
                    &[
                        ("module", &module),
                        ("schema", &name),
                        ("code", err.code()),
                        ("reason", &err.to_string()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// Runs every check and builds the schema without touching the registry
    /// (apart from interning new restrictions).
    fn stage(
        &mut self,
        builder: SchemaBuilder,
        policy: DuplicatePolicy,
    ) -> SchemaResult<(Schema, Vec<(String, Member)>)> {
        let SchemaBuilder {
            module,
            name,
            parents,
            fields,
            attributes,
            required: own_required,
            unique: own_unique,
            is_abstract,
            validators: own_validators,
            hooks: own_hooks,
            index_overrides,
            discriminator: own_discriminator,
        } = builder;
        let identity = (module.clone(), name.clone());

        if policy == DuplicatePolicy::Reject && self.schemas.contains_key(&identity) {
            return Err(SchemaError::AlreadyRegistered { module, name });
        }

        for parent in &parents {
            if !self.known_ids.contains(&parent.id()) {
                return Err(SchemaError::UnknownSchema {
                    schema: name,
                    parent: parent.qualified_name(),
                });
            }
        }

        let ancestors = collect_ancestors(&parents);

        // Own restrictions
        let mut own: BTreeMap<String, Arc<Restriction>> = BTreeMap::new();
        for (key, spec) in fields {
            let restriction = match spec {
                FieldSpec::Shared(restriction) => restriction,
                FieldSpec::Declared(declaration) => {
                    self.intern
                        .intern(declaration)
                        .map_err(|source| SchemaError::Restriction {
                            schema: name.clone(),
                            key: key.clone(),
                            source,
                        })?
                }
            };
            own.insert(key, restriction);
        }

        check_reserved_names(&name, &own, &attributes, &ancestors)?;

        let classification = match (&own_required, is_abstract) {
            (Some(_), false) => Classification::Root,
            (Some(_), true) | (None, true) => Classification::Node,
            (None, false) => Classification::Leaf,
        };

        let own_required = own_required.unwrap_or_default();
        for key in &own_unique {
            if !own_required.contains(key) {
                return Err(SchemaError::UniqueNotRequired {
                    schema: name,
                    key: key.clone(),
                });
            }
        }

        let contract_ancestors: Vec<&SchemaRef> = ancestors
            .iter()
            .filter(|a| a.classification().declares_requirements())
            .collect();
        let mut required: BTreeSet<String> = contract_ancestors
            .iter()
            .flat_map(|a| a.required().iter().cloned())
            .collect();
        let mut unique: BTreeSet<String> = contract_ancestors
            .iter()
            .flat_map(|a| a.unique().iter().cloned())
            .collect();

        let in_own_namespace = |key: &str| attributes.contains_key(key) || own.contains_key(key);
        let mut new_claims = Vec::new();

        if classification.declares_requirements() {
            for key in &own_required {
                if let Some(owner) = contract_ancestors.iter().find(|a| a.required().contains(key)) {
                    return Err(SchemaError::AlreadyDeclared {
                        kind: "Required",
                        key: key.clone(),
                        owner: owner.name().to_string(),
                    });
                }
            }
            for key in &own_unique {
                let owner = self
                    .roots()
                    .filter(|s| (s.module(), s.name()) != (module.as_str(), name.as_str()))
                    .find(|s| s.unique().contains(key));
                if let Some(owner) = owner {
                    return Err(SchemaError::AlreadyDeclared {
                        kind: "Unique",
                        key: key.clone(),
                        owner: owner.name().to_string(),
                    });
                }
            }
            required.extend(own_required);
            unique.extend(own_unique);
        } else {
            for key in &required {
                let fulfilled = in_own_namespace(key)
                    || ancestors.iter().any(|a| {
                        a.classification() != Classification::Root && a.in_namespace(key)
                    });
                if !fulfilled {
                    return Err(SchemaError::RequiredFor {
                        schema: name,
                        key: key.clone(),
                    });
                }
            }

            for key in &unique {
                let value = match attributes.get(key) {
                    Some(value) => Some(Member::Attribute(value.clone())),
                    None => own
                        .get(key)
                        .cloned()
                        .map(Member::Field)
                        .or_else(|| ancestors.iter().find_map(|a| a.own_member(key))),
                };
                // Only attribute values are claimed; interned restrictions are shared
                let Some(value @ Member::Attribute(_)) = value else { continue };

                // Values fulfilled by an ancestor were checked when it registered
                if in_own_namespace(key) {
                    let clash = self.claims.get(key).and_then(|claims| {
                        claims.iter().find(|c| {
                            (c.module.as_str(), c.name.as_str()) != (module.as_str(), name.as_str())
                                && c.value == value
                        })
                    });
                    if let Some(clash) = clash {
                        return Err(SchemaError::DuplicateUnique {
                            schema: name,
                            key: key.clone(),
                            value: value.to_string(),
                            other: clash.name.clone(),
                        });
                    }
                }
                new_claims.push((key.clone(), value));
            }
        }

        // First parent wins, own keys win over everything
        let mut restrictions = BTreeMap::new();
        for parent in parents.iter().rev() {
            for (key, restriction) in parent.restrictions() {
                restrictions.insert(key.clone(), Arc::clone(restriction));
            }
        }
        let own_keys: BTreeSet<String> = own.keys().cloned().collect();
        restrictions.extend(own);

        let mut validators: Vec<Arc<dyn CrossFieldValidator>> = Vec::new();
        let mut hooks: Vec<Arc<dyn CompileHook>> = Vec::new();
        for parent in &parents {
            for validator in parent.validators() {
                if !validators.iter().any(|v| same_arc(v, validator)) {
                    validators.push(Arc::clone(validator));
                }
            }
            for hook in parent.hooks() {
                if !hooks.iter().any(|h| same_arc(h, hook)) {
                    hooks.push(Arc::clone(hook));
                }
            }
        }
        validators.extend(own_validators);
        hooks.extend(own_hooks);

        let discriminator =
            own_discriminator.or_else(|| parents.iter().find_map(|p| p.discriminator().cloned()));

        let mut overrides = BTreeMap::new();
        for parent in parents.iter().rev() {
            overrides.extend(
                parent
                    .index_overrides
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        overrides.extend(index_overrides);

        let schema = Schema {
            id: SchemaId::next(),
            module,
            name,
            classification,
            required,
            unique,
            parents,
            ancestors,
            attributes,
            own_keys,
            restrictions,
            validators,
            hooks,
            discriminator,
            index_overrides: overrides,
            view: OnceLock::new(),
        };

        if schema.classification() == Classification::Leaf {
            for hook in schema.hooks() {
                hook.compile(&schema).map_err(|reason| SchemaError::Compile {
                    schema: schema.name().to_string(),
                    reason,
                })?;
            }
        }

        Ok((schema, new_claims))
    }

    fn commit(&mut self, schema: Schema, claims: Vec<(String, Member)>) -> SchemaRef {
        let identity = (schema.module.clone(), schema.name.clone());
        let replaced = self.schemas.contains_key(&identity);
        if replaced {
            for entries in self.claims.values_mut() {
                entries.retain(|c| (&c.module, &c.name) != (&identity.0, &identity.1));
            }
        }
        for (key, value) in claims {
            self.claims.entry(key).or_default().push(UniqueClaim {
                module: identity.0.clone(),
                name: identity.1.clone(),
                value,
            });
        }

        let schema = Arc::new(schema);
        self.known_ids.insert(schema.id());
        self.schemas.insert(identity, Arc::clone(&schema));

        let event = if replaced {
            Event::SchemaReplaced
        } else {
            Event::SchemaRegistered
        };
        log_event(
            event,
            &[
                ("module", schema.module()),
                ("schema", schema.name()),
                ("classification", schema.classification().as_str()),
                ("keys", &schema.restrictions().len().to_string()),
            ],
        );
        schema
    }
}

/// Parents then their ancestors, depth-first, first occurrence kept
fn collect_ancestors(parents: &[SchemaRef]) -> Vec<SchemaRef> {
    let mut seen = HashSet::new();
    let mut ancestors = Vec::new();
    for parent in parents {
        let chain = std::iter::once(parent).chain(parent.ancestors().iter());
        for schema in chain {
            if seen.insert(schema.id()) {
                ancestors.push(Arc::clone(schema));
            }
        }
    }
    ancestors
}

/// A restriction key may not share a name with an attribute anywhere in the chain
fn check_reserved_names(
    schema: &str,
    own: &BTreeMap<String, Arc<Restriction>>,
    attributes: &BTreeMap<String, Value>,
    ancestors: &[SchemaRef],
) -> SchemaResult<()> {
    let reserved = |name: &String| SchemaError::ReservedName {
        schema: schema.to_string(),
        name: name.clone(),
    };
    for key in own.keys() {
        if attributes.contains_key(key)
            || ancestors.iter().any(|a| a.own_attributes().contains_key(key))
        {
            return Err(reserved(key));
        }
    }
    for attribute in attributes.keys() {
        if ancestors.iter().any(|a| a.own_keys.contains(attribute)) {
            return Err(reserved(attribute));
        }
    }
    Ok(())
}

/// Compares the data pointers of two trait objects
fn same_arc<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restriction::Declaration;
    use crate::value::ValueType;

    fn int() -> Declaration {
        Declaration::types([ValueType::Int])
    }

    #[test]
    fn test_leaf_without_requirements() {
        let mut registry = SchemaRegistry::new();
        let schema = SchemaBuilder::new("tests", "Plain")
            .field("x", int())
            .register(&mut registry)
            .unwrap();
        assert_eq!(schema.classification(), Classification::Leaf);
        assert!(registry.exists("tests", "Plain"));
        assert_eq!(registry.schema_count(), 1);
    }

    #[test]
    fn test_classification() {
        let mut registry = SchemaRegistry::new();
        let root = SchemaBuilder::new("tests", "Root")
            .require(["x"])
            .register(&mut registry)
            .unwrap();
        let node = SchemaBuilder::new("tests", "Node")
            .extends(&root)
            .abstract_schema()
            .register(&mut registry)
            .unwrap();
        let leaf = SchemaBuilder::new("tests", "Leaf")
            .extends(&node)
            .field("x", int())
            .register(&mut registry)
            .unwrap();

        assert_eq!(root.classification(), Classification::Root);
        assert_eq!(node.classification(), Classification::Node);
        assert_eq!(leaf.classification(), Classification::Leaf);
        assert!(node.required().contains("x"));
        assert_eq!(registry.roots().count(), 2);
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut registry = SchemaRegistry::new();
        SchemaBuilder::new("tests", "A").register(&mut registry).unwrap();
        let err = SchemaBuilder::new("tests", "A")
            .register(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "DO_ALREADY_REGISTERED");
    }

    #[test]
    fn test_replace_swaps_registration() {
        let mut registry = SchemaRegistry::new();
        let first = SchemaBuilder::new("tests", "A").register(&mut registry).unwrap();
        let second = SchemaBuilder::new("tests", "A")
            .field("x", int())
            .replace(&mut registry)
            .unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(registry.schema_count(), 1);
        assert!(registry.get("tests", "A").unwrap().has_key("x"));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut other = SchemaRegistry::new();
        let foreign = SchemaBuilder::new("tests", "Foreign").register(&mut other).unwrap();

        let mut registry = SchemaRegistry::new();
        let err = SchemaBuilder::new("tests", "Child")
            .extends(&foreign)
            .register(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "DO_UNKNOWN_SCHEMA");
    }

    #[test]
    fn test_first_parent_wins() {
        let mut registry = SchemaRegistry::new();
        let a = SchemaBuilder::new("tests", "A")
            .field("x", int())
            .register(&mut registry)
            .unwrap();
        let b = SchemaBuilder::new("tests", "B")
            .field("x", Declaration::types([ValueType::Str]))
            .register(&mut registry)
            .unwrap();
        let c = SchemaBuilder::new("tests", "C")
            .extends(&a)
            .extends(&b)
            .register(&mut registry)
            .unwrap();
        assert!(Arc::ptr_eq(
            c.restriction("x").unwrap(),
            a.restriction("x").unwrap()
        ));
    }

    #[test]
    fn test_failed_registration_leaves_no_trace() {
        let mut registry = SchemaRegistry::new();
        let root = SchemaBuilder::new("tests", "Root")
            .require(["code"])
            .register(&mut registry)
            .unwrap();
        let err = SchemaBuilder::new("tests", "Leaf")
            .extends(&root)
            .register(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "DO_REQUIRED_FOR");
        assert!(!registry.exists("tests", "Leaf"));
    }
}
