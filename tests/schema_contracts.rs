//! Schema Contract Tests
//!
//! - Root schemas declare required and unique keys; leaves fulfil them
//! - A unique value may be claimed by one leaf only
//! - Registration is all-or-nothing
//! - Duplicate registrations follow the configured policy

use dataobject::common;
use dataobject::config::RegistryConfig;
use dataobject::restriction::{Declaration, Item};
use dataobject::schema::{Classification, SchemaBuilder, SchemaRef, SchemaRegistry};
use dataobject::value::{Value, ValueType};
use dataobject::Record;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn product_root(registry: &mut SchemaRegistry) -> SchemaRef {
    SchemaBuilder::new("store", "Product")
        .require(["product_type", "id"])
        .unique(["product_type"])
        .register(registry)
        .unwrap()
}

fn shoe(root: &SchemaRef, product_type: &str) -> SchemaBuilder {
    SchemaBuilder::new("store", "Shoe")
        .extends(root)
        .attribute("product_type", product_type)
        .field("id", common::int())
}

// =============================================================================
// Classification Tests
// =============================================================================

#[test]
fn test_classification() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    let node = SchemaBuilder::new("store", "Apparel")
        .extends(&root)
        .abstract_schema()
        .register(&mut registry)
        .unwrap();
    let leaf = shoe(&node, "shoe").register(&mut registry).unwrap();

    assert_eq!(root.classification(), Classification::Root);
    assert_eq!(node.classification(), Classification::Node);
    assert_eq!(leaf.classification(), Classification::Leaf);
    assert!(leaf.extends(&root));
    assert_eq!(leaf.required().len(), 2);
    assert_eq!(registry.roots().count(), 2);
}

// =============================================================================
// Requirement Tests
// =============================================================================

#[test]
fn test_leaf_must_fulfil_required_keys() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);

    let err = SchemaBuilder::new("store", "Hat")
        .extends(&root)
        .attribute("product_type", "hat")
        .register(&mut registry)
        .unwrap_err();
    assert_eq!(err.code(), "DO_REQUIRED_FOR");
    assert_eq!(err.to_string(), "id is required for Hat!");
    assert!(err.is_fatal());
}

#[test]
fn test_requirement_fulfilled_by_mixin() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    let identified = SchemaBuilder::new("store", "Identified")
        .field("id", common::int())
        .register(&mut registry)
        .unwrap();

    let hat = SchemaBuilder::new("store", "Hat")
        .extends(&root)
        .extends(&identified)
        .attribute("product_type", "hat")
        .register(&mut registry)
        .unwrap();
    assert!(hat.has_key("id"));
}

#[test]
fn test_requirement_cannot_be_redeclared() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    let err = SchemaBuilder::new("store", "Apparel")
        .extends(&root)
        .abstract_schema()
        .require(["id"])
        .register(&mut registry)
        .unwrap_err();
    assert_eq!(err.code(), "DO_ALREADY_DECLARED");
}

#[test]
fn test_unique_must_be_required() {
    let mut registry = SchemaRegistry::new();
    let err = SchemaBuilder::new("store", "Product")
        .require(["id"])
        .unique(["sku"])
        .register(&mut registry)
        .unwrap_err();
    assert_eq!(err.code(), "DO_UNIQUE_NOT_REQUIRED");
}

#[test]
fn test_unique_key_owned_by_one_root() {
    let mut registry = SchemaRegistry::new();
    product_root(&mut registry);
    let err = SchemaBuilder::new("store", "Service")
        .require(["product_type"])
        .unique(["product_type"])
        .register(&mut registry)
        .unwrap_err();
    assert_eq!(err.code(), "DO_ALREADY_DECLARED");
}

// =============================================================================
// Uniqueness Tests
// =============================================================================

#[test]
fn test_duplicate_unique_value_rejected() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    shoe(&root, "shoe").register(&mut registry).unwrap();

    let err = SchemaBuilder::new("store", "Boot")
        .extends(&root)
        .attribute("product_type", "shoe")
        .field("id", common::int())
        .register(&mut registry)
        .unwrap_err();
    assert_eq!(err.code(), "DO_DUPLICATE_UNIQUE");
    assert!(err.to_string().contains("already been declared in Shoe"));
    assert!(!registry.exists("store", "Boot"));
}

#[test]
fn test_subclass_inherits_unique_value() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    let base = shoe(&root, "shoe").register(&mut registry).unwrap();

    // Fulfilled by the ancestor, so not a second claim
    let sneaker = SchemaBuilder::new("store", "Sneaker")
        .extends(&base)
        .field("laces", common::boolean())
        .register(&mut registry)
        .unwrap();
    assert_eq!(sneaker.attribute("product_type"), Some(&Value::from("shoe")));
}

#[test]
fn test_unique_key_fulfilled_by_equal_declarations() {
    let mut registry = SchemaRegistry::new();
    let root = SchemaBuilder::new("store", "Catalog")
        .require(["code"])
        .unique(["code"])
        .register(&mut registry)
        .unwrap();

    // Equal declarations intern to one restriction; neither leaf claims a value
    let shoe = SchemaBuilder::new("store", "Shoe")
        .extends(&root)
        .field("code", common::int())
        .register(&mut registry)
        .unwrap();
    let hat = SchemaBuilder::new("store", "Hat")
        .extends(&root)
        .field("code", common::int())
        .register(&mut registry)
        .unwrap();

    assert!(registry.exists("store", "Shoe"));
    assert!(registry.exists("store", "Hat"));
    assert_eq!(shoe.classification(), Classification::Leaf);
    assert_eq!(hat.classification(), Classification::Leaf);
}

#[test]
fn test_replace_keeps_own_unique_value() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    let first = shoe(&root, "shoe").register(&mut registry).unwrap();

    let second = shoe(&root, "shoe").replace(&mut registry).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(registry.get("store", "Shoe").unwrap().id(), second.id());

    // The replaced claim is released
    shoe(&root, "boot").replace(&mut registry).unwrap();
    SchemaBuilder::new("store", "Loafer")
        .extends(&root)
        .attribute("product_type", "shoe")
        .field("id", common::int())
        .register(&mut registry)
        .unwrap();
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_duplicate_registration_policy() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    shoe(&root, "shoe").register(&mut registry).unwrap();
    let err = shoe(&root, "shoe").register(&mut registry).unwrap_err();
    assert_eq!(err.code(), "DO_ALREADY_REGISTERED");

    let mut interactive = SchemaRegistry::with_config(RegistryConfig::interactive());
    let root = product_root(&mut interactive);
    shoe(&root, "shoe").register(&mut interactive).unwrap();
    shoe(&root, "shoe").register(&mut interactive).unwrap();
    assert_eq!(interactive.schema_count(), 2);
}

#[test]
fn test_parent_from_other_registry_rejected() {
    let mut other = SchemaRegistry::new();
    let foreign = product_root(&mut other);

    let mut registry = SchemaRegistry::new();
    let err = shoe(&foreign, "shoe").register(&mut registry).unwrap_err();
    assert_eq!(err.code(), "DO_UNKNOWN_SCHEMA");
}

#[test]
fn test_key_and_attribute_names_are_disjoint() {
    let mut registry = SchemaRegistry::new();
    let err = SchemaBuilder::new("store", "Odd")
        .attribute("id", 3)
        .field("id", common::int())
        .register(&mut registry)
        .unwrap_err();
    assert_eq!(err.code(), "DO_RESERVED_NAME");
}

#[test]
fn test_failed_registration_leaves_registry_untouched() {
    let mut registry = SchemaRegistry::new();
    let root = product_root(&mut registry);
    let before = registry.schema_count();

    let err = SchemaBuilder::new("store", "Bad")
        .extends(&root)
        .attribute("product_type", "bad")
        .field("id", common::int())
        .field(
            "mixed",
            Declaration::items([Item::from(ValueType::Int), Item::from(Value::from(1))]),
        )
        .register(&mut registry)
        .unwrap_err();
    assert_eq!(err.code(), "DO_RESTRICTION_DECLARATION");
    assert_eq!(registry.schema_count(), before);
}

// =============================================================================
// Inheritance Tests
// =============================================================================

#[test]
fn test_first_parent_wins_own_keys_override() {
    let mut registry = SchemaRegistry::new();
    let a = SchemaBuilder::new("mix", "A")
        .field("x", Declaration::values(["a"]))
        .register(&mut registry)
        .unwrap();
    let b = SchemaBuilder::new("mix", "B")
        .field("x", Declaration::values(["b"]))
        .field("y", common::int())
        .register(&mut registry)
        .unwrap();
    let c = SchemaBuilder::new("mix", "C")
        .extends(&a)
        .extends(&b)
        .register(&mut registry)
        .unwrap();
    let d = SchemaBuilder::new("mix", "D")
        .extends(&a)
        .field("x", common::string())
        .register(&mut registry)
        .unwrap();

    let x = c.restriction("x").unwrap().allowed_values().unwrap();
    assert!(x.contains(&Value::from("a")));
    assert!(c.has_key("y"));
    assert!(d.restriction("x").unwrap().allowed_types().is_some());
}

#[test]
fn test_validators_are_inherited() {
    let mut registry = SchemaRegistry::new();
    let range = SchemaBuilder::new("mix", "Range")
        .field("low", common::int().with_default(0))
        .field("high", common::int().with_default(0))
        .validator(|record: &Record| {
            let low = record.get("low").map_err(|e| e.to_string())?;
            let high = record.get("high").map_err(|e| e.to_string())?;
            if low <= high {
                Ok(())
            } else {
                Err(format!("{} > {}", low, high))
            }
        })
        .register(&mut registry)
        .unwrap();
    let labelled = SchemaBuilder::new("mix", "LabelledRange")
        .extends(&range)
        .field("label", common::string().with_default(""))
        .register(&mut registry)
        .unwrap();

    let err = Record::from_json(&labelled, &json!({"low": 5, "high": 1, "label": "x"}), true)
        .unwrap_err();
    assert_eq!(err.code(), "DO_INVARIANT_FAILED");

    let mut record = Record::lenient(&labelled).unwrap();
    record.set("high", 10).unwrap();
    assert!(record.set("low", 11).is_err());
    assert_eq!(record.get("low").unwrap(), &Value::from(0));
}

#[test]
fn test_schema_view_expands_nested() {
    let mut registry = SchemaRegistry::new();
    let size = SchemaBuilder::new("store", "Size")
        .field("us", common::int())
        .register(&mut registry)
        .unwrap();
    let boot = SchemaBuilder::new("store", "Boot")
        .field("size", Declaration::schema(&size))
        .field("name", common::string())
        .register(&mut registry)
        .unwrap();

    let view = boot.view();
    assert_eq!(view.len(), 2);
    assert!(view.nested("size").unwrap().contains("us"));
    assert!(view.nested("name").is_none());
    assert_eq!(
        serde_json::to_value(view).unwrap(),
        json!({"name": null, "size": {"us": null}})
    );
}
