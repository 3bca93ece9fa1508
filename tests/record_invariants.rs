//! Record Invariant Tests
//!
//! - A record holds exactly its schema's keys
//! - Strict construction requires every key; lenient fills defaults
//! - Unknown keys are rejected in both modes
//! - A rejected mutation leaves the record unchanged
//! - Assigning a key its current value leaves the record unchanged
//! - Nested mappings become records of the nested schema

use std::collections::HashSet;

use dataobject::common;
use dataobject::dynamic::Discriminated;
use dataobject::restriction::Declaration;
use dataobject::schema::{SchemaBuilder, SchemaRef, SchemaRegistry};
use dataobject::value::{Fields, Value};
use dataobject::Record;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

struct Fixture {
    _registry: SchemaRegistry,
    size: SchemaRef,
    shoe: SchemaRef,
}

fn setup() -> Fixture {
    let mut registry = SchemaRegistry::new();
    let size = SchemaBuilder::new("store", "Size")
        .field("us", common::int().with_default(9))
        .field("wide", common::boolean().with_default(false))
        .register(&mut registry)
        .unwrap();
    let shoe = SchemaBuilder::new("store", "Shoe")
        .attribute("category", "footwear")
        .field("id", common::int())
        .field("color", Declaration::values(["black", "white"]).with_default("black"))
        .field("size", Declaration::schema(&size))
        .field("insole", Declaration::nullable_schema(&size))
        .register(&mut registry)
        .unwrap();
    Fixture {
        _registry: registry,
        size,
        shoe,
    }
}

fn shoe_json() -> serde_json::Value {
    json!({
        "id": 1,
        "color": "white",
        "size": {"us": 10, "wide": true},
        "insole": null
    })
}

fn strict_shoe(fixture: &Fixture) -> Record {
    Record::from_json(&fixture.shoe, &shoe_json(), true).unwrap()
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_strict_requires_every_key() {
    let fixture = setup();
    let err = Record::from_json(&fixture.shoe, &json!({"id": 1}), true).unwrap_err();
    assert_eq!(err.code(), "DO_REQUIRED_KEY");
}

#[test]
fn test_lenient_fills_defaults() {
    let fixture = setup();
    let record = Record::from_json(&fixture.shoe, &json!({"id": 4}), false).unwrap();

    assert_eq!(record.get("id").unwrap(), &Value::from(4));
    assert_eq!(record.get("color").unwrap(), &Value::from("black"));
    let size = record.get("size").unwrap().as_record().unwrap();
    assert_eq!(size.get("us").unwrap(), &Value::from(9));
    assert_eq!(record.len(), 4);
}

#[test]
fn test_lenient_still_checks_supplied_values() {
    let fixture = setup();
    let err = Record::from_json(&fixture.shoe, &json!({"color": "red"}), false).unwrap_err();
    assert_eq!(err.code(), "DO_VALUE_REJECTED");
    assert_eq!(err.key(), Some("color"));
}

#[test]
fn test_unknown_key_rejected_in_both_modes() {
    let fixture = setup();
    let mut data = shoe_json();
    data["laces"] = json!(true);

    for strict in [true, false] {
        let err = Record::from_json(&fixture.shoe, &data, strict).unwrap_err();
        assert_eq!(err.code(), "DO_UNKNOWN_KEY");
        assert_eq!(err.key(), Some("laces"));
    }
}

#[test]
fn test_non_mapping_input_rejected() {
    let fixture = setup();
    let err = Record::from_json(&fixture.shoe, &json!([1, 2]), false).unwrap_err();
    assert_eq!(err.code(), "DO_NOT_A_MAPPING");
}

#[test]
fn test_nested_mapping_becomes_record() {
    let fixture = setup();
    let record = strict_shoe(&fixture);
    let size = record.get("size").unwrap().as_record().unwrap();
    assert_eq!(size.schema().id(), fixture.size.id());
    assert_eq!(record.get("insole").unwrap(), &Value::Null);
}

#[test]
fn test_nested_rejection_reports_inner_error() {
    let fixture = setup();
    let mut data = shoe_json();
    data["size"] = json!({"us": "ten", "wide": true});

    let err = Record::from_json(&fixture.shoe, &data, true).unwrap_err();
    assert_eq!(err.code(), "DO_VALUE_REJECTED");
    assert_eq!(err.restriction_error().unwrap().code(), "DO_NESTED_REJECTED");
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[test]
fn test_rejected_set_leaves_record_unchanged() {
    let fixture = setup();
    let mut record = strict_shoe(&fixture);
    let before = record.clone();

    assert_eq!(record.set("color", "red").unwrap_err().code(), "DO_VALUE_REJECTED");
    assert_eq!(record.set("laces", true).unwrap_err().code(), "DO_UNKNOWN_KEY");
    assert_eq!(record, before);
    assert!(!record.contains_key("laces"));
}

#[test]
fn test_reassigning_current_values_is_idempotent() {
    let fixture = setup();
    let mut record = strict_shoe(&fixture);
    let before = record.clone();

    for key in ["id", "color", "size", "insole"] {
        let current = record.get(key).unwrap().clone();
        record.set(key, current).unwrap();
        assert_eq!(record, before);
    }
}

#[test]
fn test_reassignment_under_validator_is_idempotent() {
    let mut registry = SchemaRegistry::new();
    let range = SchemaBuilder::new("store", "PriceRange")
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

    let mut record = Record::from_json(&range, &json!({"low": 2, "high": 7}), true).unwrap();
    let before = record.clone();
    record.set("low", 2).unwrap();
    record.set("high", 7).unwrap();
    assert_eq!(record, before);
}

#[test]
fn test_reassignment_under_discriminator_is_idempotent() {
    let mut registry = SchemaRegistry::new();
    let milk = SchemaBuilder::new("breakfast", "Milk")
        .field("flavor", Declaration::values(["chocolate", "normal"]))
        .register(&mut registry)
        .unwrap();
    let cereal = SchemaBuilder::new("breakfast", "Cereal")
        .field("brand", Declaration::values(["oats", "flakes"]))
        .register(&mut registry)
        .unwrap();
    let mixin = Discriminated::new("item", "item_metadata")
        .variant("milk", &milk)
        .variant("cereal", &cereal)
        .register(&mut registry, "breakfast")
        .unwrap();
    let order = SchemaBuilder::new("breakfast", "Order")
        .extends(&mixin)
        .field("item", Declaration::values(["milk", "cereal"]))
        .field("item_metadata", Declaration::any())
        .register(&mut registry)
        .unwrap();

    let mut record = Record::from_json(
        &order,
        &json!({"item": "milk", "item_metadata": {"flavor": "chocolate"}}),
        true,
    )
    .unwrap();
    let before = record.clone();

    record.set("item", "milk").unwrap();
    assert_eq!(record, before);
    assert_eq!(record.get("item_metadata").unwrap(), before.get("item_metadata").unwrap());

    let metadata = record.get("item_metadata").unwrap().clone();
    record.set("item_metadata", metadata).unwrap();
    assert_eq!(record, before);
}

#[test]
fn test_set_nested_from_mapping() {
    let fixture = setup();
    let mut record = strict_shoe(&fixture);
    record.set("insole", Value::from(json!({"us": 8, "wide": false}))).unwrap();

    let insole = record.get("insole").unwrap().as_record().unwrap();
    assert_eq!(insole.get("us").unwrap(), &Value::from(8));
}

#[test]
fn test_modify_nested() {
    let fixture = setup();
    let mut record = strict_shoe(&fixture);
    record.modify_nested("size", |size| size.set("us", 11)).unwrap();
    let size = record.get("size").unwrap().as_record().unwrap();
    assert_eq!(size.get("us").unwrap(), &Value::from(11));

    let err = record.modify_nested("size", |size| size.set("us", "eleven")).unwrap_err();
    assert_eq!(err.code(), "DO_VALUE_REJECTED");
    let size = record.get("size").unwrap().as_record().unwrap();
    assert_eq!(size.get("us").unwrap(), &Value::from(11));

    let err = record.modify_nested("id", |_| Ok(())).unwrap_err();
    assert_eq!(err.code(), "DO_NOT_NESTED");
}

#[test]
fn test_failed_reinit_keeps_state() {
    let fixture = setup();
    let mut record = strict_shoe(&fixture);
    let before = record.clone();

    let mut data = Fields::new();
    data.insert("id".into(), Value::from(2));
    assert_eq!(record.reinit(Some(data.clone()), true).unwrap_err().code(), "DO_REQUIRED_KEY");
    assert_eq!(record, before);

    record.reinit(Some(data), false).unwrap();
    assert_eq!(record.get("id").unwrap(), &Value::from(2));
    assert_eq!(record.get("color").unwrap(), &Value::from("black"));
}

// =============================================================================
// Attribute Tests
// =============================================================================

#[test]
fn test_attribute_lookup_order() {
    let fixture = setup();
    let mut record = strict_shoe(&fixture);

    assert_eq!(record.attr("color").unwrap(), &Value::from("white"));
    assert_eq!(record.attr("category").unwrap(), &Value::from("footwear"));
    assert_eq!(record.attr("brand").unwrap_err().code(), "DO_MISSING_ATTRIBUTE");

    record.set_attr("brand", "acme").unwrap();
    assert_eq!(record.attr("brand").unwrap(), &Value::from("acme"));
    assert!(!record.contains_key("brand"));
    assert_eq!(record.to_json(), shoe_json());

    // Schema keys still go through validation
    assert!(record.set_attr("color", "red").is_err());
}

#[test]
fn test_get_undeclared_key() {
    let fixture = setup();
    let record = strict_shoe(&fixture);
    assert_eq!(record.get("category").unwrap_err().code(), "DO_MISSING_KEY");
}

// =============================================================================
// Serialization and Identity Tests
// =============================================================================

#[test]
fn test_json_round_trip() {
    let fixture = setup();
    let record = strict_shoe(&fixture);
    let json = record.to_json();
    assert_eq!(json, shoe_json());
    assert_eq!(serde_json::to_value(&record).unwrap(), json);

    let rebuilt = Record::from_json(&fixture.shoe, &json, true).unwrap();
    assert_eq!(rebuilt, record);
}

#[test]
fn test_equal_records_hash_alike() {
    let fixture = setup();
    let mut seen = HashSet::new();
    seen.insert(strict_shoe(&fixture));
    seen.insert(strict_shoe(&fixture));
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_display_names_schema() {
    let fixture = setup();
    let record = strict_shoe(&fixture);
    assert!(record.to_string().starts_with("Shoe{"));
}

#[test]
fn test_non_leaf_not_instantiable() {
    let mut registry = SchemaRegistry::new();
    let root = SchemaBuilder::new("store", "Product")
        .require(["kind"])
        .register(&mut registry)
        .unwrap();
    let err = Record::lenient(&root).unwrap_err();
    assert_eq!(err.code(), "DO_NOT_INSTANTIABLE");
}

#[test]
fn test_abstract_node_not_instantiable() {
    let mut registry = SchemaRegistry::new();
    let root = SchemaBuilder::new("store", "Product")
        .require(["kind"])
        .register(&mut registry)
        .unwrap();
    let node = SchemaBuilder::new("store", "Apparel")
        .extends(&root)
        .field("size", common::int())
        .abstract_schema()
        .register(&mut registry)
        .unwrap();

    for strict in [true, false] {
        let err = Record::new(&node, None, strict).unwrap_err();
        assert_eq!(err.code(), "DO_NOT_INSTANTIABLE");
    }
    assert_eq!(Record::lenient(&node).unwrap_err().code(), "DO_NOT_INSTANTIABLE");
}

#[test]
fn test_discriminated_mixin_not_instantiable() {
    let mut registry = SchemaRegistry::new();
    let milk = SchemaBuilder::new("breakfast", "Milk")
        .field("flavor", Declaration::values(["chocolate", "normal"]))
        .register(&mut registry)
        .unwrap();
    let mixin = Discriminated::new("item", "item_metadata")
        .variant("milk", &milk)
        .register(&mut registry, "breakfast")
        .unwrap();

    assert_eq!(Record::lenient(&mixin).unwrap_err().code(), "DO_NOT_INSTANTIABLE");
    let err = Record::from_json(&mixin, &json!({"item": "milk"}), false).unwrap_err();
    assert_eq!(err.code(), "DO_NOT_INSTANTIABLE");
}
