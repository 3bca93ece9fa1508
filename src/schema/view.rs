//! Structural view of a schema
//!
//! Key names, with nested schemas expanded to their own view. Serialises as
//! `{"key": null, "nested": {"inner": null}}`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SchemaView(BTreeMap<String, Option<SchemaView>>);

impl SchemaView {
    pub(crate) fn of(schema: &Schema) -> Self {
        let entries = schema
            .restrictions()
            .iter()
            .map(|(key, restriction)| {
                let nested = restriction
                    .nested_schema()
                    .map(|nested| nested.view().clone());
                (key.clone(), nested)
            })
            .collect();
        SchemaView(entries)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Nested view under `key`, if the key holds a nested schema
    pub fn nested(&self, key: &str) -> Option<&SchemaView> {
        self.0.get(key).and_then(Option::as_ref)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
