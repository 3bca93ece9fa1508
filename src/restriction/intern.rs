//! Restriction interning
//!
//! Equal declarations yield the same `Arc<Restriction>`, so schemas sharing a
//! restriction share one allocation and identity comparison is meaningful.
//! The table is owned by a `SchemaRegistry`; there is no global cache.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::errors::RestrictionResult;
use super::types::{Declaration, Restriction};
use crate::observability::{log_event, Event};
use crate::schema::SchemaId;
use crate::value::{Value, ValueType};

/// Identity of an internable restriction: (kind, allowed, default)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InternKey {
    TypeSet(BTreeSet<ValueType>, Value),
    ValueSet(BTreeSet<Value>, Value),
    Unrestricted(Value),
    /// Nested defaults are derived from the schema, so the schema is enough
    Nested(SchemaId, bool),
}

impl InternKey {
    /// Managed restrictions carry arbitrary code and are never interned
    fn of(restriction: &Restriction) -> Option<InternKey> {
        match restriction {
            Restriction::TypeSet { allowed, default } => {
                Some(InternKey::TypeSet(allowed.clone(), default.clone()))
            }
            Restriction::ValueSet { allowed, default } => {
                Some(InternKey::ValueSet(allowed.clone(), default.clone()))
            }
            Restriction::Unrestricted { default } => Some(InternKey::Unrestricted(default.clone())),
            Restriction::Nested {
                schema, nullable, ..
            } => Some(InternKey::Nested(schema.id(), *nullable)),
            Restriction::Managed { .. } => None,
        }
    }
}

/// Deduplicating restriction cache
#[derive(Debug, Default)]
pub struct InternTable {
    entries: HashMap<InternKey, Arc<Restriction>>,
}

impl InternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `declaration` and returns the shared instance for it.
    pub fn intern(&mut self, declaration: Declaration) -> RestrictionResult<Arc<Restriction>> {
        let restriction = Restriction::make(declaration)?;
        Ok(self.intern_restriction(restriction))
    }

    /// Returns the shared instance equal to `restriction`, adding it if new.
    pub fn intern_restriction(&mut self, restriction: Restriction) -> Arc<Restriction> {
        let key = match InternKey::of(&restriction) {
            Some(key) => key,
            None => return Arc::new(restriction),
        };
        if let Some(existing) = self.entries.get(&key) {
            return Arc::clone(existing);
        }

        let kind = restriction.kind();
        let allowed = restriction.allowed_display();
        let shared = Arc::new(restriction);
        self.entries.insert(key, Arc::clone(&shared));
        log_event(
            Event::RestrictionInterned,
            &[("kind", kind.as_str()), ("allowed", &allowed)],
        );
        shared
    }

    /// Number of distinct interned restrictions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Fields;

    #[test]
    fn test_equal_declarations_share_instance() {
        let mut table = InternTable::new();
        let a = table
            .intern(Declaration::types([ValueType::Int, ValueType::Float]))
            .unwrap();
        let b = table
            .intern(Declaration::types([ValueType::Float, ValueType::Int]))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_different_defaults_are_distinct() {
        let mut table = InternTable::new();
        let a = table.intern(Declaration::types([ValueType::Int])).unwrap();
        let b = table
            .intern(Declaration::types([ValueType::Int]).with_default(1))
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_container_default_is_internable() {
        let mut default = Fields::new();
        default.insert("k".into(), Value::List(vec![Value::from(1)]));

        let mut table = InternTable::new();
        let a = table
            .intern(Declaration::any().with_default(default.clone()))
            .unwrap();
        let b = table.intern(Declaration::any().with_default(default)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_types_and_values_never_collide() {
        let mut table = InternTable::new();
        let types = table.intern(Declaration::types([ValueType::Str])).unwrap();
        let values = table.intern(Declaration::values(["str"])).unwrap();
        assert!(!Arc::ptr_eq(&types, &values));
        assert_eq!(table.len(), 2);
    }
}
