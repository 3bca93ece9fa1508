//! Restriction engine
//!
//! A restriction describes which values a key may hold and what the key
//! defaults to. Declarations are classified by `Restriction::make` into one of
//! five kinds and shared through an `InternTable`.
//!
//! All restriction values are immutable once built.

mod errors;
mod factory;
mod intern;
mod managed;
pub mod mapping;
mod types;

pub use errors::{RestrictionError, RestrictionResult};
pub use intern::InternTable;
pub use managed::ManagedRestriction;
pub use mapping::IndexFieldType;
pub use types::{Allowed, Declaration, Item, Restriction, RestrictionKind};
