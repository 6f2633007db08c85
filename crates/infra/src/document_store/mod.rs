//! Document store boundary.
//!
//! This module defines the store collaborator the role engine runs against:
//! filter-based find/insert/update/remove with a unique-index error channel
//! and a structural type-mismatch error channel.

pub mod in_memory;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryCollection;
pub use query::{FieldPath, Filter, FindOptions, Projection, SortKey, SortOrder, UpdateOperator, UpdateSpec};
pub use r#trait::{Document, DocumentCollection, StoreError, UpdateOptions};
