//! Infrastructure layer: document store contract and adapters.

pub mod document_store;

pub use document_store::{
    Document, DocumentCollection, FieldPath, Filter, FindOptions, InMemoryCollection, Projection,
    SortKey, SortOrder, StoreError, UpdateOperator, UpdateOptions, UpdateSpec,
};
