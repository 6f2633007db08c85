use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use super::query::{FieldPath, FindOptions, Filter, Projection, UpdateOperator, UpdateSpec};

/// A schemaless document. Identifiers live in `_id`.
pub type Document = Map<String, Value>;

/// Document store operation error.
///
/// These are **infrastructure errors**. The role engine classifies them
/// structurally (by variant), never by message text.
///
/// ## Error Categories
///
/// - **DuplicateKey**: a unique index rejected the document
/// - **TypeMismatch**: an update met a field of the wrong structural type
///   (set operator on a non-array, or traversal through a non-object)
/// - **Backend**: anything else (I/O, poisoned locks, driver failures)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate key error on unique index '{index}' (key: {key})")]
    DuplicateKey { index: String, key: String },

    #[error("cannot apply {operator} at '{path}': {detail}")]
    TypeMismatch {
        path: String,
        operator: UpdateOperator,
        detail: String,
    },

    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn type_mismatch(path: &FieldPath, operator: UpdateOperator, detail: impl Into<String>) -> Self {
        Self::TypeMismatch {
            path: path.to_string(),
            operator,
            detail: detail.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Options for `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOptions {
    /// Apply to every matching document instead of the first.
    pub multi: bool,
}

impl UpdateOptions {
    pub fn multi() -> Self {
        Self { multi: true }
    }
}

/// A collection of documents (users, roles).
///
/// ## Atomicity
///
/// Each document is updated atomically: a failing update leaves that document
/// unchanged. A multi-document update is applied document by document and
/// stops at the first failure; documents already updated stay updated.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - reject inserts/updates that violate a unique index with `DuplicateKey`;
///   `index` may be the backend's own index name (e.g. `name_1`), callers
///   must not rely on it being the field path
/// - report structural conflicts with `TypeMismatch`
/// - assign a fresh string `_id` on insert when the document has none
pub trait DocumentCollection: Send + Sync {
    /// Insert a document, returning its `_id`.
    fn insert(&self, doc: Document) -> Result<String, StoreError>;

    fn find_one(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Option<Document>, StoreError>;

    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError>;

    /// Apply `update` to matching documents, returning the matched count.
    fn update(&self, filter: &Filter, update: &UpdateSpec, options: UpdateOptions) -> Result<u64, StoreError>;

    /// Remove matching documents, returning the removed count.
    fn remove(&self, filter: &Filter) -> Result<u64, StoreError>;

    /// Declare a unique index on `path`. Idempotent.
    fn ensure_unique_index(&self, path: &FieldPath) -> Result<(), StoreError>;
}

impl<S> DocumentCollection for Arc<S>
where
    S: DocumentCollection + ?Sized,
{
    fn insert(&self, doc: Document) -> Result<String, StoreError> {
        (**self).insert(doc)
    }

    fn find_one(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Option<Document>, StoreError> {
        (**self).find_one(filter, projection)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        (**self).find(filter, options)
    }

    fn update(&self, filter: &Filter, update: &UpdateSpec, options: UpdateOptions) -> Result<u64, StoreError> {
        (**self).update(filter, update, options)
    }

    fn remove(&self, filter: &Filter) -> Result<u64, StoreError> {
        (**self).remove(filter)
    }

    fn ensure_unique_index(&self, path: &FieldPath) -> Result<(), StoreError> {
        (**self).ensure_unique_index(path)
    }
}
