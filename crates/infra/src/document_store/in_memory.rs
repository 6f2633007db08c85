use std::sync::RwLock;

use serde_json::Value;
use uuid::Uuid;

use super::query::{lookup, FieldPath, FindOptions, Filter, Projection, UpdateSpec};
use super::r#trait::{Document, DocumentCollection, StoreError, UpdateOptions};

const ID_FIELD: &str = "_id";

#[derive(Debug, Default)]
struct CollectionState {
    docs: Vec<Document>,
    unique: Vec<FieldPath>,
}

impl CollectionState {
    /// First document (other than `skip`) that collides with `candidate` on a
    /// unique key, as an error.
    fn check_unique(&self, candidate: &Document, skip: Option<usize>) -> Result<(), StoreError> {
        let id_path = FieldPath::new(ID_FIELD);
        for path in std::iter::once(&id_path).chain(self.unique.iter()) {
            let Some(key) = lookup(candidate, path).into_iter().next() else {
                continue;
            };
            let clash = self
                .docs
                .iter()
                .enumerate()
                .filter(|(idx, _)| Some(*idx) != skip)
                .any(|(_, doc)| lookup(doc, path).into_iter().next() == Some(key));
            if clash {
                return Err(StoreError::DuplicateKey {
                    index: path.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// In-memory document collection.
///
/// Intended for tests/dev. Not optimized for performance. Documents keep
/// insertion order, which is the natural order of unsorted reads.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    inner: RwLock<CollectionState>,
}

impl InMemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection with a unique index already declared on `path`.
    pub fn with_unique_index(path: impl Into<FieldPath>) -> Self {
        Self {
            inner: RwLock::new(CollectionState {
                docs: Vec::new(),
                unique: vec![path.into()],
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::backend("lock poisoned")
}

impl DocumentCollection for InMemoryCollection {
    fn insert(&self, mut doc: Document) -> Result<String, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;

        let id = match doc.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => {
                let id = Uuid::now_v7().to_string();
                doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        state.check_unique(&doc, None)?;
        state.docs.push(doc);
        Ok(id)
    }

    fn find_one(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Option<Document>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state
            .docs
            .iter()
            .find(|d| filter.matches(d))
            .map(|d| match projection {
                Some(p) => p.apply(d),
                None => d.clone(),
            }))
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;

        let mut matched: Vec<&Document> = state.docs.iter().filter(|d| filter.matches(d)).collect();
        if !options.sort.is_empty() {
            matched.sort_by(|a, b| options.compare(a, b));
        }
        if let Some(limit) = options.limit {
            matched.truncate(limit);
        }

        Ok(matched
            .into_iter()
            .map(|d| match &options.projection {
                Some(p) => p.apply(d),
                None => d.clone(),
            })
            .collect())
    }

    fn update(&self, filter: &Filter, update: &UpdateSpec, options: UpdateOptions) -> Result<u64, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;

        let targets: Vec<usize> = state
            .docs
            .iter()
            .enumerate()
            .filter(|(_, d)| filter.matches(d))
            .map(|(idx, _)| idx)
            .take(if options.multi { usize::MAX } else { 1 })
            .collect();

        let mut matched = 0;
        for idx in targets {
            let mut candidate = state.docs[idx].clone();
            update.apply(&mut candidate)?;
            state.check_unique(&candidate, Some(idx))?;
            state.docs[idx] = candidate;
            matched += 1;
        }
        Ok(matched)
    }

    fn remove(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        let before = state.docs.len();
        state.docs.retain(|d| !filter.matches(d));
        Ok((before - state.docs.len()) as u64)
    }

    fn ensure_unique_index(&self, path: &FieldPath) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        if state.unique.contains(path) {
            return Ok(());
        }

        let mut seen: Vec<&Value> = Vec::new();
        for doc in &state.docs {
            if let Some(key) = lookup(doc, path).into_iter().next() {
                if seen.contains(&key) {
                    return Err(StoreError::DuplicateKey {
                        index: path.to_string(),
                        key: key.to_string(),
                    });
                }
                seen.push(key);
            }
        }

        state.unique.push(path.clone());
        Ok(())
    }
}
