//! Filter, update and find-option vocabulary of the document store contract.
//!
//! Paths are dotted (`roles.group1`). Matching follows document-store
//! conventions: a filter on a path whose value is an array matches when any
//! element matches, and arrays of objects are traversed element by element.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::r#trait::{Document, StoreError};

/// Dotted path into a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Path to a nested field under this one.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}.{}", self.0, segment))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Document selection predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Matches every document.
    All,
    /// Value at path equals (or, for arrays, contains) the given value.
    Eq(FieldPath, Value),
    /// Value at path matches any of the given values.
    In(FieldPath, Vec<Value>),
    /// Every sub-filter matches.
    And(Vec<Filter>),
    /// At least one sub-filter matches. An empty `Or` matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Filter::Eq(path.into(), value.into())
    }

    pub fn is_in<I, V>(path: impl Into<FieldPath>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(path.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(path, target) => lookup(doc, path).iter().any(|v| value_matches(v, target)),
            Filter::In(path, targets) => {
                let found = lookup(doc, path);
                targets
                    .iter()
                    .any(|t| found.iter().any(|v| value_matches(v, t)))
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

fn value_matches(found: &Value, target: &Value) -> bool {
    found == target || matches!(found, Value::Array(items) if items.contains(target))
}

/// Every value reachable at `path`.
pub(crate) fn lookup<'a>(doc: &'a Document, path: &FieldPath) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.segments().collect();
    let mut out = Vec::new();
    if let Some((head, rest)) = segments.split_first() {
        if let Some(value) = doc.get(*head) {
            descend(value, rest, &mut out);
        }
    }
    out
}

fn descend<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(next) = map.get(*head) {
                descend(next, rest, out);
            }
        }
        Value::Array(items) => {
            for item in items.iter().filter(|i| i.is_object()) {
                descend(item, segments, out);
            }
        }
        _ => {}
    }
}

/// Update operator, reported back in type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOperator {
    AddToSet,
    Set,
    PullAll,
}

impl core::fmt::Display for UpdateOperator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UpdateOperator::AddToSet => f.write_str("$addToSet"),
            UpdateOperator::Set => f.write_str("$set"),
            UpdateOperator::PullAll => f.write_str("$pullAll"),
        }
    }
}

/// Single-field document mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSpec {
    /// Add each value to the array at path unless already present. Creates the
    /// array (and missing parent objects) when absent.
    AddToSet { path: FieldPath, values: Vec<Value> },
    /// Replace the value at path, creating missing parent objects.
    Set { path: FieldPath, value: Value },
    /// Remove every occurrence of each value from the array at path. Missing
    /// paths are left alone.
    PullAll { path: FieldPath, values: Vec<Value> },
}

impl UpdateSpec {
    pub fn operator(&self) -> UpdateOperator {
        match self {
            UpdateSpec::AddToSet { .. } => UpdateOperator::AddToSet,
            UpdateSpec::Set { .. } => UpdateOperator::Set,
            UpdateSpec::PullAll { .. } => UpdateOperator::PullAll,
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            UpdateSpec::AddToSet { path, .. }
            | UpdateSpec::Set { path, .. }
            | UpdateSpec::PullAll { path, .. } => path,
        }
    }

    /// Apply to a single document.
    ///
    /// On error the document may be partially modified; callers apply to a
    /// copy and commit only on success.
    pub fn apply(&self, doc: &mut Document) -> Result<(), StoreError> {
        let create = !matches!(self, UpdateSpec::PullAll { .. });
        let Some((parent, field)) = parent_mut(doc, self.path(), self.operator(), create)? else {
            return Ok(());
        };

        match self {
            UpdateSpec::Set { value, .. } => {
                parent.insert(field, value.clone());
                Ok(())
            }
            UpdateSpec::AddToSet { values, path } => match parent.get_mut(&field) {
                None => {
                    let mut items: Vec<Value> = Vec::with_capacity(values.len());
                    for v in values {
                        if !items.contains(v) {
                            items.push(v.clone());
                        }
                    }
                    parent.insert(field, Value::Array(items));
                    Ok(())
                }
                Some(Value::Array(items)) => {
                    for v in values {
                        if !items.contains(v) {
                            items.push(v.clone());
                        }
                    }
                    Ok(())
                }
                Some(other) => Err(StoreError::type_mismatch(
                    path,
                    UpdateOperator::AddToSet,
                    format!("cannot apply to non-array field of type {}", kind(other)),
                )),
            },
            UpdateSpec::PullAll { values, path } => match parent.get_mut(&field) {
                None => Ok(()),
                Some(Value::Array(items)) => {
                    items.retain(|v| !values.contains(v));
                    Ok(())
                }
                Some(other) => Err(StoreError::type_mismatch(
                    path,
                    UpdateOperator::PullAll,
                    format!("can only apply to an array, found {}", kind(other)),
                )),
            },
        }
    }
}

/// Walk to the object holding the last path segment.
///
/// Returns `None` when a parent is missing and `create` is false.
fn parent_mut<'a>(
    doc: &'a mut Document,
    path: &FieldPath,
    operator: UpdateOperator,
    create: bool,
) -> Result<Option<(&'a mut Document, String)>, StoreError> {
    let segments: Vec<&str> = path.segments().collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(None);
    };

    let mut current: &mut Document = doc;
    for (depth, segment) in parents.iter().enumerate() {
        if !current.contains_key(*segment) {
            if !create {
                return Ok(None);
            }
            current.insert(segment.to_string(), Value::Object(Map::new()));
        }
        current = match current.get_mut(*segment) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(StoreError::type_mismatch(
                    path,
                    operator,
                    format!(
                        "cannot traverse element '{}' of type {}",
                        segments[..=depth].join("."),
                        kind(other)
                    ),
                ));
            }
            None => return Ok(None),
        };
    }
    Ok(Some((current, last.to_string())))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Which fields a read returns.
///
/// Only top-level fields are projected. `_id` is kept by `Include` unless
/// named in an `Exclude`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Exclude(fields.into_iter().map(Into::into).collect())
    }

    pub fn apply(&self, doc: &Document) -> Document {
        match self {
            Projection::Include(fields) => doc
                .iter()
                .filter(|(k, _)| k.as_str() == "_id" || fields.iter().any(|f| f == *k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Projection::Exclude(fields) => doc
                .iter()
                .filter(|(k, _)| !fields.iter().any(|f| f == *k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub path: FieldPath,
    pub order: SortOrder,
}

/// Options for multi-document reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Projection>,
    pub sort: Vec<SortKey>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort_by(mut self, path: impl Into<FieldPath>, order: SortOrder) -> Self {
        self.sort.push(SortKey {
            path: path.into(),
            order,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Order two documents by the configured sort keys.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for key in &self.sort {
            let left = lookup(a, &key.path).into_iter().next();
            let right = lookup(b, &key.path).into_iter().next();
            let ord = compare_values(left, right);
            let ord = match key.order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
