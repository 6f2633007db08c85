//! Normalization of caller input shared by every mutating and reading
//! operation.
//!
//! Callers may pass a single user or many, a single role or many. These
//! wrappers accept all of those shapes and reduce them to clean lists, while
//! remembering whether the caller supplied anything at all.

use std::collections::BTreeSet;

use crate::id::UserId;
use crate::record::UserRecord;

/// A user given either by id or by an already loaded record.
#[derive(Debug, Clone, PartialEq)]
pub enum UserRef {
    Id(UserId),
    Record(UserRecord),
}

impl UserRef {
    /// The id this reference resolves to, if any.
    pub fn id(&self) -> Option<&UserId> {
        match self {
            UserRef::Id(id) => Some(id),
            UserRef::Record(rec) => rec.id.as_ref(),
        }
    }

    /// An empty id string counts as no user at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, UserRef::Id(id) if id.as_str().is_empty())
    }
}

impl From<&str> for UserRef {
    fn from(value: &str) -> Self {
        UserRef::Id(UserId::from(value))
    }
}

impl From<String> for UserRef {
    fn from(value: String) -> Self {
        UserRef::Id(UserId::from(value))
    }
}

impl From<UserId> for UserRef {
    fn from(value: UserId) -> Self {
        UserRef::Id(value)
    }
}

impl From<&UserId> for UserRef {
    fn from(value: &UserId) -> Self {
        UserRef::Id(value.clone())
    }
}

impl From<UserRecord> for UserRef {
    fn from(value: UserRecord) -> Self {
        UserRef::Record(value)
    }
}

impl From<&UserRecord> for UserRef {
    fn from(value: &UserRecord) -> Self {
        UserRef::Record(value.clone())
    }
}

/// A single, possibly missing, user argument for read operations.
///
/// A blank id counts as missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaybeUser(Option<UserRef>);

impl MaybeUser {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn into_inner(self) -> Option<UserRef> {
        self.0.filter(|u| !u.is_blank())
    }
}

impl From<UserRef> for MaybeUser {
    fn from(value: UserRef) -> Self {
        Self(Some(value))
    }
}

impl From<&str> for MaybeUser {
    fn from(value: &str) -> Self {
        Self(Some(value.into()))
    }
}

impl From<String> for MaybeUser {
    fn from(value: String) -> Self {
        Self(Some(value.into()))
    }
}

impl From<UserId> for MaybeUser {
    fn from(value: UserId) -> Self {
        Self(Some(value.into()))
    }
}

impl From<&UserId> for MaybeUser {
    fn from(value: &UserId) -> Self {
        Self(Some(value.into()))
    }
}

impl From<UserRecord> for MaybeUser {
    fn from(value: UserRecord) -> Self {
        Self(Some(value.into()))
    }
}

impl From<&UserRecord> for MaybeUser {
    fn from(value: &UserRecord) -> Self {
        Self(Some(value.into()))
    }
}

impl<T: Into<UserRef>> From<Option<T>> for MaybeUser {
    fn from(value: Option<T>) -> Self {
        Self(value.map(Into::into))
    }
}

/// One or more users targeted by a mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Users {
    refs: Vec<UserRef>,
    absent: bool,
}

impl Users {
    /// No users supplied.
    pub fn absent() -> Self {
        Self {
            refs: Vec::new(),
            absent: true,
        }
    }

    /// Whether the caller supplied nothing (or a lone empty id).
    pub fn is_absent(&self) -> bool {
        self.absent
    }

    /// Ids of every reference that has one; records without a string id are
    /// dropped.
    pub fn ids(&self) -> Vec<UserId> {
        self.refs.iter().filter_map(UserRef::id).cloned().collect()
    }

    fn single(user: UserRef) -> Self {
        let absent = user.is_blank();
        Self {
            refs: vec![user],
            absent,
        }
    }
}

impl From<UserRef> for Users {
    fn from(value: UserRef) -> Self {
        Self::single(value)
    }
}

impl From<&str> for Users {
    fn from(value: &str) -> Self {
        Self::single(value.into())
    }
}

impl From<String> for Users {
    fn from(value: String) -> Self {
        Self::single(value.into())
    }
}

impl From<UserId> for Users {
    fn from(value: UserId) -> Self {
        Self::single(value.into())
    }
}

impl From<&UserId> for Users {
    fn from(value: &UserId) -> Self {
        Self::single(value.into())
    }
}

impl From<UserRecord> for Users {
    fn from(value: UserRecord) -> Self {
        Self::single(value.into())
    }
}

impl From<&UserRecord> for Users {
    fn from(value: &UserRecord) -> Self {
        Self::single(value.into())
    }
}

impl<T: Into<UserRef>> From<Vec<T>> for Users {
    fn from(value: Vec<T>) -> Self {
        Self {
            refs: value.into_iter().map(Into::into).collect(),
            absent: false,
        }
    }
}

impl<T: Into<UserRef>, const N: usize> From<[T; N]> for Users {
    fn from(value: [T; N]) -> Self {
        Self {
            refs: value.into_iter().map(Into::into).collect(),
            absent: false,
        }
    }
}

impl<T: Into<Users>> From<Option<T>> for Users {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(Users::absent)
    }
}

/// One or more role names, trimmed, with blank entries dropped.
///
/// An empty list after filtering is valid; it clears a set under the replace
/// strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleNames {
    names: Vec<String>,
    absent: bool,
}

impl RoleNames {
    /// No roles supplied.
    pub fn absent() -> Self {
        Self {
            names: Vec::new(),
            absent: true,
        }
    }

    /// Whether the caller supplied nothing (or a lone empty string).
    pub fn is_absent(&self) -> bool {
        self.absent
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn to_set(&self) -> BTreeSet<String> {
        self.names.iter().cloned().collect()
    }

    fn collect<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let names = raw
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .filter(|r| seen.insert(r.clone()))
            .collect();
        Self {
            names,
            absent: false,
        }
    }

    fn single(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::absent();
        }
        Self::collect([raw])
    }
}

impl From<&str> for RoleNames {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl From<String> for RoleNames {
    fn from(value: String) -> Self {
        Self::single(&value)
    }
}

impl From<&String> for RoleNames {
    fn from(value: &String) -> Self {
        Self::single(value)
    }
}

impl<S: AsRef<str>> From<Vec<S>> for RoleNames {
    fn from(value: Vec<S>) -> Self {
        Self::collect(value)
    }
}

impl<S: AsRef<str>> From<&[S]> for RoleNames {
    fn from(value: &[S]) -> Self {
        Self::collect(value)
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for RoleNames {
    fn from(value: [S; N]) -> Self {
        Self::collect(value)
    }
}

impl<T: Into<RoleNames>> From<Option<T>> for RoleNames {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(RoleNames::absent)
    }
}
