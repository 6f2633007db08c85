//! Per-user role assignment: a flat set or a per-group map, never both.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::group::{GLOBAL_GROUP, GroupName};

/// Stored shape of a user's `roles` field.
///
/// # Invariants
/// - A user holds exactly one shape at a time.
/// - Writing the other shape onto an existing assignment is a structural
///   conflict, detected at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleAssignment {
    /// Unscoped role set, stored as a string array.
    Flat(BTreeSet<String>),
    /// Group name to role set, stored as an object of string arrays.
    Grouped(BTreeMap<String, BTreeSet<String>>),
}

impl RoleAssignment {
    /// Interpret a stored `roles` value.
    ///
    /// Returns `None` when the value is neither a string array nor an object
    /// of string arrays.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        match self {
            RoleAssignment::Flat(roles) => {
                Value::Array(roles.iter().cloned().map(Value::String).collect())
            }
            RoleAssignment::Grouped(groups) => Value::Object(
                groups
                    .iter()
                    .map(|(group, roles)| {
                        (
                            group.clone(),
                            Value::Array(roles.iter().cloned().map(Value::String).collect()),
                        )
                    })
                    .collect(),
            ),
        }
    }

    pub fn flat<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleAssignment::Flat(roles.into_iter().map(Into::into).collect())
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, RoleAssignment::Flat(_))
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, RoleAssignment::Grouped(_))
    }

    fn group_roles(&self, group: &str) -> Option<&BTreeSet<String>> {
        match self {
            RoleAssignment::Flat(_) => None,
            RoleAssignment::Grouped(groups) => groups.get(group),
        }
    }

    /// Whether any of `roles` is held in scope.
    ///
    /// Flat: any requested role is in the set. Grouped: any requested role is
    /// under `group` or under [`GLOBAL_GROUP`].
    pub fn holds_any(&self, roles: &BTreeSet<String>, group: Option<&GroupName>) -> bool {
        match self {
            RoleAssignment::Flat(held) => roles.iter().any(|r| held.contains(r)),
            RoleAssignment::Grouped(_) => {
                let in_group = group
                    .and_then(|g| self.group_roles(g.as_str()))
                    .is_some_and(|held| roles.iter().any(|r| held.contains(r)));
                in_group
                    || self
                        .group_roles(GLOBAL_GROUP)
                        .is_some_and(|held| roles.iter().any(|r| held.contains(r)))
            }
        }
    }

    /// Effective role names for `group`, with the global scope folded in.
    ///
    /// Always sorted and free of duplicates, including for the flat shape:
    /// assignments are sets, so stored order carries no meaning.
    pub fn roles_in_scope(&self, group: Option<&GroupName>) -> Vec<String> {
        match (self, group) {
            (RoleAssignment::Flat(held), None) => held.iter().cloned().collect(),
            (RoleAssignment::Flat(_), Some(_)) => Vec::new(),
            (RoleAssignment::Grouped(_), Some(group)) => {
                let mut union: BTreeSet<&String> = BTreeSet::new();
                for scope in [group.as_str(), GLOBAL_GROUP] {
                    if let Some(held) = self.group_roles(scope) {
                        union.extend(held.iter());
                    }
                }
                union.into_iter().cloned().collect()
            }
            (RoleAssignment::Grouped(_), None) => self
                .group_roles(GLOBAL_GROUP)
                .map(|held| held.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Group names, excluding [`GLOBAL_GROUP`], optionally restricted to
    /// groups holding `role`. Always empty for the flat shape.
    pub fn groups(&self, role: Option<&str>) -> Vec<String> {
        let RoleAssignment::Grouped(groups) = self else {
            return Vec::new();
        };
        groups
            .iter()
            .filter(|(name, _)| name.as_str() != GLOBAL_GROUP)
            .filter(|(_, held)| role.is_none_or(|r| held.contains(r)))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
