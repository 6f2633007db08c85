//! Group names and the reserved global scope.

use serde::{Deserialize, Serialize};

use crate::error::GroupNameError;

/// Reserved group whose roles apply when resolving any group, including the
/// ungrouped case.
///
/// Pass it as the group argument to grant blanket roles:
///
/// ```ignore
/// roles.add_users_to_roles("u1", "admin", Some(GLOBAL_GROUP))?;
/// assert!(roles.user_is_in_role("u1", "admin", Some("any-group"))?);
/// ```
pub const GLOBAL_GROUP: &str = "__global_roles__";

/// A validated, canonical group name.
///
/// Canonical form replaces every `.` with `_`, so writes and reads that start
/// from the same raw name always land on the same stored key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    /// Validate and canonicalize an optional raw group.
    ///
    /// `None` and the empty string both mean "no group".
    pub fn parse_opt(raw: Option<&str>) -> Result<Option<Self>, GroupNameError> {
        match raw {
            None => Ok(None),
            Some(raw) => Self::parse(raw),
        }
    }

    /// Validate and canonicalize a raw group name.
    pub fn parse(raw: &str) -> Result<Option<Self>, GroupNameError> {
        if raw.is_empty() {
            return Ok(None);
        }
        if raw.starts_with('$') {
            return Err(GroupNameError::ReservedPrefix(raw.to_string()));
        }
        Ok(Some(Self(raw.replace('.', "_"))))
    }

    pub fn global() -> Self {
        Self(GLOBAL_GROUP.to_string())
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_GROUP
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for GroupName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
