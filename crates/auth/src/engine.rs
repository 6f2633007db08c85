//! The `Roles` facade.
//!
//! Operations are grouped by concern in sibling modules, each adding an
//! `impl` block:
//!
//! - [`role_store`](crate::role_store): role catalog lifecycle
//! - [`assignment`](crate::assignment): add / set / remove user roles
//! - [`resolver`](crate::resolver): membership and listing queries

use rolegate_core::NAME_FIELD;
use rolegate_infra::{DocumentCollection, FieldPath};

use crate::config::RolesConfig;
use crate::error::RolesResult;

/// Role engine over a users collection `U` and a role catalog `R`.
///
/// Holds no mutable state of its own; every call is a request/response
/// exchange with the store, which provides per-document atomicity and the
/// unique index on role names.
#[derive(Debug)]
pub struct Roles<U, R> {
    pub(crate) users: U,
    pub(crate) roles: R,
    pub(crate) config: RolesConfig,
}

impl<U, R> Roles<U, R>
where
    U: DocumentCollection,
    R: DocumentCollection,
{
    pub fn new(users: U, roles: R) -> RolesResult<Self> {
        Self::with_config(users, roles, RolesConfig::default())
    }

    pub fn with_config(users: U, roles: R, config: RolesConfig) -> RolesResult<Self> {
        if config.ensure_indexes {
            roles.ensure_unique_index(&FieldPath::new(NAME_FIELD))?;
            tracing::debug!(field = NAME_FIELD, "role name index ensured");
        }
        Ok(Self { users, roles, config })
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    pub fn roles(&self) -> &R {
        &self.roles
    }

    pub fn config(&self) -> &RolesConfig {
        &self.config
    }
}
