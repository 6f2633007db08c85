//! Add, replace and remove user role assignments.
//!
//! All three mutations share one protocol:
//!
//! 1. both `users` and `roles` must be supplied
//! 2. the group is validated and canonicalized (strict: errors are raised)
//! 3. add / set make sure every named role exists in the catalog
//! 4. one multi-document update is issued against `roles` or `roles.<group>`
//!
//! Shape conflicts surface as [`RolesError::MixingGroupAndNonGroup`].

use std::collections::BTreeSet;

use serde_json::Value;

use rolegate_core::{GroupName, ID_FIELD, NAME_FIELD, ROLES_FIELD, RoleNames, Users};
use rolegate_infra::{DocumentCollection, FieldPath, Filter, FindOptions, Projection, UpdateOptions, UpdateSpec};

use crate::engine::Roles;
use crate::error::{RolesError, RolesResult};
use crate::guard;

/// How an assignment update combines with what the user already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// Union-merge the roles into the target set.
    Add,
    /// Replace the target set wholesale. An empty role list clears it.
    Set,
    /// Subtract the roles from the target set.
    Remove,
}

impl Mutation {
    fn creates_missing_roles(self) -> bool {
        !matches!(self, Mutation::Remove)
    }

    fn update_spec(self, path: FieldPath, roles: &[String]) -> UpdateSpec {
        let values: Vec<Value> = roles.iter().cloned().map(Value::String).collect();
        match self {
            Mutation::Add => UpdateSpec::AddToSet { path, values },
            Mutation::Set => UpdateSpec::Set {
                path,
                value: Value::Array(values),
            },
            Mutation::Remove => UpdateSpec::PullAll { path, values },
        }
    }
}

impl core::fmt::Display for Mutation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Mutation::Add => f.write_str("add"),
            Mutation::Set => f.write_str("set"),
            Mutation::Remove => f.write_str("remove"),
        }
    }
}

/// Field a mutation targets: `roles`, or `roles.<group>` when scoped.
pub(crate) fn target_path(group: Option<&GroupName>) -> FieldPath {
    let roles = FieldPath::new(ROLES_FIELD);
    match group {
        Some(group) => roles.child(group.as_str()),
        None => roles,
    }
}

impl<U, R> Roles<U, R>
where
    U: DocumentCollection,
    R: DocumentCollection,
{
    /// Add users to roles, creating any role not yet in the catalog.
    ///
    /// Idempotent: adding a role the user already holds changes nothing.
    ///
    /// ```ignore
    /// roles.add_users_to_roles("u1", ["admin", "editor"], None)?;
    /// roles.add_users_to_roles(vec![user_a, user_b], "manage-team", Some("group1"))?;
    /// ```
    pub fn add_users_to_roles(
        &self,
        users: impl Into<Users>,
        roles: impl Into<RoleNames>,
        group: Option<&str>,
    ) -> RolesResult<()> {
        self.update_roles(users.into(), roles.into(), group, Mutation::Add)
    }

    /// Replace the users' roles (in `group`, when given) with exactly `roles`.
    ///
    /// Roles held in other groups are untouched.
    pub fn set_user_roles(
        &self,
        users: impl Into<Users>,
        roles: impl Into<RoleNames>,
        group: Option<&str>,
    ) -> RolesResult<()> {
        self.update_roles(users.into(), roles.into(), group, Mutation::Set)
    }

    /// Remove users from roles. Removing a role the user does not hold is a
    /// no-op. The catalog is not touched.
    pub fn remove_users_from_roles(
        &self,
        users: impl Into<Users>,
        roles: impl Into<RoleNames>,
        group: Option<&str>,
    ) -> RolesResult<()> {
        self.update_roles(users.into(), roles.into(), group, Mutation::Remove)
    }

    fn update_roles(&self, users: Users, roles: RoleNames, group: Option<&str>, mutation: Mutation) -> RolesResult<()> {
        if users.is_absent() {
            return Err(RolesError::MissingParameter("users"));
        }
        if roles.is_absent() {
            return Err(RolesError::MissingParameter("roles"));
        }
        let group = GroupName::parse_opt(group)?;

        if mutation.creates_missing_roles() {
            self.ensure_roles_exist(roles.names())?;
        }

        let ids = users.ids();
        let filter = Filter::is_in(ID_FIELD, ids.iter().map(|id| id.as_str()));
        let update = mutation.update_spec(target_path(group.as_ref()), roles.names());

        if self.config.shape_precheck {
            guard::precheck(&self.users, &filter, &update)?;
        }

        let matched = self
            .users
            .update(&filter, &update, UpdateOptions::multi())
            .map_err(guard::classify)?;

        tracing::info!(
            mutation = %mutation,
            group = group.as_ref().map(GroupName::as_str),
            users = ids.len(),
            roles = roles.names().len(),
            matched,
            "user roles updated"
        );
        Ok(())
    }

    /// Create every role in `names` that the catalog does not hold yet.
    ///
    /// A role created concurrently by another caller counts as success.
    fn ensure_roles_exist(&self, names: &[String]) -> RolesResult<()> {
        if names.is_empty() {
            return Ok(());
        }

        let existing: BTreeSet<String> = self
            .roles
            .find(
                &Filter::is_in(NAME_FIELD, names.iter().map(String::as_str)),
                &FindOptions::new().projection(Projection::include([NAME_FIELD])),
            )?
            .iter()
            .filter_map(|doc| doc.get(NAME_FIELD).and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        for name in names.iter().filter(|n| !existing.contains(*n)) {
            match self.create_role(name.as_str()) {
                Ok(_) => {}
                Err(RolesError::DuplicateRole(_)) => {
                    tracing::debug!(role = %name, "role created concurrently");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
