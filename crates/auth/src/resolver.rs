//! Read side: membership checks and role / group / user listings.
//!
//! Every resolution folds in [`GLOBAL_GROUP`]. Invalid input on per-user
//! lookups degrades to `false` or an empty list rather than an error.

use std::collections::BTreeSet;

use serde_json::Value;

use rolegate_core::{
    GLOBAL_GROUP, GroupName, ID_FIELD, MaybeUser, ROLES_FIELD, RoleNames, UserRecord, UserRef,
};
use rolegate_infra::{DocumentCollection, FieldPath, Filter, FindOptions, Projection};

use crate::assignment::target_path;
use crate::engine::Roles;
use crate::error::RolesResult;

/// Users holding any of `roles` globally, or in `group` (flat field when
/// ungrouped).
fn scope_filter(roles: &BTreeSet<String>, group: Option<&GroupName>) -> Filter {
    let values: Vec<Value> = roles.iter().cloned().map(Value::String).collect();
    Filter::Or(vec![
        Filter::In(FieldPath::new(ROLES_FIELD).child(GLOBAL_GROUP), values.clone()),
        Filter::In(target_path(group), values),
    ])
}

impl<U, R> Roles<U, R>
where
    U: DocumentCollection,
    R: DocumentCollection,
{
    /// Whether the user holds any of `roles`, in `group` or globally.
    ///
    /// A record carrying a usable `roles` field is answered in memory;
    /// anything else is looked up by id.
    pub fn user_is_in_role(
        &self,
        user: impl Into<MaybeUser>,
        roles: impl Into<RoleNames>,
        group: Option<&str>,
    ) -> RolesResult<bool> {
        let wanted = roles.into().to_set();
        let Some(user) = user.into().into_inner() else {
            return Ok(false);
        };
        let Ok(group) = GroupName::parse_opt(group) else {
            return Ok(false);
        };

        if let UserRef::Record(UserRecord {
            roles: Some(assignment),
            ..
        }) = &user
        {
            return Ok(assignment.holds_any(&wanted, group.as_ref()));
        }

        let Some(id) = user.id() else {
            return Ok(false);
        };
        let filter = Filter::And(vec![
            Filter::eq(ID_FIELD, id.as_str()),
            scope_filter(&wanted, group.as_ref()),
        ]);
        let found = self
            .users
            .find_one(&filter, Some(&Projection::include([ID_FIELD])))?;
        Ok(found.is_some())
    }

    /// Effective roles of the user for `group`, sorted.
    ///
    /// With a group: that group's roles plus the global ones. Without: the
    /// flat set, or just the global roles for a grouped assignment.
    pub fn get_roles_for_user(&self, user: impl Into<MaybeUser>, group: Option<&str>) -> RolesResult<Vec<String>> {
        let Some(user) = user.into().into_inner() else {
            return Ok(Vec::new());
        };
        let Ok(group) = GroupName::parse_opt(group) else {
            return Ok(Vec::new());
        };

        Ok(self
            .resolve_record(user)?
            .and_then(|rec| rec.roles)
            .map(|assignment| assignment.roles_in_scope(group.as_ref()))
            .unwrap_or_default())
    }

    /// Users holding any of `roles`, in `group` or globally.
    ///
    /// `options` (projection, sort, limit) go straight to the store. Unlike
    /// the per-user lookups, an invalid group is an error here.
    pub fn get_users_in_role(
        &self,
        roles: impl Into<RoleNames>,
        group: Option<&str>,
        options: Option<FindOptions>,
    ) -> RolesResult<Vec<UserRecord>> {
        let wanted = roles.into().to_set();
        let group = GroupName::parse_opt(group)?;
        let options = options.unwrap_or_default();

        let docs = self.users.find(&scope_filter(&wanted, group.as_ref()), &options)?;
        tracing::debug!(
            roles = wanted.len(),
            group = group.as_ref().map(GroupName::as_str),
            found = docs.len(),
            "users in role resolved"
        );
        Ok(docs.into_iter().map(UserRecord::from_document).collect())
    }

    /// Groups the user holds roles in (only those holding `role`, when
    /// given), sorted. [`GLOBAL_GROUP`] is never listed; flat assignments
    /// have no groups.
    pub fn get_groups_for_user<'a>(
        &self,
        user: impl Into<MaybeUser>,
        role: impl Into<Option<&'a str>>,
    ) -> RolesResult<Vec<String>> {
        let Some(user) = user.into().into_inner() else {
            return Ok(Vec::new());
        };
        let role = role.into().filter(|r| !r.is_empty());
        if role.is_some_and(|r| r.starts_with('$')) {
            return Ok(Vec::new());
        }

        Ok(self
            .resolve_record(user)?
            .and_then(|rec| rec.roles)
            .map(|assignment| assignment.groups(role))
            .unwrap_or_default())
    }

    /// The record to read `roles` from. Ids are loaded from the store;
    /// records are used as given.
    fn resolve_record(&self, user: UserRef) -> RolesResult<Option<UserRecord>> {
        match user {
            UserRef::Record(rec) => Ok(Some(rec)),
            UserRef::Id(id) => {
                let doc = self.users.find_one(
                    &Filter::eq(ID_FIELD, id.as_str()),
                    Some(&Projection::include([ROLES_FIELD])),
                )?;
                Ok(doc.map(UserRecord::from_document))
            }
        }
    }
}
