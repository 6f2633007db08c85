//! Role catalog lifecycle: create, guarded delete, enumerate.

use serde_json::Value;

use rolegate_core::{ID_FIELD, NAME_FIELD, ROLES_FIELD, Role, RoleId};
use rolegate_infra::{Document, DocumentCollection, Filter, FindOptions, Projection, SortOrder, StoreError};

use crate::engine::Roles;
use crate::error::{RolesError, RolesResult};

impl<U, R> Roles<U, R>
where
    U: DocumentCollection,
    R: DocumentCollection,
{
    /// Create a role, returning its id.
    ///
    /// The name is trimmed. A missing or blank name is ignored and yields
    /// `Ok(None)`.
    pub fn create_role<'a>(&self, name: impl Into<Option<&'a str>>) -> RolesResult<Option<RoleId>> {
        let Some(name) = name.into().map(str::trim).filter(|n| !n.is_empty()) else {
            tracing::debug!("blank role name ignored");
            return Ok(None);
        };

        let mut doc = Document::new();
        doc.insert(NAME_FIELD.to_string(), Value::String(name.to_string()));

        match self.roles.insert(doc) {
            Ok(id) => {
                tracing::info!(role = name, role_id = %id, "role created");
                Ok(Some(RoleId::from(id)))
            }
            // The document carries only `name` and a generated `_id`, so any
            // unique-index rejection is a name clash, whatever the index is called.
            Err(StoreError::DuplicateKey { index, .. }) => {
                tracing::debug!(role = name, index = %index, "role name already taken");
                Err(RolesError::DuplicateRole(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a role by name.
    ///
    /// Refuses while any user holds the role in a flat assignment. Deleting
    /// a role that does not exist is not an error.
    pub fn delete_role<'a>(&self, name: impl Into<Option<&'a str>>) -> RolesResult<()> {
        let Some(name) = name.into().filter(|n| !n.is_empty()) else {
            return Ok(());
        };

        // Grouped assignments are not scanned.
        let holder = self
            .users
            .find_one(&Filter::is_in(ROLES_FIELD, [name]), Some(&Projection::include([ID_FIELD])))?;
        if holder.is_some() {
            tracing::warn!(role = name, "refusing to delete role still held by users");
            return Err(RolesError::RoleInUse(name.to_string()));
        }

        let Some(role) = self.roles.find_one(&Filter::eq(NAME_FIELD, name), None)? else {
            tracing::debug!(role = name, "role not found; nothing to delete");
            return Ok(());
        };
        if let Some(id) = role.get(ID_FIELD) {
            let removed = self.roles.remove(&Filter::Eq(ID_FIELD.into(), id.clone()))?;
            tracing::info!(role = name, removed, "role deleted");
        }
        Ok(())
    }

    /// Every role in the catalog, ordered by name.
    pub fn get_all_roles(&self) -> RolesResult<Vec<Role>> {
        let docs = self
            .roles
            .find(&Filter::All, &FindOptions::new().sort_by(NAME_FIELD, SortOrder::Ascending))?;
        Ok(docs.iter().filter_map(Role::from_document).collect())
    }
}
