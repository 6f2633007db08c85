//! User and role records as read from (and written to) the document store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assignment::RoleAssignment;
use crate::id::{RoleId, UserId};

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "_id";
/// Field holding a user's role assignment.
pub const ROLES_FIELD: &str = "roles";
/// Field holding a role's name in the catalog.
pub const NAME_FIELD: &str = "name";

/// A role in the catalog.
///
/// `name` is trimmed, non-empty and catalog-unique (enforced by the store's
/// unique index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: RoleId,
    pub name: String,
}

impl Role {
    pub fn from_document(doc: &Map<String, Value>) -> Option<Self> {
        serde_json::from_value(Value::Object(doc.clone())).ok()
    }
}

/// A user document as seen by the role engine.
///
/// The engine owns only `_id` and `roles`; every other field is carried
/// through untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    /// `None` when the document's `_id` is missing or not a string.
    pub id: Option<UserId>,
    /// `None` when `roles` is missing or not a usable shape.
    pub roles: Option<RoleAssignment>,
    pub fields: Map<String, Value>,
}

impl UserRecord {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_roles(mut self, roles: RoleAssignment) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn from_document(mut doc: Map<String, Value>) -> Self {
        let id = match doc.remove(ID_FIELD) {
            Some(Value::String(id)) => Some(UserId::from(id)),
            _ => None,
        };
        let roles = doc
            .remove(ROLES_FIELD)
            .and_then(|v| RoleAssignment::from_value(&v));
        Self {
            id,
            roles,
            fields: doc,
        }
    }

    pub fn into_document(self) -> Map<String, Value> {
        let mut doc = self.fields;
        if let Some(id) = self.id {
            doc.insert(ID_FIELD.to_string(), Value::String(id.into_string()));
        }
        if let Some(roles) = self.roles {
            doc.insert(ROLES_FIELD.to_string(), roles.to_value());
        }
        doc
    }
}
