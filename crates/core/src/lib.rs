//! `rolegate-core`: role assignment domain primitives.
//!
//! This crate contains **pure domain** types (no storage concerns).

pub mod assignment;
pub mod error;
pub mod group;
pub mod id;
pub mod normalize;
pub mod record;

pub use assignment::RoleAssignment;
pub use error::{GroupNameError, IdError};
pub use group::{GLOBAL_GROUP, GroupName};
pub use id::{RoleId, UserId};
pub use normalize::{MaybeUser, RoleNames, UserRef, Users};
pub use record::{ID_FIELD, NAME_FIELD, ROLES_FIELD, Role, UserRecord};
