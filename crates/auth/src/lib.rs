//! `rolegate-auth`: role assignment and resolution engine.
//!
//! Roles are plain names, optionally scoped to a group. Roles stored under
//! [`GLOBAL_GROUP`] apply to every group lookup. This crate is decoupled from
//! any concrete store: it talks to users and roles through
//! [`DocumentCollection`](rolegate_infra::DocumentCollection).

pub mod assignment;
pub mod config;
pub mod engine;
pub mod error;
mod guard;
pub mod resolver;
pub mod role_store;

pub use assignment::Mutation;
pub use config::RolesConfig;
pub use engine::Roles;
pub use error::{RolesError, RolesResult};

pub use rolegate_core::{GLOBAL_GROUP, MaybeUser, Role, RoleAssignment, RoleNames, UserRecord, UserRef, Users};
