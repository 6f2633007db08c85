//! Role engine error model.

use thiserror::Error;

use rolegate_core::GroupNameError;
use rolegate_infra::StoreError;

/// Result type used across the role engine.
pub type RolesResult<T> = Result<T, RolesError>;

/// Role engine error.
///
/// Write paths raise these; read paths degrade invalid input to an empty or
/// negative answer instead (store failures still propagate).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RolesError {
    /// A role with the same trimmed name is already in the catalog.
    #[error("role '{0}' already exists")]
    DuplicateRole(String),

    /// The role is still held by at least one user (flat assignments only).
    #[error("role '{0}' is in use")]
    RoleInUse(String),

    #[error("missing '{0}' param")]
    MissingParameter(&'static str),

    #[error("invalid group name: {0}")]
    InvalidGroupName(#[from] GroupNameError),

    /// A write of one assignment shape hit a user holding the other shape.
    #[error("can't mix grouped and non-grouped roles for same user")]
    MixingGroupAndNonGroup,

    #[error(transparent)]
    Store(#[from] StoreError),
}
