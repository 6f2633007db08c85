//! Domain error model.

use thiserror::Error;

/// A group name was rejected by validation.
///
/// Group names become path segments in the store, so a leading `$` would
/// collide with store operators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupNameError {
    #[error("groups can not start with '$' (got '{0}')")]
    ReservedPrefix(String),
}

/// An identifier could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid identifier: {0}")]
pub struct IdError(pub String);
