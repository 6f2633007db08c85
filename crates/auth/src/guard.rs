//! Mixed-mode guard: a user's roles are either flat or grouped, never both.
//!
//! The store reports a shape conflict as [`StoreError::TypeMismatch`] on the
//! `roles` field. That is translated into
//! [`RolesError::MixingGroupAndNonGroup`]; every other store error passes
//! through unchanged.

use rolegate_core::ROLES_FIELD;
use rolegate_infra::{DocumentCollection, Filter, FindOptions, Projection, StoreError, UpdateSpec};

use crate::error::{RolesError, RolesResult};

fn is_shape_conflict(err: &StoreError) -> bool {
    match err {
        StoreError::TypeMismatch { path, .. } => path.split('.').next() == Some(ROLES_FIELD),
        _ => false,
    }
}

/// Translate a store error raised by a role assignment update.
pub(crate) fn classify(err: StoreError) -> RolesError {
    if is_shape_conflict(&err) {
        tracing::warn!(error = %err, "rejected mix of grouped and non-grouped roles");
        RolesError::MixingGroupAndNonGroup
    } else {
        err.into()
    }
}

/// Dry-run `update` against the current `roles` field of every matched user.
///
/// Fails before anything is written when any target would conflict, so a
/// multi-user update cannot stop half way on a shape conflict.
pub(crate) fn precheck<U>(users: &U, filter: &Filter, update: &UpdateSpec) -> RolesResult<()>
where
    U: DocumentCollection,
{
    let current = users.find(filter, &FindOptions::new().projection(Projection::include([ROLES_FIELD])))?;
    for mut doc in current {
        update.apply(&mut doc).map_err(classify)?;
    }
    Ok(())
}
