//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Environment variable toggling [`RolesConfig::shape_precheck`].
pub const SHAPE_PRECHECK_ENV: &str = "ROLEGATE_SHAPE_PRECHECK";
/// Environment variable toggling [`RolesConfig::ensure_indexes`].
pub const ENSURE_INDEXES_ENV: &str = "ROLEGATE_ENSURE_INDEXES";

/// Role engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Read the target users' `roles` field before a mutation and reject a
    /// mixed-shape write before any document is touched. Store-reported
    /// type mismatches are still translated when this is off.
    pub shape_precheck: bool,
    /// Declare the unique index on role names when the engine is built.
    pub ensure_indexes: bool,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            shape_precheck: true,
            ensure_indexes: true,
        }
    }
}

impl RolesConfig {
    /// Load from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            shape_precheck: flag(&lookup, SHAPE_PRECHECK_ENV, defaults.shape_precheck),
            ensure_indexes: flag(&lookup, ENSURE_INDEXES_ENV, defaults.ensure_indexes),
        }
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            tracing::warn!(key, value = other, default, "unrecognized boolean; using default");
            default
        }
    }
}
