// src/config/env.rs

//! Environment lookup seam.
//!
//! The resolver never calls `std::env` directly; it asks an [`EnvSource`].
//! Production uses [`ProcessEnv`], tests hand in a [`MapEnv`].

use std::collections::BTreeMap;
use std::fmt::Debug;

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync + Debug {
    /// Value of `name`, or `None` when unset or not valid Unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Environment variable consulted for a dotted key: upper-cased, `.` → `_`.
///
/// `appknox.api.host` → `APPKNOX_API_HOST`.
pub fn env_var_name(key: &str) -> String {
    key.to_uppercase().replace('.', "_")
}
