// src/config/resolver.rs

//! Environment-first configuration resolution.
//!
//! For a dotted key such as `appknox.api.host` the resolver consults, in order:
//! 1. the environment variable derived from the key (`APPKNOX_API_HOST`),
//! 2. the key verbatim in the loaded properties store,
//! 3. a caller-supplied default, if any.
//!
//! Empty strings count as unset at every step. A required key with nothing to
//! resolve to is a [`HarnessError::MissingConfiguration`].
//!
//! The resolver is an ordinary value built once at startup and handed to
//! whoever needs it. [`ConfigResolver::reload`] takes `&mut self`; a resolver
//! shared across threads has to be wrapped in a lock by its owner, and there
//! is no ordering between a reload and resolutions done by other threads
//! beyond what that lock gives.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::env::{EnvSource, ProcessEnv, env_var_name};
use crate::config::keys;
use crate::config::loader::{default_config_path, load_properties};
use crate::config::properties::Properties;
use crate::errors::{HarnessError, Result};
use crate::fs::{FileSystem, RealFileSystem};

/// Where the properties store lives and how to read it.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub fs: Arc<dyn FileSystem>,
    pub env: Arc<dyn EnvSource>,
}

impl ConfigSource {
    /// Store at `path`, read from the real file system and process
    /// environment.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fs: Arc::new(RealFileSystem),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Store at [`default_config_path`].
    pub fn discover() -> Self {
        Self::new(default_config_path(&ProcessEnv))
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolver {
    /// `None` for resolvers built around an in-memory store.
    source: Option<ConfigSource>,
    env: Arc<dyn EnvSource>,
    properties: Properties,
}

impl ConfigResolver {
    /// Load the store once.
    ///
    /// A missing store is tolerated (empty store, environment-only
    /// resolution). An unreadable one is an error.
    pub fn initialize(source: ConfigSource) -> Result<Self> {
        let properties = load_properties(source.fs.as_ref(), &source.path)?;
        info!(
            path = %source.path.display(),
            entries = properties.len(),
            "configuration initialised"
        );
        Ok(Self {
            env: Arc::clone(&source.env),
            source: Some(source),
            properties,
        })
    }

    /// Resolver around an already-built store. [`reload`](Self::reload) is a
    /// no-op for these.
    pub fn from_properties(properties: Properties, env: Arc<dyn EnvSource>) -> Self {
        Self {
            source: None,
            env,
            properties,
        }
    }

    /// Re-read the backing store, replacing every previously loaded value.
    ///
    /// Results already produced from earlier resolutions are unaffected. On
    /// error the previous store is kept.
    pub fn reload(&mut self) -> Result<()> {
        let Some(source) = &self.source else {
            debug!("reload requested for in-memory configuration; nothing to do");
            return Ok(());
        };

        let properties = load_properties(source.fs.as_ref(), &source.path)?;
        info!(
            path = %source.path.display(),
            entries = properties.len(),
            "configuration reloaded"
        );
        self.properties = properties;
        Ok(())
    }

    /// Resolve `key` or fail with [`HarnessError::MissingConfiguration`].
    pub fn resolve(&self, key: &str) -> Result<String> {
        self.lookup(key)
            .ok_or_else(|| HarnessError::MissingConfiguration {
                key: key.to_string(),
                env_var: env_var_name(key),
                store: self.store_label(),
            })
    }

    /// Resolve `key`, falling back to `default` when neither source has it.
    pub fn resolve_or(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| {
            debug!(key, "using default value");
            default.to_string()
        })
    }

    /// Resolve `key`, `None` when neither source has it.
    pub fn resolve_optional(&self, key: &str) -> Option<String> {
        self.lookup(key)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let env_var = env_var_name(key);
        if let Some(value) = self.env.var(&env_var).filter(|v| !v.is_empty()) {
            debug!(key, env_var = %env_var, "resolved from environment");
            return Some(value);
        }

        let value = self.properties.get(key).filter(|v| !v.is_empty())?;
        debug!(key, "resolved from properties store");
        Some(value.to_string())
    }

    fn store_label(&self) -> String {
        match &self.source {
            Some(source) => source.path.display().to_string(),
            None => "in-memory properties".to_string(),
        }
    }

    /// Path of the backing store, if any.
    pub fn store_path(&self) -> Option<&Path> {
        self.source.as_ref().map(|s| s.path.as_path())
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    // -- well-known keys ----------------------------------------------------

    pub fn api_host(&self) -> Result<String> {
        self.resolve(keys::API_HOST)
    }

    pub fn access_token(&self) -> Result<String> {
        self.resolve(keys::ACCESS_TOKEN)
    }

    pub fn invalid_token(&self) -> Option<String> {
        self.resolve_optional(keys::INVALID_TOKEN)
    }

    pub fn invalid_host(&self) -> Option<String> {
        self.resolve_optional(keys::INVALID_HOST)
    }

    pub fn host_without_slash(&self) -> Option<String> {
        self.resolve_optional(keys::HOST_WITHOUT_SLASH)
    }

    pub fn cli_path(&self) -> String {
        self.resolve_or(keys::CLI_PATH, keys::DEFAULT_CLI_PATH)
    }

    /// Execution budget, `command.timeout` seconds (default 60).
    pub fn command_timeout(&self) -> Result<Duration> {
        let Some(raw) = self.lookup(keys::COMMAND_TIMEOUT) else {
            return Ok(Duration::from_secs(keys::DEFAULT_COMMAND_TIMEOUT_SECS));
        };

        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            Ok(_) => Err(HarnessError::InvalidValue {
                key: keys::COMMAND_TIMEOUT.to_string(),
                reason: "must be at least 1 second".to_string(),
            }),
            Err(e) => Err(HarnessError::InvalidValue {
                key: keys::COMMAND_TIMEOUT.to_string(),
                reason: format!("'{raw}' is not a whole number of seconds ({e})"),
            }),
        }
    }
}
