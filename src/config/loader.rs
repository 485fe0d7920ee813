// src/config/loader.rs

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::env::EnvSource;
use crate::config::properties::Properties;
use crate::errors::{HarnessError, Result};
use crate::fs::FileSystem;

/// File name of the store when nothing else is configured.
pub const DEFAULT_CONFIG_FILE: &str = "config.properties";

/// Environment variable that points at a different store.
pub const CONFIG_PATH_ENV: &str = "CLIPROBE_CONFIG";

/// Read and parse the store at `path`.
///
/// Returns `Ok(None)` when the file does not exist. Every other failure
/// (unreadable, not UTF-8, a directory) is an error.
pub fn load_from_path(fs: &dyn FileSystem, path: &Path) -> Result<Option<Properties>> {
    match fs.read_to_string(path) {
        Ok(contents) => Ok(Some(Properties::parse(&contents))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(HarnessError::ConfigError(
            format!("{} is not valid UTF-8 text: {e}", path.display()),
        )),
        Err(e) => Err(HarnessError::IoError(e)),
    }
}

/// Load the store with the lenient policy.
///
/// A missing file is not an error: a warning is logged and an empty store is
/// returned, so resolution falls back to the environment only.
pub fn load_properties(fs: &dyn FileSystem, path: &Path) -> Result<Properties> {
    match load_from_path(fs, path)? {
        Some(props) => {
            debug!(path = %path.display(), entries = props.len(), "loaded properties store");
            Ok(props)
        }
        None => {
            warn!(
                path = %path.display(),
                "properties store not found; resolving from environment variables only"
            );
            Ok(Properties::new())
        }
    }
}

/// Helper to resolve the default store path.
///
/// `CLIPROBE_CONFIG` wins when set and non-empty, otherwise
/// `config.properties` in the current working directory.
pub fn default_config_path(env: &dyn EnvSource) -> PathBuf {
    env.var(CONFIG_PATH_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
