// src/config/mod.rs

//! Configuration resolution for cliprobe.
//!
//! Responsibilities:
//! - Parse the flat `key=value` properties store (`properties.rs`).
//! - Abstract the process environment (`env.rs`).
//! - Locate and read the store from disk (`loader.rs`).
//! - Resolve values with environment-first precedence (`resolver.rs`).
//! - Name the well-known keys of the target CLI (`keys.rs`).

pub mod env;
pub mod keys;
pub mod loader;
pub mod properties;
pub mod resolver;

pub use env::{EnvSource, MapEnv, ProcessEnv, env_var_name};
pub use loader::{default_config_path, load_from_path, load_properties};
pub use properties::Properties;
pub use resolver::{ConfigResolver, ConfigSource};
