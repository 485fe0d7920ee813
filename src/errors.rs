// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Two families live here:
//! - [`HarnessError`] is returned as `Err` by configuration and request
//!   construction. An unresolved required key is a setup defect and must stop
//!   the run.
//! - [`ExecutionFailure`] is never returned as `Err`. The executor encodes it
//!   inside every [`crate::exec::ExecutionResult`] so callers assert on results
//!   uniformly.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(
        "missing configuration for '{key}': set the {env_var} environment variable \
         or '{key}' in {store}"
    )]
    MissingConfiguration {
        key: String,
        env_var: String,
        store: String,
    },

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("invalid execution request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Why an execution did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionFailure {
    /// The program could not be started (missing, not executable, bad args).
    #[error("failed to start '{program}': {reason}")]
    SpawnFailure { program: String, reason: String },

    /// The program outlived its budget and was killed.
    #[error("command timeout after {} seconds", format_budget(.budget))]
    TimeoutExceeded { budget: Duration },

    /// The program ran to completion and reported failure.
    #[error("command exited with status {code}")]
    NonZeroExit { code: i32 },
}

/// Render a budget the way timeout messages print it (`5`, `0.25`).
pub fn format_budget(budget: &Duration) -> String {
    if budget.subsec_nanos() == 0 {
        budget.as_secs().to_string()
    } else {
        budget.as_secs_f64().to_string()
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_formatting() {
        assert_eq!(format_budget(&Duration::from_secs(5)), "5");
        assert_eq!(format_budget(&Duration::from_millis(250)), "0.25");
        assert_eq!(format_budget(&Duration::from_millis(1500)), "1.5");
    }

    #[test]
    fn missing_configuration_names_both_sources() {
        let err = HarnessError::MissingConfiguration {
            key: "appknox.api.host".to_string(),
            env_var: "APPKNOX_API_HOST".to_string(),
            store: "config.properties".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("appknox.api.host"));
        assert!(msg.contains("APPKNOX_API_HOST"));
        assert!(msg.contains("config.properties"));
    }

    #[test]
    fn timeout_failure_mentions_budget() {
        let failure = ExecutionFailure::TimeoutExceeded {
            budget: Duration::from_secs(3),
        };
        assert_eq!(failure.to_string(), "command timeout after 3 seconds");
    }
}
