// src/config/keys.rs

//! Well-known configuration keys and the environment variables the target
//! CLI reads.

/// Base URL of the API the CLI talks to. Required.
pub const API_HOST: &str = "appknox.api.host";
/// Access token for [`API_HOST`]. Required.
pub const ACCESS_TOKEN: &str = "appknox.access.token";
pub const INVALID_TOKEN: &str = "appknox.invalid.token";
pub const INVALID_HOST: &str = "appknox.invalid.host";
pub const HOST_WITHOUT_SLASH: &str = "appknox.host.without.slash";
/// Path (or bare name looked up on `PATH`) of the executable under test.
pub const CLI_PATH: &str = "appknox.cli.path";
/// Execution budget in whole seconds.
pub const COMMAND_TIMEOUT: &str = "command.timeout";

pub const DEFAULT_CLI_PATH: &str = "appknox";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Host variable read by the CLI itself.
pub const API_HOST_ENV: &str = "APPKNOX_API_HOST";
/// Token variable read by the CLI itself.
pub const ACCESS_TOKEN_ENV: &str = "APPKNOX_ACCESS_TOKEN";
