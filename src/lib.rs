// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod harness;
pub mod logging;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigResolver, ConfigSource};
use crate::exec::{ExecutionRequest, ExecutionResult, ProcessExecutor};
use crate::harness::with_credentials;

pub use crate::config::keys::{ACCESS_TOKEN_ENV, API_HOST_ENV};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - configuration resolution (flags, then environment, then store)
/// - request construction with the credential overlay
/// - a single execution under the resolved budget
///
/// Returns the exit code the process should end with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let source = match &args.config {
        Some(path) => ConfigSource::new(path),
        None => ConfigSource::discover(),
    };
    let resolver = ConfigResolver::initialize(source).context("loading configuration")?;

    let budget = match args.timeout {
        Some(secs) => Duration::from_secs(secs),
        None => resolver.command_timeout()?,
    };

    let (host, token) = if args.no_auth {
        (None, None)
    } else {
        let host = match args.host.clone() {
            Some(host) => host,
            None => resolver.api_host()?,
        };
        let token = match args.token.clone() {
            Some(token) => token,
            None => resolver.access_token()?,
        };
        (Some(host), Some(token))
    };

    let request = ExecutionRequest::new([resolver.cli_path()])?
        .arg(&args.subcommand)
        .args(&args.args);
    let request = with_credentials(request, host.as_deref(), token.as_deref());

    if args.dry_run {
        print_dry_run(&request, budget);
        return Ok(0);
    }

    let executor = ProcessExecutor::new(budget);
    let result = executor.run(request).await;
    info!(
        exit_code = result.exit_code(),
        timed_out = result.timed_out(),
        "invocation finished"
    );

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("serialising result")?
        );
    } else if !result.output().is_empty() {
        println!("{}", result.output());
    }

    Ok(process_exit_code(&result))
}

/// Map a result onto a process exit code; the sentinel becomes `1`.
pub fn process_exit_code(result: &ExecutionResult) -> i32 {
    match result.exit_code() {
        code if code < 0 => 1,
        code => code,
    }
}

/// Simple dry-run output: print the invocation with secrets masked.
fn print_dry_run(request: &ExecutionRequest, budget: Duration) {
    println!("cliprobe dry-run");
    println!("  budget = {}s", errors::format_budget(&budget));
    println!("  argv = {:?}", request.argv());
    println!("  overlay:");
    for (name, value) in request.env_overlay() {
        let shown = if name == ACCESS_TOKEN_ENV {
            mask(value)
        } else {
            value.clone()
        };
        println!("    {name}={shown}");
    }

    debug!("dry-run complete (no execution)");
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use clap::Parser;
    use tempfile::TempDir;

    use crate::errors::HarnessError;

    fn store(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("config.properties");
        std::fs::write(&path, contents).unwrap();
        path.display().to_string()
    }

    fn args(config: &str, rest: &[&str]) -> CliArgs {
        let mut argv = vec!["cliprobe", "--config", config];
        argv.extend_from_slice(rest);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn dry_run_never_spawns() {
        let dir = TempDir::new().unwrap();
        let config = store(
            &dir,
            "appknox.cli.path=/definitely/not/appknox\n\
             appknox.api.host=https://api.test/\n\
             appknox.access.token=test-token\n",
        );

        let code = run(args(&config, &["--dry-run", "whoami"])).await.unwrap();

        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn no_auth_skips_credential_lookup() {
        let dir = TempDir::new().unwrap();
        let config = store(&dir, "");

        let code = run(args(&config, &["--no-auth", "--dry-run", "whoami"]))
            .await
            .unwrap();

        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn missing_store_with_no_auth_still_runs() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("absent.properties").display().to_string();
        assert!(!Path::new(&config).exists());

        let code = run(args(&config, &["--no-auth", "--dry-run", "whoami"]))
            .await
            .unwrap();

        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn unresolved_credentials_fail_before_running() {
        let dir = TempDir::new().unwrap();
        let config = store(&dir, "appknox.cli.path=echo\n");

        let err = run(args(&config, &["--dry-run", "whoami"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HarnessError>(),
            Some(HarnessError::MissingConfiguration { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_flag_overrides_configured_budget() {
        let dir = TempDir::new().unwrap();
        let config = store(&dir, "appknox.cli.path=sleep\ncommand.timeout=60\n");

        let code = run(args(&config, &["--no-auth", "--timeout", "1", "5"]))
            .await
            .unwrap();

        assert_eq!(code, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn credential_flags_override_resolver() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("check.sh");
        std::fs::write(
            &script,
            "test \"$APPKNOX_API_HOST\" = https://flag/ && \
             test \"$APPKNOX_ACCESS_TOKEN\" = flag-token\n",
        )
        .unwrap();
        let script = script.display().to_string();
        let config = store(
            &dir,
            "appknox.cli.path=sh\n\
             appknox.api.host=https://file/\n\
             appknox.access.token=file-token\n",
        );

        let from_store = run(args(&config, &[script.as_str()])).await.unwrap();
        let from_flags = run(args(
            &config,
            &["--host", "https://flag/", "--token", "flag-token", script.as_str()],
        ))
        .await
        .unwrap();

        assert_eq!(from_store, 1);
        assert_eq!(from_flags, 0);
    }

    #[test]
    fn sentinel_maps_to_one() {
        let timed_out = ExecutionResult::timeout(Duration::from_secs(1));
        assert_eq!(process_exit_code(&timed_out), 1);

        let ok = ExecutionResult::completed(Some(0), String::new());
        assert_eq!(process_exit_code(&ok), 0);

        let failed = ExecutionResult::completed(Some(4), String::new());
        assert_eq!(process_exit_code(&failed), 4);
    }

    #[test]
    fn masks_tokens() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("abcdefghijkl"), "abcd****");
    }
}
