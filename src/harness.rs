// src/harness.rs

//! Glue that test suites use to drive the CLI under test.
//!
//! A [`CliHarness`] pairs a [`ConfigResolver`] with an executor backend and
//! knows the target CLI's conventions: the program comes from
//! `appknox.cli.path`, and credentials are passed through the
//! `APPKNOX_API_HOST` / `APPKNOX_ACCESS_TOKEN` overlay variables.

use std::time::Duration;

use tracing::debug;

use crate::config::ConfigResolver;
use crate::config::keys::{ACCESS_TOKEN_ENV, API_HOST_ENV};
use crate::errors::Result;
use crate::exec::{ExecutionRequest, ExecutionResult, ExecutorBackend, ProcessExecutor};

pub struct CliHarness<E = ProcessExecutor> {
    resolver: ConfigResolver,
    executor: E,
}

impl CliHarness<ProcessExecutor> {
    /// Harness with a real executor using `command.timeout` as its budget.
    pub fn new(resolver: ConfigResolver) -> Result<Self> {
        let executor = ProcessExecutor::new(resolver.command_timeout()?);
        Ok(Self { resolver, executor })
    }
}

impl<E: ExecutorBackend> CliHarness<E> {
    pub fn with_executor(resolver: ConfigResolver, executor: E) -> Self {
        Self { resolver, executor }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Mutable access, e.g. to [`ConfigResolver::reload`] between runs.
    pub fn resolver_mut(&mut self) -> &mut ConfigResolver {
        &mut self.resolver
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Budget each run is given by the backend.
    pub fn budget(&self) -> Duration {
        self.executor.budget()
    }

    /// `[cli_path, subcommand, args...]` with an empty overlay.
    pub fn command<I, S>(&self, subcommand: &str, args: I) -> Result<ExecutionRequest>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(ExecutionRequest::new([self.resolver.cli_path()])?
            .arg(subcommand)
            .args(args))
    }

    /// Run a subcommand with explicit credentials.
    ///
    /// `None` or empty values leave the corresponding variable out of the
    /// overlay, so the CLI sees whatever the harness process inherited.
    pub fn run_command<I, S>(
        &self,
        subcommand: &str,
        args: I,
        host: Option<&str>,
        token: Option<&str>,
    ) -> Result<ExecutionResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = with_credentials(self.command(subcommand, args)?, host, token);
        debug!(
            subcommand,
            budget_secs = self.budget().as_secs_f64(),
            "running CLI subcommand"
        );
        Ok(self.executor.execute(request))
    }

    /// Run a subcommand with the configured host and token.
    ///
    /// Fails before spawning anything when either is unresolved.
    pub fn run_authenticated<I, S>(&self, subcommand: &str, args: I) -> Result<ExecutionResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let host = self.resolver.api_host()?;
        let token = self.resolver.access_token()?;
        self.run_command(subcommand, args, Some(&host), Some(&token))
    }

    /// Run an arbitrary request through the backend.
    pub fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        self.executor.execute(request)
    }
}

/// Add the credential variables the CLI reads, skipping empty ones.
pub fn with_credentials(
    mut request: ExecutionRequest,
    host: Option<&str>,
    token: Option<&str>,
) -> ExecutionRequest {
    if let Some(host) = host.filter(|h| !h.is_empty()) {
        request = request.env(API_HOST_ENV, host);
    }
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        request = request.env(ACCESS_TOKEN_ENV, token);
    } else {
        debug!("no access token supplied; {} left out of overlay", ACCESS_TOKEN_ENV);
    }
    request
}
