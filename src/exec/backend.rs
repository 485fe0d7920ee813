// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! [`crate::harness::CliHarness`] talks to an `ExecutorBackend` instead of a
//! concrete [`ProcessExecutor`], so tests can swap in a fake that records
//! requests and returns scripted results without spawning anything.

use std::time::Duration;

use super::executor::ProcessExecutor;
use super::request::ExecutionRequest;
use super::result::ExecutionResult;

/// Trait abstracting how execution requests are run.
pub trait ExecutorBackend: Send + Sync {
    /// Run `request` to completion or timeout. Never fails; failures are
    /// encoded in the result.
    fn execute(&self, request: ExecutionRequest) -> ExecutionResult;

    /// Budget applied to each request.
    fn budget(&self) -> Duration;
}

impl ExecutorBackend for ProcessExecutor {
    fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        ProcessExecutor::execute(self, request)
    }

    fn budget(&self) -> Duration {
        ProcessExecutor::budget(self)
    }
}
