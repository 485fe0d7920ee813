// src/exec/result.rs

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::errors::{ExecutionFailure, format_budget};

/// Exit status reported when the program never produced one.
pub const EXIT_FAILURE_SENTINEL: i32 = -1;

/// Outcome of one execution. Built once by the executor, never mutated.
///
/// The triple `exit_code` / `output` / `timed_out` is what callers assert
/// on; `failure` classifies the non-success cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    exit_code: i32,
    output: String,
    timed_out: bool,
    failure: Option<ExecutionFailure>,
}

impl ExecutionResult {
    /// The program ran to completion. `exit_code` is `None` when the OS
    /// reported no code (terminated by a signal).
    pub fn completed(exit_code: Option<i32>, output: String) -> Self {
        let exit_code = exit_code.unwrap_or(EXIT_FAILURE_SENTINEL);
        let failure = (exit_code != 0).then_some(ExecutionFailure::NonZeroExit { code: exit_code });
        Self {
            exit_code,
            output,
            timed_out: false,
            failure,
        }
    }

    pub fn timeout(budget: Duration) -> Self {
        Self {
            exit_code: EXIT_FAILURE_SENTINEL,
            output: format!("Command timeout after {} seconds", format_budget(&budget)),
            timed_out: true,
            failure: Some(ExecutionFailure::TimeoutExceeded { budget }),
        }
    }

    pub fn spawn_failure(program: &str, reason: impl Into<String>) -> Self {
        let failure = ExecutionFailure::SpawnFailure {
            program: program.to_string(),
            reason: reason.into(),
        };
        Self {
            exit_code: EXIT_FAILURE_SENTINEL,
            output: capitalize(&failure.to_string()),
            timed_out: false,
            failure: Some(failure),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Merged stdout/stderr, trailing whitespace trimmed. For timeouts and
    /// spawn failures this describes the failure instead.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && self.failure.is_none()
    }

    pub fn failure(&self) -> Option<&ExecutionFailure> {
        self.failure.as_ref()
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExecutionResult {{ exit_code: {}, timed_out: {}, output: {:?} }}",
            self.exit_code, self.timed_out, self.output
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
