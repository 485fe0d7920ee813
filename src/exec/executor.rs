// src/exec/executor.rs

//! Run one external program to completion or timeout.

use std::process::Stdio;
use std::thread;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::exec::pipe::{self, join_output};
use crate::exec::process_group::{self, GroupGuard};
use crate::exec::request::ExecutionRequest;
use crate::exec::result::ExecutionResult;

/// How long to wait for a killed child to be reaped before giving up on it.
const REAP_GRACE: Duration = Duration::from_secs(5);

/// Spawns programs with merged output capture and a wall-clock budget.
///
/// Holds no state besides the default budget; concurrent calls on separate
/// threads are independent. No call ever returns an error: every failure is
/// encoded in the [`ExecutionResult`].
#[derive(Debug, Clone, Copy)]
pub struct ProcessExecutor {
    budget: Duration,
}

impl ProcessExecutor {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Blocking execution with the default budget.
    pub fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        self.execute_with_budget(request, self.budget)
    }

    /// Blocking execution with an explicit budget.
    ///
    /// Drives the async implementation on a private current-thread runtime.
    /// Called from inside a Tokio runtime, the work moves to a scoped OS
    /// thread so the caller's runtime is never nested.
    pub fn execute_with_budget(
        &self,
        request: ExecutionRequest,
        budget: Duration,
    ) -> ExecutionResult {
        if tokio::runtime::Handle::try_current().is_err() {
            return block_on_run(request, budget);
        }

        let program = request.program().to_string();
        thread::scope(|scope| scope.spawn(move || block_on_run(request, budget)).join())
            .unwrap_or_else(|_| {
                error!(program = %program, "execution thread panicked");
                ExecutionResult::spawn_failure(&program, "execution thread panicked")
            })
    }

    /// Async execution with the default budget.
    pub async fn run(&self, request: ExecutionRequest) -> ExecutionResult {
        run_with_budget(request, self.budget).await
    }

    /// Async execution with an explicit budget.
    pub async fn run_with_budget(
        &self,
        request: ExecutionRequest,
        budget: Duration,
    ) -> ExecutionResult {
        run_with_budget(request, budget).await
    }
}

fn block_on_run(request: ExecutionRequest, budget: Duration) -> ExecutionResult {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(run_with_budget(request, budget)),
        Err(e) => {
            error!(error = %e, "failed to build runtime for execution");
            ExecutionResult::spawn_failure(
                request.program(),
                format!("failed to start async runtime: {e}"),
            )
        }
    }
}

async fn run_with_budget(request: ExecutionRequest, budget: Duration) -> ExecutionResult {
    let program = request.program().to_string();

    if budget.is_zero() {
        warn!(program = %program, "refusing to run with a zero execution budget");
        return ExecutionResult::spawn_failure(&program, "execution budget must be positive");
    }

    info!(
        program = %program,
        args = ?request.arguments(),
        overlay = ?request.env_overlay().keys().collect::<Vec<_>>(),
        budget_secs = budget.as_secs_f64(),
        "starting process"
    );

    let mut cmd = Command::new(&program);
    cmd.args(request.arguments())
        .stdin(Stdio::null())
        .kill_on_drop(true);

    // PATH is always forwarded, then the overlay wins on any collision.
    if let Some(path) = std::env::var_os("PATH") {
        cmd.env("PATH", path);
    }
    cmd.envs(request.env_overlay());

    process_group::isolate(&mut cmd);

    let wiring = match pipe::wire(&mut cmd) {
        Ok(wiring) => wiring,
        Err(e) => {
            error!(program = %program, error = %e, "failed to set up output capture");
            return ExecutionResult::spawn_failure(&program, format!("creating output pipe: {e}"));
        }
    };

    let spawned = cmd.spawn();
    // Releases the parent's copies of the pipe's write end.
    drop(cmd);

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            error!(program = %program, error = %e, "failed to spawn process");
            return ExecutionResult::spawn_failure(&program, e.to_string());
        }
    };

    let guard = GroupGuard::new(child.id());
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let readers = match wiring.start_readers(&mut child, tx) {
        Ok(readers) => readers,
        Err(e) => {
            error!(program = %program, error = %e, "failed to attach output reader");
            guard.kill(&mut child);
            let _ = timeout(REAP_GRACE, child.wait()).await;
            guard.disarm();
            return ExecutionResult::spawn_failure(&program, format!("reading output: {e}"));
        }
    };

    // Exit and end-of-output share one deadline: a descendant that keeps the
    // pipe open past the budget counts as a timeout.
    let finished = timeout(budget, async {
        let status = child.wait().await;
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        (status, lines)
    })
    .await;

    match finished {
        Ok((Ok(status), lines)) => {
            guard.disarm();
            let code = status.code();
            info!(
                program = %program,
                exit_code = ?code,
                success = status.success(),
                lines = lines.len(),
                "process exited"
            );
            ExecutionResult::completed(code, join_output(&lines))
        }
        Ok((Err(e), _)) => {
            error!(program = %program, error = %e, "failed waiting for process");
            guard.kill(&mut child);
            let _ = timeout(REAP_GRACE, child.wait()).await;
            guard.disarm();
            abort_all(readers);
            ExecutionResult::spawn_failure(&program, format!("waiting for process: {e}"))
        }
        Err(_elapsed) => {
            warn!(
                program = %program,
                budget_secs = budget.as_secs_f64(),
                "process exceeded its budget; killing process group"
            );
            guard.kill(&mut child);
            if timeout(REAP_GRACE, child.wait()).await.is_err() {
                warn!(program = %program, "killed process was not reaped in time");
            }
            guard.disarm();
            abort_all(readers);
            ExecutionResult::timeout(budget)
        }
    }
}

fn abort_all(readers: Vec<tokio::task::JoinHandle<()>>) {
    for reader in readers {
        reader.abort();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ExecutionRequest {
        ExecutionRequest::new(["sh", "-c", script]).unwrap()
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let exec = ProcessExecutor::new(Duration::from_secs(5));
        let result = exec.run(ExecutionRequest::new(["echo", "hello"]).unwrap()).await;

        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.output(), "hello");
        assert!(!result.timed_out());
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn merges_stderr_in_arrival_order() {
        let exec = ProcessExecutor::new(Duration::from_secs(5));
        let result = exec
            .run(sh("echo out1; echo err1 >&2; echo out2; echo err2 >&2"))
            .await;

        assert_eq!(result.output(), "out1\nerr1\nout2\nerr2");
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let exec = ProcessExecutor::new(Duration::from_secs(5));
        let result = exec.run(sh("echo failing >&2; exit 7")).await;

        assert_eq!(result.exit_code(), 7);
        assert_eq!(result.output(), "failing");
        assert!(!result.is_success());
        assert!(!result.timed_out());
    }

    #[tokio::test]
    async fn zero_budget_is_rejected() {
        let exec = ProcessExecutor::new(Duration::ZERO);
        let result = exec.run(ExecutionRequest::new(["true"]).unwrap()).await;

        assert_eq!(result.exit_code(), -1);
        assert!(!result.timed_out());
        assert!(result.output().contains("budget"));
    }

    #[tokio::test]
    async fn large_output_does_not_deadlock() {
        let exec = ProcessExecutor::new(Duration::from_secs(10));
        let result = exec
            .run(sh("i=0; while [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done"))
            .await;

        assert!(result.is_success(), "{result}");
        assert_eq!(result.output().lines().count(), 20000);
        assert!(result.output().ends_with("line-19999"));
    }
}
