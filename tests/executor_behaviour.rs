#![cfg(unix)]

mod common;
use crate::common::{init_tracing, sh, with_timeout};

use std::os::unix::fs::PermissionsExt;
use std::time::{Duration, Instant};

use serial_test::{parallel, serial};
use tempfile::TempDir;

use cliprobe::errors::ExecutionFailure;
use cliprobe::exec::{EXIT_FAILURE_SENTINEL, ExecutionRequest, ProcessExecutor};

fn executor(secs: u64) -> ProcessExecutor {
    ProcessExecutor::new(Duration::from_secs(secs))
}

#[test]
#[parallel]
fn echo_hello_succeeds() {
    init_tracing();
    let result = executor(5).execute(ExecutionRequest::new(["echo", "hello"]).unwrap());

    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.output(), "hello");
    assert!(!result.timed_out());
}

#[test]
#[parallel]
fn sleep_past_budget_times_out() {
    init_tracing();
    let started = Instant::now();
    let result = executor(1).execute(ExecutionRequest::new(["sleep", "10"]).unwrap());

    assert!(result.timed_out());
    assert_eq!(result.exit_code(), EXIT_FAILURE_SENTINEL);
    assert_eq!(result.output(), "Command timeout after 1 seconds");
    assert_eq!(
        result.failure(),
        Some(&ExecutionFailure::TimeoutExceeded {
            budget: Duration::from_secs(1)
        })
    );
    assert!(
        started.elapsed() < Duration::from_secs(6),
        "timeout took {:?}",
        started.elapsed()
    );
}

#[cfg(target_os = "linux")]
#[test]
#[parallel]
fn timeout_kills_descendants() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("grandchild.pid");

    let script = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());
    let result = executor(1).execute(sh(&script));
    assert!(result.timed_out());

    let pid: u32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!(
        common::wait_until_dead(pid, 3),
        "grandchild {pid} survived the timeout"
    );
}

#[test]
#[parallel]
fn background_holder_of_output_counts_as_timeout() {
    init_tracing();
    // The shell exits at once, but its child keeps the output pipe open.
    let result = executor(1).execute(sh("sleep 10 & echo started"));

    assert!(result.timed_out());
    assert_eq!(result.exit_code(), EXIT_FAILURE_SENTINEL);
}

#[test]
#[parallel]
fn missing_program_is_spawn_failure() {
    init_tracing();
    let result =
        executor(5).execute(ExecutionRequest::new(["/definitely/not/a/real/program"]).unwrap());

    assert_eq!(result.exit_code(), EXIT_FAILURE_SENTINEL);
    assert!(!result.timed_out());
    assert!(result.output().starts_with("Failed to start"));
    assert!(result.output().contains("/definitely/not/a/real/program"));
    assert!(matches!(
        result.failure(),
        Some(ExecutionFailure::SpawnFailure { .. })
    ));
}

#[test]
#[parallel]
fn non_executable_file_is_spawn_failure() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("not-executable.sh");
    std::fs::write(&script, "#!/bin/sh\necho nope\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

    let result = executor(5).execute(ExecutionRequest::new([script.display().to_string()]).unwrap());

    assert_eq!(result.exit_code(), EXIT_FAILURE_SENTINEL);
    assert!(!result.timed_out());
    assert!(matches!(
        result.failure(),
        Some(ExecutionFailure::SpawnFailure { .. })
    ));
}

#[test]
#[parallel]
fn arguments_are_passed_verbatim() {
    let result = executor(5).execute(
        ExecutionRequest::new(["printf", "%s|", "a b", "$HOME", "--flag=x"]).unwrap(),
    );

    assert_eq!(result.output(), "a b|$HOME|--flag=x|");
}

#[test]
#[parallel]
fn path_is_inherited() {
    let result = executor(5).execute(sh("printf %s \"$PATH\""));

    assert_eq!(result.output(), std::env::var("PATH").unwrap_or_default());
}

#[test]
#[parallel]
fn empty_overlay_value_is_set_not_unset() {
    let result = executor(5).execute(
        sh("if [ -z \"${PROBE_EMPTY+x}\" ]; then echo unset; else echo \"set:$PROBE_EMPTY\"; fi")
            .env("PROBE_EMPTY", ""),
    );

    assert_eq!(result.output(), "set:");
}

#[test]
#[serial]
#[allow(unsafe_code)]
fn overlay_wins_over_parent_environment() {
    // SERIAL TEST: modifies the process environment.
    unsafe { std::env::set_var("CLIPROBE_OVERLAY_PROBE", "from-parent") };

    let inherited = executor(5).execute(sh("printf %s \"$CLIPROBE_OVERLAY_PROBE\""));
    let overridden = executor(5).execute(
        sh("printf %s \"$CLIPROBE_OVERLAY_PROBE\"").env("CLIPROBE_OVERLAY_PROBE", "from-overlay"),
    );

    unsafe { std::env::remove_var("CLIPROBE_OVERLAY_PROBE") };

    assert_eq!(inherited.output(), "from-parent");
    assert_eq!(overridden.output(), "from-overlay");
}

#[test]
#[parallel]
fn output_trailing_whitespace_is_trimmed() {
    let result = executor(5).execute(sh("printf 'line one\\nline two\\n\\n   \\n'"));

    assert_eq!(result.output(), "line one\nline two");
}

#[test]
#[parallel]
fn concurrent_executions_are_independent() {
    init_tracing();
    let exec = executor(5);

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                scope.spawn(move || {
                    exec.execute(sh(&format!("sleep 0.2; echo worker-{i}")))
                        .output()
                        .to_string()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outputs, ["worker-0", "worker-1", "worker-2", "worker-3"]);
}

#[tokio::test]
#[parallel]
async fn blocking_execute_inside_runtime() {
    init_tracing();
    let result = executor(5).execute(ExecutionRequest::new(["echo", "nested"]).unwrap());

    assert_eq!(result.output(), "nested");
}

#[tokio::test]
#[parallel]
async fn async_run_times_out() {
    init_tracing();
    let exec = executor(5);
    let result = with_timeout(
        10,
        exec.run_with_budget(sh("echo before; sleep 10"), Duration::from_millis(500)),
    )
    .await;

    assert!(result.timed_out());
    assert_eq!(result.output(), "Command timeout after 0.5 seconds");
}
