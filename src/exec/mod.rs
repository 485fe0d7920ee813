// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs an external program with an argument vector and an environment
//! overlay, captures its merged stdout/stderr, and enforces a wall-clock
//! budget.
//!
//! - [`request`] holds the immutable [`ExecutionRequest`].
//! - [`result`] holds the [`ExecutionResult`] triple and its classification.
//! - [`executor`] owns [`ProcessExecutor`], the blocking and async entry
//!   points.
//! - [`pipe`] wires stdout and stderr into one capture stream.
//! - [`process_group`] isolates the child and kills its whole tree.
//! - [`backend`] provides the `ExecutorBackend` trait so callers can swap in
//!   a fake executor in tests.

pub mod backend;
pub mod executor;
mod pipe;
mod process_group;
pub mod request;
pub mod result;

pub use backend::ExecutorBackend;
pub use executor::ProcessExecutor;
pub use request::ExecutionRequest;
pub use result::{EXIT_FAILURE_SENTINEL, ExecutionResult};
