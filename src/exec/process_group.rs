// src/exec/process_group.rs

//! Process-group isolation so a timed-out child takes its descendants with
//! it.
//!
//! On unix the child becomes the leader of a fresh process group
//! (`pgid == pid`) and termination signals the whole group. Other platforms
//! only kill the direct child through Tokio.

use tokio::process::{Child, Command};
use tracing::{debug, trace};

/// Make the child lead its own process group.
pub(crate) fn isolate(cmd: &mut Command) {
    #[cfg(unix)]
    cmd.process_group(0);
    #[cfg(not(unix))]
    let _ = cmd;
}

/// Kills the child's process group when dropped, unless disarmed.
///
/// Covers every exit path of an execution, including the future being
/// dropped part-way through.
#[derive(Debug)]
pub(crate) struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    pub(crate) fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    /// SIGKILL every process in the group, then the direct child as a
    /// fallback.
    pub(crate) fn kill(&self, child: &mut Child) {
        self.kill_group();
        if let Err(e) = child.start_kill() {
            trace!(error = %e, "direct child already gone");
        }
    }

    /// Stop guarding; the group is left alone on drop.
    pub(crate) fn disarm(mut self) {
        self.pgid = None;
    }

    #[cfg(unix)]
    fn kill_group(&self) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Some(pgid) = self.pgid else {
            return;
        };

        #[allow(clippy::cast_possible_wrap)]
        let group = Pid::from_raw(pgid as i32);
        match killpg(group, Signal::SIGKILL) {
            Ok(()) => debug!(pgid, "sent SIGKILL to process group"),
            Err(e) => trace!(pgid, error = %e, "process group already gone"),
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if self.pgid.is_some() {
            self.kill_group();
        }
    }
}
