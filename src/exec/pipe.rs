// src/exec/pipe.rs

//! Merged stdout/stderr capture.
//!
//! On unix both streams of the child are pointed at the write end of a single
//! OS pipe, so the bytes arrive in exactly the order the child wrote them.
//! Elsewhere the two streams are piped separately and drained concurrently
//! into the same channel.
//!
//! Every captured line is sent over an unbounded channel, so the child never
//! blocks on a full pipe while the executor is waiting for it to exit.

use std::io;
#[cfg(unix)]
use std::os::fd::OwnedFd;
#[cfg(not(unix))]
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Output plumbing configured on a [`Command`] before it is spawned.
pub(crate) struct OutputWiring {
    #[cfg(unix)]
    read_end: OwnedFd,
}

/// Route the command's stdout and stderr into one capture channel.
///
/// The command keeps copies of the pipe's write end until it is dropped; drop
/// it right after spawning or the reader never sees end-of-file.
#[cfg(unix)]
pub(crate) fn wire(cmd: &mut Command) -> io::Result<OutputWiring> {
    let (read_end, write_end) = cloexec_pipe()?;
    cmd.stdout(write_end.try_clone()?);
    cmd.stderr(write_end);
    Ok(OutputWiring { read_end })
}

#[cfg(not(unix))]
pub(crate) fn wire(cmd: &mut Command) -> io::Result<OutputWiring> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    Ok(OutputWiring {})
}

impl OutputWiring {
    /// Spawn the reader task(s) that forward captured lines into `tx`.
    #[cfg(unix)]
    pub(crate) fn start_readers(
        self,
        _child: &mut Child,
        tx: mpsc::UnboundedSender<String>,
    ) -> io::Result<Vec<JoinHandle<()>>> {
        let receiver = tokio::net::unix::pipe::Receiver::from_owned_fd(self.read_end)?;
        Ok(vec![tokio::spawn(forward_lines(receiver, tx))])
    }

    #[cfg(not(unix))]
    pub(crate) fn start_readers(
        self,
        child: &mut Child,
        tx: mpsc::UnboundedSender<String>,
    ) -> io::Result<Vec<JoinHandle<()>>> {
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, tx)));
        }
        Ok(readers)
    }
}

/// Both ends close-on-exec so concurrent spawns never inherit each other's
/// pipes. The child's own stdout/stderr are dup'd copies and stay open.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly",
    target_os = "illumos",
))]
fn cloexec_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::OFlag;

    Ok(nix::unistd::pipe2(OFlag::O_CLOEXEC)?)
}

#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly",
        target_os = "illumos",
    ))
))]
fn cloexec_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    use std::os::fd::AsRawFd;

    use nix::fcntl::{FcntlArg, FdFlag, fcntl};

    let (read_end, write_end) = nix::unistd::pipe()?;
    for fd in [&read_end, &write_end] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((read_end, write_end))
}

/// Read `reader` line by line until end-of-file, forwarding each line.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&buf);
                trace!(line = %line, "captured output line");
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(error = %e, "output stream read failed; stopping capture");
                break;
            }
        }
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Join captured lines with `\n` and trim trailing whitespace.
pub(crate) fn join_output(lines: &[String]) -> String {
    let mut joined = lines.join("\n");
    joined.truncate(joined.trim_end().len());
    joined
}
