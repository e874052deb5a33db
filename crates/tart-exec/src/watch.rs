// SPDX-License-Identifier: MIT OR Apache-2.0
//! Readiness detection for long-running invocations (`tart run`).
//!
//! The child of `tart run` supervises the VM for as long as it runs, so its
//! exit cannot be the success signal. Instead stdout is scanned line by line
//! for a readiness marker. Two stages, in order:
//!
//! 1. scan stdout until the marker appears or the stream hits EOF;
//! 2. only on EOF, wait for the exit status.
//!
//! Stderr is drained for the whole lifetime of the child so a chatty VM can
//! never block on a full pipe.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, trace, warn};

use tart_error::{ExitInfo, TartError, TartResult};

use crate::runner::{feed_stdin, require_subcommand, take_pipes, wait_exit};
use crate::{ExecutionResult, Invocation, ProcessRunner};

/// Line tart prints on stdout once the guest is running.
pub const READY_MARKER: &str = "VM is up";

/// Upper bound on stderr kept for diagnostics.
const STDERR_CAPTURE_LIMIT: usize = 64 * 1024;

/// Outcome of a readiness watch.
#[derive(Debug)]
pub enum Readiness {
    /// The marker appeared; the process keeps running in the background.
    Ready(RunningVm),
    /// Stdout closed without the marker and the process exited successfully.
    Exited(ExecutionResult),
}

/// A tart process that reported readiness and is still running.
///
/// Dropping this handle does not stop the VM; its output keeps being drained
/// by a background task until the process exits.
#[derive(Debug)]
pub struct RunningVm {
    pid: Option<u32>,
    exit: JoinHandle<TartResult<ExitInfo>>,
}

impl RunningVm {
    /// Wrap a supervising task. `exit` resolves once the process has exited.
    pub fn new(pid: Option<u32>, exit: JoinHandle<TartResult<ExitInfo>>) -> Self {
        Self { pid, exit }
    }

    /// OS process id of the supervising tart process.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Returns `true` once the process has exited.
    pub fn is_finished(&self) -> bool {
        self.exit.is_finished()
    }

    /// Wait for the VM process to exit.
    pub async fn wait(self) -> TartResult<ExitInfo> {
        self.exit
            .await
            .map_err(|e| join_failure("exit status", e))?
    }
}

impl ProcessRunner {
    /// Execute `invocation`, returning as soon as a stdout line contains
    /// `marker`.
    ///
    /// If stdout reaches EOF first, the exit status decides between
    /// [`Readiness::Exited`] and [`TartError::ExternalCommandFailed`]. A read
    /// error other than EOF fails immediately with
    /// [`TartError::StreamReadFailed`].
    pub async fn watch(&self, invocation: &Invocation, marker: &str) -> TartResult<Readiness> {
        let subcommand = require_subcommand(invocation)?.to_string();
        let mut child = self.spawn(invocation)?;
        let (stdin, stdout, stderr) = take_pipes(&mut child)?;

        if let Some(input) = invocation.input().map(<[u8]>::to_vec) {
            tokio::spawn(async move {
                if let Err(e) = feed_stdin(stdin, Some(&input)).await {
                    warn!(target: "tart.exec", "{e}");
                }
            });
        }

        let stderr_task = tokio::spawn(drain_stderr(stderr));
        let mut stdout = BufReader::new(stdout);
        let mut seen = Vec::new();

        match scan_for_marker(&mut stdout, marker, &mut seen).await {
            Ok(Scan::Marker) => {
                let pid = child.id();
                info!(target: "tart.exec", %subcommand, ?pid, "tart reported ready");
                let exit = tokio::spawn(supervise(child, stdout, stderr_task, subcommand));
                return Ok(Readiness::Ready(RunningVm::new(pid, exit)));
            }
            Ok(Scan::Eof) => {}
            Err(err) => {
                stderr_task.abort();
                let _ = child.start_kill();
                return Err(err);
            }
        }

        debug!(target: "tart.exec", %subcommand, "stdout closed before readiness marker");
        let stderr = stderr_task
            .await
            .map_err(|e| join_failure("stderr", e))??;
        let exit = wait_exit(&mut child).await?;

        ExecutionResult {
            stdout: seen,
            stderr,
            exit,
        }
        .into_checked(&subcommand)
        .map(Readiness::Exited)
    }
}

/// How a stdout scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    /// A line containing the marker was read.
    Marker,
    /// The stream closed without the marker.
    Eof,
}

/// Read `reader` line by line until a line contains `marker` or the stream
/// ends. Every line read, the marker line included, is appended to `seen`.
/// A read error stops the scan at once.
pub(crate) async fn scan_for_marker<R>(
    reader: &mut R,
    marker: &str,
    seen: &mut Vec<u8>,
) -> TartResult<Scan>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|source| TartError::StreamReadFailed {
                stream: "stdout",
                source,
            })?;
        if n == 0 {
            return Ok(Scan::Eof);
        }
        seen.extend_from_slice(&line);

        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end();
        trace!(target: "tart.stdout", "{text}");
        if text.contains(marker) {
            return Ok(Scan::Marker);
        }
    }
}

/// Keep draining a ready VM's output and report how it eventually exits.
async fn supervise(
    mut child: Child,
    mut stdout: BufReader<ChildStdout>,
    stderr_task: JoinHandle<TartResult<Vec<u8>>>,
    subcommand: String,
) -> TartResult<ExitInfo> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = stdout
            .read_until(b'\n', &mut line)
            .await
            .map_err(|source| TartError::StreamReadFailed {
                stream: "stdout",
                source,
            })?;
        if n == 0 {
            break;
        }
        trace!(target: "tart.stdout", "{}", String::from_utf8_lossy(&line).trim_end());
    }

    let stderr = stderr_task
        .await
        .map_err(|e| join_failure("stderr", e))??;
    let exit = wait_exit(&mut child).await?;
    debug!(target: "tart.exec", %subcommand, %exit, "tart exited after readiness");

    if exit.success() {
        Ok(exit)
    } else {
        Err(TartError::ExternalCommandFailed {
            subcommand,
            exit,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

async fn drain_stderr(stderr: ChildStderr) -> TartResult<Vec<u8>> {
    let mut reader = BufReader::new(stderr);
    let mut captured = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|source| TartError::StreamReadFailed {
                stream: "stderr",
                source,
            })?;
        if n == 0 {
            return Ok(captured);
        }
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end();
        if !text.is_empty() {
            debug!(target: "tart.stderr", "{text}");
        }
        let room = STDERR_CAPTURE_LIMIT.saturating_sub(captured.len());
        captured.extend_from_slice(&line[..line.len().min(room)]);
    }
}

fn join_failure(stream: &'static str, err: JoinError) -> TartError {
    TartError::StreamReadFailed {
        stream,
        source: std::io::Error::other(err),
    }
}
