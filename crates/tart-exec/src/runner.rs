// SPDX-License-Identifier: MIT OR Apache-2.0
//! Spawning the tart executable and collecting its output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tracing::debug;

use tart_error::{ExitInfo, TartError, TartResult};

use crate::{ExecutionResult, Invocation};

/// Runs invocations against one tart executable.
///
/// Each call owns its own child process, pipes, and buffers; a runner can be
/// shared freely between concurrent calls.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    prefix: Vec<OsString>,
}

impl ProcessRunner {
    /// A runner spawning `program` directly.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
        }
    }

    /// Arguments inserted before every invocation's own arguments, for
    /// launchers such as `arch -arm64 tart` or an interpreter running a
    /// wrapper script.
    #[must_use]
    pub fn with_prefix<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.prefix = args.into_iter().map(Into::into).collect();
        self
    }

    /// The executable this runner spawns.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Execute `invocation` to completion.
    ///
    /// Stdout and stderr are drained concurrently; the exit status is read
    /// only after both have reached EOF.
    pub async fn capture(&self, invocation: &Invocation) -> TartResult<ExecutionResult> {
        let subcommand = require_subcommand(invocation)?;
        let mut child = self.spawn(invocation)?;
        let (stdin, stdout, stderr) = take_pipes(&mut child)?;

        let drained = tokio::try_join!(
            read_all(stdout, "stdout"),
            read_all(stderr, "stderr"),
            feed_stdin(stdin, invocation.input()),
        );
        let (stdout, stderr, ()) = match drained {
            Ok(parts) => parts,
            Err(err) => {
                let _ = child.start_kill();
                return Err(err);
            }
        };

        let exit = wait_exit(&mut child).await?;
        debug!(
            target: "tart.exec",
            subcommand,
            %exit,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "tart exited"
        );

        ExecutionResult {
            stdout,
            stderr,
            exit,
        }
        .into_checked(subcommand)
    }

    pub(crate) fn spawn(&self, invocation: &Invocation) -> TartResult<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix)
            .args(invocation.args())
            .envs(invocation.env())
            .stdin(if invocation.input().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            target: "tart.exec",
            program = %self.program.display(),
            args = ?invocation.args(),
            "spawning tart"
        );

        cmd.spawn().map_err(|source| TartError::LaunchFailed {
            program: self.program.display().to_string(),
            source,
        })
    }
}

pub(crate) fn require_subcommand(invocation: &Invocation) -> TartResult<&str> {
    invocation
        .subcommand()
        .ok_or_else(|| TartError::precondition("invocation has no subcommand"))
}

pub(crate) type Pipes = (
    Option<ChildStdin>,
    tokio::process::ChildStdout,
    tokio::process::ChildStderr,
);

pub(crate) fn take_pipes(child: &mut Child) -> TartResult<Pipes> {
    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;
    Ok((child.stdin.take(), stdout, stderr))
}

fn missing_pipe(stream: &'static str) -> TartError {
    TartError::StreamReadFailed {
        stream,
        source: std::io::Error::other(format!("{stream} unavailable")),
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R, stream: &'static str) -> TartResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|source| TartError::StreamReadFailed { stream, source })?;
    Ok(buf)
}

/// Write `input` to the child and close its stdin.
///
/// A child that exits without reading its input is not an error here; its
/// exit status decides the outcome.
pub(crate) async fn feed_stdin(stdin: Option<ChildStdin>, input: Option<&[u8]>) -> TartResult<()> {
    let (Some(mut stdin), Some(input)) = (stdin, input) else {
        return Ok(());
    };
    let written = async {
        stdin.write_all(input).await?;
        stdin.flush().await
    }
    .await;
    match written {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            debug!(target: "tart.exec", "tart closed stdin before reading its input");
            Ok(())
        }
        Err(e) => Err(TartError::StdinWriteFailed(e)),
    }
}

pub(crate) async fn wait_exit(child: &mut Child) -> TartResult<ExitInfo> {
    child
        .wait()
        .await
        .map(ExitInfo::from)
        .map_err(|source| TartError::StreamReadFailed {
            stream: "exit status",
            source,
        })
}
