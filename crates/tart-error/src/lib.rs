// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for the tart control client.
//!
//! Every failure produced by the client is a [`TartError`]. Each variant maps
//! onto a stable [`ErrorKind`] so callers can branch on the class of failure
//! (was the process ever started? did it exit non-zero? was its output
//! garbage?) without matching on message text.
//!
//! Errors raised by an operation are wrapped in [`TartError::Context`] naming
//! the operation and the VM it targeted; [`TartError::kind`] and
//! [`TartError::stderr`] look through that wrapping.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::ExitStatus;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Broad class of a [`TartError`].
///
/// Serialises to a `SCREAMING_SNAKE_CASE` string that does not change across
/// patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Detected before any process was spawned.
    PreconditionFailed,
    /// The OS could not create the child process.
    LaunchFailed,
    /// The child ran and exited unsuccessfully.
    ExternalCommandFailed,
    /// Reading the child's output failed with something other than EOF.
    StreamReadFailed,
    /// The stdin payload could not be delivered to the child.
    StdinWriteFailed,
    /// The child succeeded but its output did not match the expected shape.
    DecodeFailed,
}

impl ErrorKind {
    /// Stable `&'static str` representation (e.g. `"LAUNCH_FAILED"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreconditionFailed => "PRECONDITION_FAILED",
            Self::LaunchFailed => "LAUNCH_FAILED",
            Self::ExternalCommandFailed => "EXTERNAL_COMMAND_FAILED",
            Self::StreamReadFailed => "STREAM_READ_FAILED",
            Self::StdinWriteFailed => "STDIN_WRITE_FAILED",
            Self::DecodeFailed => "DECODE_FAILED",
        }
    }

    /// Returns `true` when no subprocess was ever started for this failure.
    pub fn is_pre_spawn(&self) -> bool {
        matches!(self, Self::PreconditionFailed | Self::LaunchFailed)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExitInfo
// ---------------------------------------------------------------------------

/// How a child process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExitInfo {
    /// Exit code, when the process exited normally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Terminating signal, when the process was killed by one (unix only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
}

impl ExitInfo {
    /// An exit with the given code.
    pub fn code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    /// Returns `true` for a zero exit code.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitInfo {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(sig)) => write!(f, "signal {sig}"),
            (None, None) => f.write_str("unknown exit status"),
        }
    }
}

// ---------------------------------------------------------------------------
// TartError
// ---------------------------------------------------------------------------

/// Errors from building, running, and decoding tart invocations.
#[derive(Debug, thiserror::Error)]
pub enum TartError {
    /// A precondition did not hold; nothing was spawned.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// The executable could not be started.
    #[error("failed to launch {program}: {source}")]
    LaunchFailed {
        /// Program that was being spawned.
        program: String,
        /// OS error returned by spawn.
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully.
    #[error("`tart {subcommand}` failed with {exit}: {}", .stderr.trim())]
    ExternalCommandFailed {
        /// Subcommand (first argument) of the failed invocation.
        subcommand: String,
        /// How the process terminated.
        exit: ExitInfo,
        /// Everything the process wrote to stderr, verbatim.
        stderr: String,
    },

    /// Reading child output failed.
    #[error("failed to read tart {stream}: {source}")]
    StreamReadFailed {
        /// `"stdout"` or `"stderr"`.
        stream: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the stdin payload failed.
    #[error("failed to write tart stdin: {0}")]
    StdinWriteFailed(#[source] std::io::Error),

    /// Output did not match the expected schema.
    #[error("failed to decode tart output: {reason}")]
    DecodeFailed {
        /// Human-readable decode failure detail.
        reason: String,
    },

    /// A failure annotated with the operation and VM it belongs to.
    #[error("{op} {}: {source}", .target.as_deref().unwrap_or("-"))]
    Context {
        /// Operation name, e.g. `"create"`.
        op: &'static str,
        /// VM (or registry) the operation targeted.
        target: Option<String>,
        /// Wrapped failure.
        #[source]
        source: Box<TartError>,
    },
}

/// Convenience alias used across the tart crates.
pub type TartResult<T> = Result<T, TartError>;

impl TartError {
    /// Build a [`TartError::PreconditionFailed`].
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    /// Build a [`TartError::DecodeFailed`].
    pub fn decode(reason: impl fmt::Display) -> Self {
        Self::DecodeFailed {
            reason: reason.to_string(),
        }
    }

    /// Wrap `self` with the operation name and target VM.
    ///
    /// Already-wrapped errors are not wrapped twice.
    pub fn context(self, op: &'static str, target: Option<&str>) -> Self {
        match self {
            ctx @ Self::Context { .. } => ctx,
            other => Self::Context {
                op,
                target: target.map(str::to_owned),
                source: Box::new(other),
            },
        }
    }

    /// Stable class of this error, looking through [`TartError::Context`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            Self::LaunchFailed { .. } => ErrorKind::LaunchFailed,
            Self::ExternalCommandFailed { .. } => ErrorKind::ExternalCommandFailed,
            Self::StreamReadFailed { .. } => ErrorKind::StreamReadFailed,
            Self::StdinWriteFailed(_) => ErrorKind::StdinWriteFailed,
            Self::DecodeFailed { .. } => ErrorKind::DecodeFailed,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Captured stderr of a failed command, if this error carries one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ExternalCommandFailed { stderr, .. } => Some(stderr),
            Self::Context { source, .. } => source.stderr(),
            _ => None,
        }
    }

    /// Exit information of a failed command, if this error carries one.
    pub fn exit(&self) -> Option<ExitInfo> {
        match self {
            Self::ExternalCommandFailed { exit, .. } => Some(*exit),
            Self::Context { source, .. } => source.exit(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TartError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
