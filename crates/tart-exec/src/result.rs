// SPDX-License-Identifier: MIT OR Apache-2.0
//! Captured output of a finished invocation.

use tart_error::{ExitInfo, TartError, TartResult};

/// Everything a finished tart process produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Raw stdout bytes.
    pub stdout: Vec<u8>,
    /// Raw stderr bytes.
    pub stderr: Vec<u8>,
    /// How the process terminated.
    pub exit: ExitInfo,
}

impl ExecutionResult {
    /// Returns `true` when the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit.success()
    }

    /// Stdout as UTF-8 text.
    pub fn stdout_text(&self) -> TartResult<&str> {
        std::str::from_utf8(&self.stdout)
            .map_err(|e| TartError::decode(format!("stdout is not valid UTF-8: {e}")))
    }

    /// Stderr, lossily decoded.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Turn a non-zero exit into [`TartError::ExternalCommandFailed`].
    pub fn into_checked(self, subcommand: &str) -> TartResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(TartError::ExternalCommandFailed {
                subcommand: subcommand.to_string(),
                exit: self.exit,
                stderr: self.stderr_lossy(),
            })
        }
    }
}
