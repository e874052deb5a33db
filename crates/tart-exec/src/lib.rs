// SPDX-License-Identifier: MIT OR Apache-2.0
//! tart-exec
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Process execution for the tart CLI.
//!
//! An [`Invocation`] is run either to completion with
//! [`ProcessRunner::capture`], producing an [`ExecutionResult`], or until a
//! readiness marker shows up on stdout with [`ProcessRunner::watch`]. The
//! [`Executor`] trait is the seam the client talks to, so its logic can be
//! exercised without spawning anything.

mod invocation;
mod result;
mod runner;
mod watch;

pub use invocation::Invocation;
pub use result::ExecutionResult;
pub use runner::ProcessRunner;
pub use watch::{READY_MARKER, Readiness, RunningVm};

pub use tart_error::{ErrorKind, ExitInfo, TartError, TartResult};

use async_trait::async_trait;

/// Something that can execute tart invocations.
#[async_trait]
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run to completion, failing on a non-zero exit.
    async fn capture(&self, invocation: &Invocation) -> TartResult<ExecutionResult>;

    /// Run until a stdout line contains `marker`, or until exit.
    async fn watch(&self, invocation: &Invocation, marker: &str) -> TartResult<Readiness>;
}

#[async_trait]
impl Executor for ProcessRunner {
    async fn capture(&self, invocation: &Invocation) -> TartResult<ExecutionResult> {
        ProcessRunner::capture(self, invocation).await
    }

    async fn watch(&self, invocation: &Invocation, marker: &str) -> TartResult<Readiness> {
        ProcessRunner::watch(self, invocation, marker).await
    }
}
