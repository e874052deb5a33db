// SPDX-License-Identifier: MIT OR Apache-2.0
//! tart-client
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Typed async client for the `tart` VM CLI.
//!
//! [`Tart`] turns each operation into a tart invocation, checks the
//! preconditions tart itself would only report late (a name already taken, a
//! VM already running), runs the invocation through an [`Executor`] and
//! decodes the output into [`VmState`] records or trimmed text.
//!
//! ```no_run
//! # async fn demo() -> tart_client::TartResult<()> {
//! use tart_client::{Tart, TartConfig, RunOptions, Readiness};
//!
//! let tart = Tart::new(&TartConfig::default())?;
//! if let Readiness::Ready(vm) = tart.run("dev", &RunOptions::default()).await? {
//!     println!("dev is up (pid {:?})", vm.pid());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod vm_state;

pub use client::Tart;
pub use vm_state::{VmState, VmStatus, decode_list, decode_text};

pub use tart_args::{
    CloneOptions, ConfigFormat, CreateOptions, DirMount, Display, IpOptions, IpResolver,
    ListOptions, LoginOptions, Password, PruneEntries, PruneOptions, PullOptions, PushOptions,
    RunOptions, SetOptions, VmSource,
};
pub use tart_config::{TartConfig, TartEnv};
pub use tart_error::{ErrorKind, ExitInfo, TartError, TartResult};
pub use tart_exec::{ExecutionResult, Executor, Invocation, Readiness, RunningVm};
