// SPDX-License-Identifier: MIT OR Apache-2.0
//! tart-args
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Typed options and pure argument builders for every tart subcommand.
//!
//! Each builder maps `(target, options)` to the argument list handed to the
//! tart executable, subcommand first and target last. Builders never spawn
//! anything and always produce the same output for the same input. Flags
//! left at their default value are omitted rather than passed empty.

mod arg_list;
mod query;
mod registry;
mod run;
mod vm;

pub use arg_list::ArgList;
pub use query::{IpOptions, IpResolver, ListOptions, VmSource, ip, list};
pub use registry::{LoginOptions, Password, PullOptions, PushOptions, login, logout, pull, push};
pub use run::{DirMount, MountParseError, RunOptions, run};
pub use vm::{
    CloneOptions, ConfigFormat, CreateOptions, Display, PruneEntries, PruneOptions, SetOptions,
    clone, create, delete, export, get, import, prune, rename, set, stop, suspend,
};
