// SPDX-License-Identifier: MIT OR Apache-2.0
//! tart-control
#![deny(unsafe_code)]
//!
//! Facade over the tart control crates. Most callers only need [`Tart`]
//! and the option types; the member crates are re-exported for callers that
//! want to build invocations or run them through their own executor.

pub use tart_args as args;
pub use tart_config as config;
pub use tart_error as error;
pub use tart_exec as exec;
pub use tart_which as which;

pub use tart_client::*;
