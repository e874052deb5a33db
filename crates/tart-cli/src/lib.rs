// SPDX-License-Identifier: MIT OR Apache-2.0
//! Library half of the `tartctl` binary, split out so the argument
//! definitions, command helpers and formatters can be tested directly.
#![deny(unsafe_code)]

pub mod args;
pub mod commands;
pub mod format;
