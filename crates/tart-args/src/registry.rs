// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for OCI registry subcommands.

use crate::ArgList;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registry password. Never printed by `Debug` and never serialized.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wrap a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The secret itself.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Options for `tart login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginOptions {
    /// Registry user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password delivered on stdin; presence adds `--password-stdin`.
    #[serde(skip_serializing)]
    pub password: Option<Password>,
    /// Connect over plain HTTP.
    pub insecure: bool,
    /// Skip credential validation.
    pub no_validate: bool,
}

impl LoginOptions {
    /// Password bytes to write to the child's stdin, if any.
    pub fn stdin_payload(&self) -> Option<Vec<u8>> {
        self.password
            .as_ref()
            .map(|p| p.expose().as_bytes().to_vec())
    }
}

/// `login [--username U] [--password-stdin] [--insecure] [--no-validate] HOST`
pub fn login(host: &str, opts: &LoginOptions) -> Vec<String> {
    ArgList::new("login")
        .value("--username", opts.username.as_deref())
        .flag("--password-stdin", opts.password.is_some())
        .flag("--insecure", opts.insecure)
        .flag("--no-validate", opts.no_validate)
        .positional(host)
        .into_args()
}

/// `logout HOST`
pub fn logout(host: &str) -> Vec<String> {
    ArgList::new("logout").positional(host).into_args()
}

/// Options for `tart push`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PushOptions {
    /// Remote references to push to, in order.
    pub remote_names: Vec<String>,
    /// Connect over plain HTTP.
    pub insecure: bool,
    /// Network concurrency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
    /// Layer chunk size in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
    /// Also store the pushed image in the local OCI cache.
    pub populate_cache: bool,
}

/// `push [--insecure] [--concurrency N] [--chunk-size N] [--populate-cache] NAME REMOTE…`
pub fn push(name: &str, opts: &PushOptions) -> Vec<String> {
    let mut args = ArgList::new("push")
        .flag("--insecure", opts.insecure)
        .number("--concurrency", opts.concurrency)
        .number("--chunk-size", opts.chunk_size)
        .flag("--populate-cache", opts.populate_cache)
        .positional(name);
    for remote in &opts.remote_names {
        args = args.positional(remote.as_str());
    }
    args.into_args()
}

/// Options for `tart pull`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PullOptions {
    /// Connect over plain HTTP.
    pub insecure: bool,
    /// Network concurrency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
}

/// `pull [--insecure] [--concurrency N] NAME`
pub fn pull(name: &str, opts: &PullOptions) -> Vec<String> {
    ArgList::new("pull")
        .flag("--insecure", opts.insecure)
        .number("--concurrency", opts.concurrency)
        .positional(name)
        .into_args()
}
