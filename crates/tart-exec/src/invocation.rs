// SPDX-License-Identifier: MIT OR Apache-2.0
//! The fully-built command handed to a runner.

use std::collections::BTreeMap;

/// A ready-to-execute tart command: arguments, environment overlay, and an
/// optional stdin payload.
///
/// `args[0]` is the tart subcommand (`list`, `run`, …).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
    env: BTreeMap<String, String>,
    stdin: Option<Vec<u8>>,
}

impl Invocation {
    /// Create an invocation from an argument list.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            stdin: None,
        }
    }

    /// Add environment variables applied on top of the inherited environment.
    #[must_use]
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Bytes written to the child's stdin, after which stdin is closed.
    #[must_use]
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// The subcommand, or `None` for an empty argument list.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// All arguments, subcommand first.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The environment overlay.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// The stdin payload, if any.
    pub fn input(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }
}
