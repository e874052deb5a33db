// SPDX-License-Identifier: MIT OR Apache-2.0
//! `tart run` options and the directory-mount token grammar.

use crate::ArgList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// DirMount
// ---------------------------------------------------------------------------

/// A host directory shared into the guest with `--dir`.
///
/// Serializes to `[name:]path[:options]` where `options` is a comma-joined
/// subset of `ro`, `tag=TAG` and `sync=MODE`, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirMount {
    /// Share name inside the guest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Host path (or archive URL).
    pub path: String,
    /// Mount read-only.
    pub read_only: bool,
    /// Custom virtiofs tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Caching mode, e.g. `full` or `none`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<String>,
}

impl DirMount {
    /// A mount of `path` with no name or options.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the share name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the mount read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the virtiofs tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the sync mode.
    #[must_use]
    pub fn sync(mut self, mode: impl Into<String>) -> Self {
        self.sync = Some(mode.into());
        self
    }

    /// The single `--dir` argument for this mount.
    pub fn to_token(&self) -> String {
        let mut token = String::new();
        if let Some(name) = non_empty(&self.name) {
            token.push_str(name);
            token.push(':');
        }
        token.push_str(&self.path);

        let mut options: Vec<String> = Vec::new();
        if self.read_only {
            options.push("ro".to_string());
        }
        if let Some(tag) = non_empty(&self.tag) {
            options.push(format!("tag={tag}"));
        }
        if let Some(sync) = non_empty(&self.sync) {
            options.push(format!("sync={sync}"));
        }
        if !options.is_empty() {
            token.push(':');
            token.push_str(&options.join(","));
        }
        token
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl fmt::Display for DirMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

/// Why a `--dir` token could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountParseError {
    /// The token (or its path segment) is empty.
    #[error("directory mount has an empty path")]
    EmptyPath,
    /// More colon-separated segments than `name:path:options`.
    #[error("too many ':' separated segments in `{0}`")]
    TooManySegments(String),
    /// An option other than `ro`, `tag=` or `sync=`.
    #[error("unknown directory mount option `{0}`")]
    UnknownOption(String),
}

impl FromStr for DirMount {
    type Err = MountParseError;

    /// Parse `[name:]path[:options]`. A trailing segment is treated as
    /// options only when every comma-separated item is a known option, so
    /// `name:path` stays a named mount. Paths containing `:` are not
    /// representable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments: Vec<&str> = s.split(':').collect();
        let mut mount = DirMount::default();

        if segments.len() > 1
            && let Some(last) = segments.last()
            && looks_like_options(last)
        {
            apply_options(&mut mount, last)?;
            segments.pop();
        }

        match segments.as_slice() {
            [path] => mount.path = (*path).to_string(),
            [name, path] => {
                mount.name = Some((*name).to_string()).filter(|n| !n.is_empty());
                mount.path = (*path).to_string();
            }
            [_, _, last] => return Err(MountParseError::UnknownOption((*last).to_string())),
            _ => return Err(MountParseError::TooManySegments(s.to_string())),
        }
        if mount.path.is_empty() {
            return Err(MountParseError::EmptyPath);
        }
        Ok(mount)
    }
}

fn looks_like_options(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .split(',')
            .all(|opt| opt == "ro" || opt.starts_with("tag=") || opt.starts_with("sync="))
}

fn apply_options(mount: &mut DirMount, segment: &str) -> Result<(), MountParseError> {
    for opt in segment.split(',') {
        if opt == "ro" {
            mount.read_only = true;
        } else if let Some(tag) = opt.strip_prefix("tag=") {
            mount.tag = Some(tag.to_string());
        } else if let Some(sync) = opt.strip_prefix("sync=") {
            mount.sync = Some(sync.to_string());
        } else {
            return Err(MountParseError::UnknownOption(opt.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

/// Options for `tart run`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunOptions {
    /// Do not open the VM window.
    pub no_graphics: bool,
    /// Attach a serial console to the terminal.
    pub serial: bool,
    /// Attach the serial console to this device instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_path: Option<String>,
    /// Disable audio pass-through.
    pub no_audio: bool,
    /// Disable clipboard sharing.
    pub no_clipboard: bool,
    /// Boot into recovery mode.
    pub recovery: bool,
    /// Expose the VM over VNC.
    pub vnc: bool,
    /// Use the experimental built-in VNC server.
    pub vnc_experimental: bool,
    /// Additional disk images, attached in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disk: Vec<String>,
    /// Rosetta share tag (Linux guests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rosetta: Option<String>,
    /// Shared directories, attached in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dir: Vec<DirMount>,
    /// Host interface to bridge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_bridged: Option<String>,
    /// Use Softnet networking.
    pub net_softnet: bool,
    /// Comma-separated CIDRs Softnet lets through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_softnet_allow: Option<String>,
    /// Host-only networking.
    pub net_host: bool,
    /// Root disk attachment options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_disk_opts: Option<String>,
    /// Allow the VM to be suspended.
    pub suspendable: bool,
    /// Forward system keys to the guest.
    pub capture_system_keys: bool,
}

/// `run [flags…] NAME`
pub fn run(name: &str, opts: &RunOptions) -> Vec<String> {
    ArgList::new("run")
        .flag("--no-graphics", opts.no_graphics)
        .flag("--serial", opts.serial)
        .value("--serial-path", opts.serial_path.as_deref())
        .flag("--no-audio", opts.no_audio)
        .flag("--no-clipboard", opts.no_clipboard)
        .flag("--recovery", opts.recovery)
        .flag("--vnc", opts.vnc)
        .flag("--vnc-experimental", opts.vnc_experimental)
        .repeated("--disk", &opts.disk)
        .value("--rosetta", opts.rosetta.as_deref())
        .repeated("--dir", opts.dir.iter().map(DirMount::to_token))
        .value("--net-bridged", opts.net_bridged.as_deref())
        .flag("--net-softnet", opts.net_softnet)
        .value("--net-softnet-allow", opts.net_softnet_allow.as_deref())
        .flag("--net-host", opts.net_host)
        .value("--root-disk-opts", opts.root_disk_opts.as_deref())
        .flag("--suspendable", opts.suspendable)
        .flag("--capture-system-keys", opts.capture_system_keys)
        .positional(name)
        .into_args()
}
