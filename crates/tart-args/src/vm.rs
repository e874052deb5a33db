// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for local VM lifecycle and configuration subcommands.

use crate::ArgList;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// create / clone
// ---------------------------------------------------------------------------

/// Options for `tart create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOptions {
    /// Restore image to install macOS from (path or URL, or `latest`).
    #[serde(rename = "fromIPSW", skip_serializing_if = "Option::is_none")]
    pub from_ipsw: Option<String>,
    /// Create an empty Linux VM.
    pub linux: bool,
    /// Disk size in GB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<u32>,
}

/// `create [--from-ipsw P] [--linux] [--disk-size N] NAME`
pub fn create(name: &str, opts: &CreateOptions) -> Vec<String> {
    ArgList::new("create")
        .value("--from-ipsw", opts.from_ipsw.as_deref())
        .flag("--linux", opts.linux)
        .number("--disk-size", opts.disk_size)
        .positional(name)
        .into_args()
}

/// Options for `tart clone`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloneOptions {
    /// Connect to an OCI source over plain HTTP.
    pub insecure: bool,
    /// Network concurrency when the source is remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
}

/// `clone [--insecure] [--concurrency N] SRC NEW`
pub fn clone(source: &str, new_name: &str, opts: &CloneOptions) -> Vec<String> {
    ArgList::new("clone")
        .flag("--insecure", opts.insecure)
        .number("--concurrency", opts.concurrency)
        .positional(source)
        .positional(new_name)
        .into_args()
}

// ---------------------------------------------------------------------------
// set / get
// ---------------------------------------------------------------------------

/// Display resolution in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Display {
    /// Both dimensions are set.
    pub fn is_set(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Changes applied by `tart set`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetOptions {
    /// Number of virtual CPUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
    /// Memory in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    /// Display resolution; ignored unless both dimensions are positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    /// Generate a new random MAC address.
    pub random_mac: bool,
}

/// `set [--cpu N] [--memory N] [--display WxH] [--random-mac] NAME`
pub fn set(name: &str, opts: &SetOptions) -> Vec<String> {
    let display = opts.display.filter(Display::is_set).map(|d| d.to_string());
    ArgList::new("set")
        .number("--cpu", opts.cpu)
        .number("--memory", opts.memory)
        .value("--display", display.as_deref())
        .flag("--random-mac", opts.random_mac)
        .positional(name)
        .into_args()
}

/// Output format understood by `tart get`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// JSON object.
    Json,
}

impl ConfigFormat {
    /// The value passed to `--format`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// `get [--format F] NAME`
pub fn get(name: &str, format: Option<ConfigFormat>) -> Vec<String> {
    ArgList::new("get")
        .value("--format", format.map(ConfigFormat::as_str))
        .positional(name)
        .into_args()
}

// ---------------------------------------------------------------------------
// rename / import / export / suspend / stop / delete
// ---------------------------------------------------------------------------

/// `rename OLD NEW`
pub fn rename(old_name: &str, new_name: &str) -> Vec<String> {
    ArgList::new("rename")
        .positional(old_name)
        .positional(new_name)
        .into_args()
}

/// `import PATH NAME`
pub fn import(path: &str, name: &str) -> Vec<String> {
    ArgList::new("import")
        .positional(path)
        .positional(name)
        .into_args()
}

/// `export NAME [PATH]`
///
/// An empty path is omitted and tart picks `NAME.tvm`.
pub fn export(name: &str, path: Option<&str>) -> Vec<String> {
    let mut args = ArgList::new("export").positional(name);
    if let Some(path) = path.filter(|p| !p.is_empty()) {
        args = args.positional(path);
    }
    args.into_args()
}

/// `suspend NAME`
pub fn suspend(name: &str) -> Vec<String> {
    ArgList::new("suspend").positional(name).into_args()
}

/// `stop [--timeout N] NAME`
pub fn stop(name: &str, timeout_secs: Option<u32>) -> Vec<String> {
    ArgList::new("stop")
        .number("--timeout", timeout_secs)
        .positional(name)
        .into_args()
}

/// `delete NAME`
pub fn delete(name: &str) -> Vec<String> {
    ArgList::new("delete").positional(name).into_args()
}

// ---------------------------------------------------------------------------
// prune
// ---------------------------------------------------------------------------

/// What `tart prune` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PruneEntries {
    /// OCI and IPSW caches.
    Caches,
    /// Local VMs.
    Vms,
}

impl PruneEntries {
    /// The value passed to `--entries`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caches => "caches",
            Self::Vms => "vms",
        }
    }
}

/// Options for `tart prune`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PruneOptions {
    /// Entries to prune; tart defaults to caches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<PruneEntries>,
    /// Remove entries last accessed more than this many days ago.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub older_than: Option<u32>,
    /// Remove the least recently used entries until they fit this many GB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_budget: Option<u32>,
}

/// `prune [--entries E] [--older-than N] [--space-budget N]`
pub fn prune(opts: &PruneOptions) -> Vec<String> {
    ArgList::new("prune")
        .value("--entries", opts.entries.map(PruneEntries::as_str))
        .number("--older-than", opts.older_than)
        .number("--space-budget", opts.space_budget)
        .into_args()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_with_defaults_is_just_the_name() {
        assert_eq!(create("dev", &CreateOptions::default()), ["create", "dev"]);
    }

    #[test]
    fn create_with_everything() {
        let opts = CreateOptions {
            from_ipsw: Some("latest".into()),
            linux: true,
            disk_size: Some(80),
        };
        assert_eq!(
            create("dev", &opts),
            ["create", "--from-ipsw", "latest", "--linux", "--disk-size", "80", "dev"]
        );
    }

    #[test]
    fn clone_puts_source_then_target_last() {
        let opts = CloneOptions {
            insecure: true,
            concurrency: Some(8),
        };
        assert_eq!(
            clone("ghcr.io/cirruslabs/macos:latest", "dev", &opts),
            [
                "clone",
                "--insecure",
                "--concurrency",
                "8",
                "ghcr.io/cirruslabs/macos:latest",
                "dev"
            ]
        );
    }

    #[test]
    fn set_skips_half_specified_display() {
        let opts = SetOptions {
            cpu: Some(4),
            memory: Some(8192),
            display: Some(Display {
                width: 1920,
                height: 0,
            }),
            random_mac: false,
        };
        assert_eq!(set("dev", &opts), ["set", "--cpu", "4", "--memory", "8192", "dev"]);
    }

    #[test]
    fn set_emits_full_display_and_random_mac() {
        let opts = SetOptions {
            display: Some(Display {
                width: 1920,
                height: 1080,
            }),
            random_mac: true,
            ..SetOptions::default()
        };
        assert_eq!(
            set("dev", &opts),
            ["set", "--display", "1920x1080", "--random-mac", "dev"]
        );
    }

    #[test]
    fn get_format_is_optional() {
        assert_eq!(get("dev", None), ["get", "dev"]);
        assert_eq!(
            get("dev", Some(ConfigFormat::Json)),
            ["get", "--format", "json", "dev"]
        );
    }

    #[test]
    fn export_omits_empty_path() {
        assert_eq!(export("dev", None), ["export", "dev"]);
        assert_eq!(export("dev", Some("")), ["export", "dev"]);
        assert_eq!(export("dev", Some("/tmp/dev.tvm")), ["export", "dev", "/tmp/dev.tvm"]);
    }

    #[test]
    fn stop_timeout_zero_is_omitted() {
        assert_eq!(stop("dev", Some(0)), ["stop", "dev"]);
        assert_eq!(stop("dev", Some(30)), ["stop", "--timeout", "30", "dev"]);
    }

    #[test]
    fn simple_positional_builders() {
        assert_eq!(rename("a", "b"), ["rename", "a", "b"]);
        assert_eq!(import("/tmp/a.tvm", "a"), ["import", "/tmp/a.tvm", "a"]);
        assert_eq!(suspend("a"), ["suspend", "a"]);
        assert_eq!(delete("a"), ["delete", "a"]);
    }

    #[test]
    fn prune_has_no_positional() {
        assert_eq!(prune(&PruneOptions::default()), ["prune"]);
        let opts = PruneOptions {
            entries: Some(PruneEntries::Vms),
            older_than: Some(7),
            space_budget: Some(50),
        };
        assert_eq!(
            prune(&opts),
            [
                "prune",
                "--entries",
                "vms",
                "--older-than",
                "7",
                "--space-budget",
                "50"
            ]
        );
    }

    #[test]
    fn create_options_use_camel_case_keys() {
        let opts: CreateOptions =
            serde_json::from_str(r#"{"fromIPSW":"latest","diskSize":50}"#).unwrap();
        assert_eq!(opts.from_ipsw.as_deref(), Some("latest"));
        assert_eq!(opts.disk_size, Some(50));
        assert!(!opts.linux);
    }
}
