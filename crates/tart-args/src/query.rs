// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for read-only queries: `list` and `ip`.

use crate::ArgList;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a VM lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmSource {
    /// `~/.tart/vms`
    #[serde(alias = "Local")]
    Local,
    /// The OCI cache.
    #[serde(alias = "OCI", alias = "oci", alias = "Remote")]
    Remote,
    /// A source this client does not know about.
    #[serde(other)]
    Unknown,
}

impl VmSource {
    /// The value passed to `--source`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VmSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for `tart list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListOptions {
    /// Restrict to one source; both when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<VmSource>,
}

/// `list --format json [--source local|remote]`
///
/// [`VmSource::Unknown`] cannot be filtered on and lists both sources.
pub fn list(opts: &ListOptions) -> Vec<String> {
    let source = opts.source.filter(|s| *s != VmSource::Unknown);
    ArgList::new("list")
        .value("--format", Some("json"))
        .value("--source", source.map(VmSource::as_str))
        .into_args()
}

/// How `tart ip` discovers the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpResolver {
    /// DHCP lease file.
    Dhcp,
    /// Host ARP table.
    Arp,
}

impl IpResolver {
    /// The value passed to `--resolver`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dhcp => "dhcp",
            Self::Arp => "arp",
        }
    }
}

/// Options for `tart ip`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpOptions {
    /// Seconds to wait for an address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<u32>,
    /// Discovery strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<IpResolver>,
}

/// `ip [--wait N] [--resolver R] NAME`
pub fn ip(name: &str, opts: &IpOptions) -> Vec<String> {
    ArgList::new("ip")
        .number("--wait", opts.wait)
        .value("--resolver", opts.resolver.map(IpResolver::as_str))
        .positional(name)
        .into_args()
}
