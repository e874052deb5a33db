// SPDX-License-Identifier: MIT OR Apache-2.0
//! Decoding of tart's list output into VM descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use tart_args::VmSource;
use tart_error::{TartError, TartResult};
use tart_exec::ExecutionResult;

/// Lifecycle state reported by `tart list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    /// The VM is running.
    #[serde(alias = "Running")]
    Running,
    /// The VM is shut down.
    #[serde(alias = "Stopped")]
    Stopped,
    /// The VM is suspended to disk.
    #[serde(alias = "Suspended")]
    Suspended,
    /// Any state this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl VmStatus {
    /// Lowercase name as tart prints it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Suspended => "suspended",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One VM as reported by `tart list --format json`.
///
/// Sizes are passed through verbatim in the units tart reports (GB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmState {
    /// Space actually used on disk.
    #[serde(default, alias = "SizeOnDisk")]
    pub size_on_disk: u64,
    /// Provisioned disk size.
    #[serde(default, alias = "Disk")]
    pub disk: u64,
    /// VM name, or the OCI reference for remote images.
    #[serde(alias = "Name")]
    pub name: String,
    /// Local VM or OCI cache entry.
    #[serde(alias = "Source")]
    pub source: VmSource,
    /// Total size.
    #[serde(default, alias = "Size")]
    pub size: u64,
    /// Lifecycle state.
    #[serde(default, alias = "State")]
    pub state: VmStatus,
}

/// Decode the JSON array printed by `tart list --format json`.
///
/// Anything other than a JSON array of descriptors is a
/// [`TartError::DecodeFailed`]; empty output is never an empty list.
pub fn decode_list(result: &ExecutionResult) -> TartResult<Vec<VmState>> {
    let text = result.stdout_text()?;
    serde_json::from_str(text).map_err(|e| TartError::decode(format!("VM list: {e}")))
}

/// Stdout as text with surrounding whitespace removed.
pub fn decode_text(result: &ExecutionResult) -> TartResult<String> {
    Ok(result.stdout_text()?.trim().to_string())
}
