// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output formatting for `tartctl`.

use serde::Serialize;
use tart_client::VmState;

/// Render VMs as an aligned table with a header row.
pub fn vm_table(vms: &[VmState]) -> String {
    let name_w = vms
        .iter()
        .map(|vm| vm.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!(
        "{:<6}  {:<name_w$}  {:>5}  {:>5}  {:>7}  STATE\n",
        "SOURCE", "NAME", "DISK", "SIZE", "ON-DISK"
    );
    for vm in vms {
        out.push_str(&format!(
            "{:<6}  {:<name_w$}  {:>5}  {:>5}  {:>7}  {}\n",
            vm.source.as_str(),
            vm.name,
            vm.disk,
            vm.size,
            vm.size_on_disk,
            vm.state
        ));
    }
    out
}

/// One-line summary of a VM.
pub fn vm_line(vm: &VmState) -> String {
    format!(
        "{}: {} ({}, {} GB disk, {} GB on disk)",
        vm.name, vm.state, vm.source, vm.disk, vm.size_on_disk
    )
}

/// Pretty JSON for anything serializable.
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tart_client::{VmSource, VmStatus};

    fn vm(name: &str, state: VmStatus) -> VmState {
        VmState {
            size_on_disk: 12,
            disk: 50,
            name: name.into(),
            source: VmSource::Local,
            size: 20,
            state,
        }
    }

    #[test]
    fn table_aligns_long_names() {
        let table = vm_table(&[
            vm("dev", VmStatus::Running),
            vm("a-much-longer-name", VmStatus::Stopped),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("SOURCE  NAME"));
        let state_col = lines[0].find("STATE").unwrap();
        assert_eq!(lines[1].find("running"), Some(state_col));
        assert_eq!(lines[2].find("stopped"), Some(state_col));
    }

    #[test]
    fn empty_table_is_header_only() {
        assert_eq!(vm_table(&[]).lines().count(), 1);
    }

    #[test]
    fn line_summary() {
        assert_eq!(
            vm_line(&vm("dev", VmStatus::Suspended)),
            "dev: suspended (local, 50 GB disk, 12 GB on disk)"
        );
    }
}
