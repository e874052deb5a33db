// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz decoding of `tart list --format json` output.
#![no_main]
use libfuzzer_sys::fuzz_target;
use tart_client::{decode_list, decode_text};
use tart_error::{ErrorKind, ExitInfo};
use tart_exec::ExecutionResult;

fuzz_target!(|data: &[u8]| {
    let out = ExecutionResult {
        stdout: data.to_vec(),
        stderr: Vec::new(),
        exit: ExitInfo::code(0),
    };
    match decode_list(&out) {
        Ok(vms) => {
            for vm in &vms {
                let _ = vm.state.as_str();
            }
        }
        Err(e) => assert_eq!(e.kind(), ErrorKind::DecodeFailed),
    }
    match decode_text(&out) {
        Ok(text) => assert_eq!(text, text.trim()),
        Err(e) => assert_eq!(e.kind(), ErrorKind::DecodeFailed),
    }
});
