// SPDX-License-Identifier: MIT OR Apache-2.0
//! The facade exposes the whole client surface and the stable error codes.

use tart_control::{
    DirMount, ErrorKind, ExecutionResult, ExitInfo, RunOptions, TartError, VmStatus, args,
    decode_list,
};

#[test]
fn error_codes_are_stable() {
    let codes = [
        (ErrorKind::PreconditionFailed, "PRECONDITION_FAILED"),
        (ErrorKind::LaunchFailed, "LAUNCH_FAILED"),
        (ErrorKind::ExternalCommandFailed, "EXTERNAL_COMMAND_FAILED"),
        (ErrorKind::StreamReadFailed, "STREAM_READ_FAILED"),
        (ErrorKind::StdinWriteFailed, "STDIN_WRITE_FAILED"),
        (ErrorKind::DecodeFailed, "DECODE_FAILED"),
    ];
    for (kind, code) in codes {
        assert_eq!(kind.as_str(), code);
    }
}

#[test]
fn pre_spawn_kinds() {
    assert!(ErrorKind::PreconditionFailed.is_pre_spawn());
    assert!(ErrorKind::LaunchFailed.is_pre_spawn());
    assert!(!ErrorKind::ExternalCommandFailed.is_pre_spawn());
}

#[test]
fn context_wraps_once_and_keeps_kind() {
    let err = TartError::precondition("VM is already running")
        .context("run", Some("dev"))
        .context("outer", None);
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(
        err.to_string(),
        "run dev: precondition failed: VM is already running"
    );
}

#[test]
fn builders_and_decoders_compose() {
    let opts = RunOptions {
        no_graphics: true,
        dir: vec![DirMount::new("/tmp/x").named("shared").read_only().tag("t1")],
        ..RunOptions::default()
    };
    assert_eq!(
        args::run("dev", &opts),
        ["run", "--no-graphics", "--dir", "shared:/tmp/x:ro,tag=t1", "dev"]
    );

    let out = ExecutionResult {
        stdout: br#"[{"name":"dev","source":"local","state":"suspended","disk":50,"size":20,"sizeOnDisk":9}]"#.to_vec(),
        stderr: Vec::new(),
        exit: ExitInfo::code(0),
    };
    let vms = decode_list(&out).unwrap();
    assert_eq!(vms[0].state, VmStatus::Suspended);
}
