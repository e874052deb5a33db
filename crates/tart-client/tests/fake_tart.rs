// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end client tests against a shell script standing in for tart.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tart_client::{
    CreateOptions, ErrorKind, IpOptions, ListOptions, LoginOptions, Password, Readiness,
    RunOptions, Tart, TartEnv, VmStatus,
};
use tart_exec::ProcessRunner;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const FAKE_TART: &str = r#"
home="$TART_HOME"
printf '%s\n' "$*" >> "$home/calls.log"
cmd="$1"; shift
case "$cmd" in
  list)
    if [ -f "$home/vms.json" ]; then cat "$home/vms.json"; else echo '[]'; fi ;;
  ip)
    echo "  192.168.64.5  " ;;
  get)
    printf 'CPU Memory\n4   8192\n' ;;
  run)
    echo 'booting...'
    echo 'VM is up'
    exec sleep 30 ;;
  login)
    read -r pw
    [ "$pw" = "hunter2" ] || { echo 'invalid credentials' >&2; exit 1; } ;;
  delete)
    echo "the specified VM \"$1\" does not exist" >&2
    exit 1 ;;
  *) ;;
esac
"#;

struct Fixture {
    _tmp: tempfile::TempDir,
    home: PathBuf,
    tart: Tart,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("home");
        std::fs::create_dir(&home).unwrap();
        let script = tmp.path().join("tart.sh");
        std::fs::write(&script, FAKE_TART).unwrap();

        let runner = ProcessRunner::new("/bin/sh").with_prefix([script.as_os_str()]);
        let tart = Tart::with_executor(Arc::new(runner), TartEnv::with_home(&home))
            .with_registry("registry.local");
        Self {
            _tmp: tmp,
            home,
            tart,
        }
    }

    fn with_vms(self, json: &str) -> Self {
        std::fs::write(self.home.join("vms.json"), json).unwrap();
        self
    }

    fn calls(&self) -> Vec<String> {
        read_lines(&self.home.join("calls.log"))
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

const VMS: &str = r#"[
  {"Name":"dev","Source":"local","State":"stopped","Disk":50,"Size":20,"SizeOnDisk":11},
  {"Name":"web","Source":"local","State":"running","Disk":80,"Size":25,"SizeOnDisk":19}
]"#;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_decodes_records() {
    let fx = Fixture::new().with_vms(VMS);
    let vms = fx.tart.list(&ListOptions::default()).await.unwrap();
    assert_eq!(vms.len(), 2);
    assert_eq!(vms[1].name, "web");
    assert_eq!(vms[1].state, VmStatus::Running);
    assert_eq!(vms[1].disk, 80);
    assert_eq!(fx.calls(), ["list --format json"]);
}

#[tokio::test]
async fn empty_list_is_empty() {
    let fx = Fixture::new();
    assert!(fx.tart.list(&ListOptions::default()).await.unwrap().is_empty());
    assert!(!fx.tart.exists("dev").await.unwrap());
}

#[tokio::test]
async fn ip_and_get_are_trimmed() {
    let fx = Fixture::new();
    assert_eq!(
        fx.tart.ip("dev", &IpOptions::default()).await.unwrap(),
        "192.168.64.5"
    );
    assert_eq!(fx.tart.get("dev", None).await.unwrap(), "CPU Memory\n4   8192");
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_is_refused_for_taken_name() {
    let fx = Fixture::new().with_vms(VMS);
    let err = fx
        .tart
        .create("dev", &CreateOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(fx.calls(), ["list --format json"]);
}

#[tokio::test]
async fn create_spawns_when_free() {
    let fx = Fixture::new().with_vms(VMS);
    fx.tart
        .create(
            "fresh",
            &CreateOptions {
                disk_size: Some(40),
                ..CreateOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        fx.calls(),
        ["list --format json", "create --disk-size 40 fresh"]
    );
}

#[tokio::test]
async fn failed_command_surfaces_stderr() {
    let fx = Fixture::new();
    let err = fx.tart.delete("ghost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalCommandFailed);
    assert_eq!(
        err.stderr(),
        Some("the specified VM \"ghost\" does not exist\n")
    );
    assert!(err.to_string().starts_with("delete ghost:"), "{err}");
}

#[tokio::test]
async fn run_returns_once_vm_is_up() {
    let fx = Fixture::new().with_vms(VMS);
    let readiness = tokio::time::timeout(
        Duration::from_secs(10),
        fx.tart.run(
            "dev",
            &RunOptions {
                no_graphics: true,
                ..RunOptions::default()
            },
        ),
    )
    .await
    .expect("run should not wait for the VM to exit")
    .unwrap();

    let vm = match readiness {
        Readiness::Ready(vm) => vm,
        other => panic!("expected Ready, got {other:?}"),
    };
    assert!(!vm.is_finished());
    assert_eq!(
        fx.calls(),
        ["list --format json", "run --no-graphics dev"]
    );

    let pid = vm.pid().unwrap();
    let _ = std::process::Command::new("kill")
        .arg(pid.to_string())
        .status();
    let err = vm.wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalCommandFailed);
}

#[tokio::test]
async fn run_refuses_running_vm() {
    let fx = Fixture::new().with_vms(VMS);
    let err = fx.tart.run("web", &RunOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(fx.calls(), ["list --format json"]);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_password_travels_on_stdin() {
    let fx = Fixture::new();
    let mut opts = LoginOptions {
        username: Some("ci".into()),
        password: Some(Password::new("hunter2")),
        ..LoginOptions::default()
    };
    fx.tart.login(&opts).await.unwrap();
    assert_eq!(
        fx.calls(),
        ["login --username ci --password-stdin registry.local"]
    );

    opts.password = Some(Password::new("wrong"));
    let err = fx.tart.login(&opts).await.unwrap_err();
    assert_eq!(err.stderr(), Some("invalid credentials\n"));
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn removed_home_is_a_precondition_failure() {
    let fx = Fixture::new();
    std::fs::remove_dir_all(&fx.home).unwrap();
    let err = fx.tart.list(&ListOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
}
