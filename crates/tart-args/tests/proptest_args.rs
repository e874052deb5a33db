// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for the argument builders.

use proptest::prelude::*;
use tart_args::{DirMount, PushOptions, RunOptions, SetOptions, push, run, set};

// ── Leaf strategies ─────────────────────────────────────────────────────

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

fn arb_path() -> impl Strategy<Value = String> {
    "/[a-zA-Z0-9_./-]{1,24}"
}

fn arb_maybe_empty_path() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), arb_path()]
}

fn arb_opt_string() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9_.=/]{0,12}")
}

fn arb_mount() -> impl Strategy<Value = DirMount> {
    (
        prop::option::of(arb_name()),
        arb_path(),
        any::<bool>(),
        prop::option::of("[a-z0-9]{1,8}"),
        prop::option::of(prop_oneof![Just("full".to_string()), Just("none".to_string())]),
    )
        .prop_map(|(name, path, read_only, tag, sync)| DirMount {
            name,
            path,
            read_only,
            tag,
            sync,
        })
}

// ── RunOptions strategy ─────────────────────────────────────────────────

prop_compose! {
    fn arb_run_options()(
        flags in prop::collection::vec(any::<bool>(), 12),
        serial_path in arb_opt_string(),
        disk in prop::collection::vec(arb_path(), 0..5),
        rosetta in arb_opt_string(),
        dir in prop::collection::vec(arb_mount(), 0..4),
        net_bridged in arb_opt_string(),
        net_softnet_allow in arb_opt_string(),
        root_disk_opts in arb_opt_string(),
    ) -> RunOptions {
        RunOptions {
            no_graphics: flags[0],
            serial: flags[1],
            serial_path,
            no_audio: flags[2],
            no_clipboard: flags[3],
            recovery: flags[4],
            vnc: flags[5],
            vnc_experimental: flags[6],
            disk,
            rosetta,
            dir,
            net_bridged,
            net_softnet: flags[7],
            net_softnet_allow,
            net_host: flags[8],
            root_disk_opts,
            suspendable: flags[9],
            capture_system_keys: flags[10],
        }
    }
}

fn boolean_flags(opts: &RunOptions) -> [(&'static str, bool); 11] {
    [
        ("--no-graphics", opts.no_graphics),
        ("--serial", opts.serial),
        ("--no-audio", opts.no_audio),
        ("--no-clipboard", opts.no_clipboard),
        ("--recovery", opts.recovery),
        ("--vnc", opts.vnc),
        ("--vnc-experimental", opts.vnc_experimental),
        ("--net-softnet", opts.net_softnet),
        ("--net-host", opts.net_host),
        ("--suspendable", opts.suspendable),
        ("--capture-system-keys", opts.capture_system_keys),
    ]
}

fn values_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}

// ── Property tests ──────────────────────────────────────────────────────

proptest! {
    /// Building twice from the same input yields the same list.
    #[test]
    fn run_is_deterministic(name in arb_name(), opts in arb_run_options()) {
        prop_assert_eq!(run(&name, &opts), run(&name, &opts.clone()));
    }

    /// Subcommand first, target last.
    #[test]
    fn run_frames_subcommand_and_target(name in arb_name(), opts in arb_run_options()) {
        let args = run(&name, &opts);
        prop_assert_eq!(args.first().map(String::as_str), Some("run"));
        prop_assert_eq!(args.last(), Some(&name));
    }

    /// A boolean flag appears exactly once when true and never when false.
    #[test]
    fn boolean_flags_obey_absence_law(name in arb_name(), opts in arb_run_options()) {
        let args = run(&name, &opts);
        for (flag, on) in boolean_flags(&opts) {
            let count = args.iter().filter(|a| *a == flag).count();
            prop_assert_eq!(count, usize::from(on), "flag {}", flag);
        }
    }

    /// No scalar option ever produces an empty argument.
    #[test]
    fn no_empty_arguments(name in arb_name(), opts in arb_run_options()) {
        prop_assert!(run(&name, &opts).iter().all(|a| !a.is_empty()));
    }

    /// N disks and N mounts produce N occurrences each, in input order.
    #[test]
    fn repeatable_fields_keep_order(name in arb_name(), opts in arb_run_options()) {
        let args = run(&name, &opts);
        let disks: Vec<&str> = opts.disk.iter().map(String::as_str).collect();
        prop_assert_eq!(values_after(&args, "--disk"), disks);

        let tokens: Vec<String> = opts.dir.iter().map(DirMount::to_token).collect();
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
        prop_assert_eq!(values_after(&args, "--dir"), tokens);
    }

    /// Empty elements still count: N inputs, N occurrences.
    #[test]
    fn repeatable_fields_keep_empty_elements(
        name in arb_name(),
        disk in prop::collection::vec(arb_maybe_empty_path(), 0..5),
        paths in prop::collection::vec(arb_maybe_empty_path(), 0..4),
    ) {
        let opts = RunOptions {
            disk: disk.clone(),
            dir: paths.into_iter().map(DirMount::new).collect(),
            ..RunOptions::default()
        };
        let args = run(&name, &opts);
        prop_assert_eq!(args.iter().filter(|a| *a == "--disk").count(), disk.len());
        prop_assert_eq!(args.iter().filter(|a| *a == "--dir").count(), opts.dir.len());
        prop_assert_eq!(
            values_after(&args, "--disk"),
            disk.iter().map(String::as_str).collect::<Vec<_>>()
        );
        prop_assert_eq!(args.last(), Some(&name));
    }

    /// Every token the serializer emits parses back to the same mount.
    #[test]
    fn mount_tokens_parse_back(mount in arb_mount()) {
        let token = mount.to_token();
        prop_assert!(!token.ends_with(':'));
        prop_assert_eq!(token.parse::<DirMount>().unwrap(), mount);
    }

    /// Sync mode survives with or without a tag.
    #[test]
    fn sync_is_always_expressible(path in arb_path(), tag in prop::option::of("[a-z]{1,6}")) {
        let mut mount = DirMount::new(path).sync("full");
        mount.tag = tag;
        prop_assert!(mount.to_token().ends_with("sync=full"));
    }

    /// `--display` needs both dimensions.
    #[test]
    fn display_requires_both_dimensions(w in 0u32..4000, h in 0u32..4000) {
        let opts = SetOptions {
            display: Some(tart_args::Display { width: w, height: h }),
            ..SetOptions::default()
        };
        let args = set("dev", &opts);
        let expected = if w > 0 && h > 0 { vec![format!("{w}x{h}")] } else { vec![] };
        prop_assert_eq!(values_after(&args, "--display"), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Remotes trail the VM name in the order given.
    #[test]
    fn push_remotes_trail_name(
        name in arb_name(),
        remotes in prop::collection::vec("[a-z.]{1,8}/[a-z]{1,8}:[a-z0-9]{1,4}", 1..4),
    ) {
        let opts = PushOptions { remote_names: remotes.clone(), ..PushOptions::default() };
        let args = push(&name, &opts);
        let tail = &args[args.len() - remotes.len() - 1..];
        prop_assert_eq!(&tail[0], &name);
        prop_assert_eq!(&tail[1..], remotes.as_slice());
    }
}
