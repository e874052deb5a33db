// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz `--dir` token parsing.
//!
//! Any token that parses must render to a token that parses back to the
//! same mount.
#![no_main]
use libfuzzer_sys::fuzz_target;
use tart_args::DirMount;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mount) = s.parse::<DirMount>() else {
        return;
    };
    let token = mount.to_token();
    assert!(!token.is_empty());
    if let Ok(again) = token.parse::<DirMount>() {
        assert_eq!(again.to_token(), token, "token rendering must be stable");
    }
});
