// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz TartConfig TOML parsing and validation.
//!
//! Parsing and validation never panic, and a parsed config survives a trip
//! back through TOML.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = tart_config::parse_toml(s) else {
        return;
    };

    match tart_config::validate_config(&config) {
        Ok(warnings) => {
            for w in &warnings {
                let _ = format!("{w}");
            }
        }
        Err(e) => {
            let _ = format!("{e}");
        }
    }

    if let Ok(toml_str) = toml::to_string(&config)
        && let Ok(rt) = tart_config::parse_toml(&toml_str)
    {
        assert_eq!(config, rt, "TOML round-trip must be lossless");
    }
});
