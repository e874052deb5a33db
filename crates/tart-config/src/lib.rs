// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for the tart control client.
//!
//! This crate provides [`TartConfig`], the user-facing settings, together
//! with helpers for loading from TOML files, applying `TARTCTL_*` environment
//! overrides, merging overlays, and producing advisory [`ConfigWarning`]s.
//!
//! [`TartEnv`] turns a config into the immutable environment every spawned
//! `tart` process runs with.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod env;

pub use env::{TART_HOME_VAR, TartEnv, default_home};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading, validation, or
/// environment resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// The user's home directory could not be determined.
    #[error("could not determine the home directory")]
    HomeNotFound,

    /// The tart home directory could not be created.
    #[error("failed to create tart home {path}: {source}")]
    CreateHome {
        /// Directory that was being created.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The tart home path cannot be exported as `TART_HOME` unchanged.
    #[error("tart home is not valid UTF-8: {path}")]
    HomeNotUtf8 {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// The tart home directory disappeared after resolution.
    #[error("config directory does not exist: {path}")]
    HomeMissing {
        /// Directory that was expected.
        path: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// `home` is a relative path and will be resolved against the current
    /// working directory.
    RelativeHome {
        /// The configured path.
        path: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::RelativeHome { path } => {
                write!(f, "home '{path}' is relative to the working directory")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration for the tart control client.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct TartConfig {
    /// Executable name or path of the tart CLI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,

    /// Directory exported to tart as `TART_HOME`. Defaults to `~/.tart`;
    /// an empty string leaves tart on its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,

    /// Registry host used by `login` and `logout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for TartConfig {
    fn default() -> Self {
        Self {
            binary: Some(DEFAULT_BINARY.into()),
            home: None,
            registry: None,
            log_level: Some("info".into()),
        }
    }
}

impl TartConfig {
    /// The configured executable, falling back to `tart`.
    pub fn binary(&self) -> &str {
        self.binary.as_deref().unwrap_or(DEFAULT_BINARY)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Executable looked up on `PATH` when none is configured.
pub const DEFAULT_BINARY: &str = "tart";

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`TartConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`TartConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<TartConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => TartConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`TartConfig`].
pub fn parse_toml(content: &str) -> Result<TartConfig, ConfigError> {
    toml::from_str::<TartConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `TARTCTL_BINARY`
/// - `TARTCTL_HOME`
/// - `TARTCTL_REGISTRY`
/// - `TARTCTL_LOG_LEVEL`
pub fn apply_env_overrides(config: &mut TartConfig) {
    if let Ok(val) = std::env::var("TARTCTL_BINARY") {
        config.binary = Some(val);
    }
    if let Some(val) = std::env::var_os("TARTCTL_HOME") {
        config.home = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("TARTCTL_REGISTRY") {
        config.registry = Some(val);
    }
    if let Ok(val) = std::env::var("TARTCTL_LOG_LEVEL") {
        config.log_level = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (empty binary, unknown log level) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &TartConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if let Some(ref binary) = config.binary
        && binary.trim().is_empty()
    {
        errors.push("binary must not be empty".into());
    }

    if let Some(ref registry) = config.registry {
        if registry.trim().is_empty() {
            errors.push("registry must not be empty".into());
        } else if registry.contains("://") {
            errors.push(format!(
                "registry '{registry}' must be a host name, not a URL"
            ));
        }
    } else {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "registry".into(),
            hint: "login and logout are unavailable".into(),
        });
    }

    if let Some(ref home) = config.home
        && !home.as_os_str().is_empty()
        && home.is_relative()
    {
        warnings.push(ConfigWarning::RelativeHome {
            path: home.display().to_string(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
pub fn merge_configs(base: TartConfig, overlay: TartConfig) -> TartConfig {
    TartConfig {
        binary: overlay.binary.or(base.binary),
        home: overlay.home.or(base.home),
        registry: overlay.registry.or(base.registry),
        log_level: overlay.log_level.or(base.log_level),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
