// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resolution of the directory tart keeps its VMs and caches in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{ConfigError, TartConfig};

/// Environment variable that redirects tart's state directory.
pub const TART_HOME_VAR: &str = "TART_HOME";

/// Directory name used under the user's home when no `home` is configured.
const DEFAULT_HOME_DIR: &str = ".tart";

/// The resolved, immutable environment every tart invocation runs with.
///
/// Built once when a client is constructed and shared read-only between
/// concurrent invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TartEnv {
    home: Option<PathBuf>,
}

impl TartEnv {
    /// Resolve the tart home from `config`, creating it if absent.
    ///
    /// An unset `home` resolves to `~/.tart`; an empty `home` leaves tart on
    /// its own default and exports nothing.
    pub fn resolve(config: &TartConfig) -> Result<Self, ConfigError> {
        let home = match &config.home {
            Some(p) if p.as_os_str().is_empty() => return Ok(Self::unmanaged()),
            Some(p) => p.clone(),
            None => default_home()?,
        };
        require_utf8(&home)?;
        ensure_dir(&home)?;
        debug!(target: "tart.config", home = %home.display(), "resolved tart home");
        Ok(Self { home: Some(home) })
    }

    /// An environment that does not override `TART_HOME`.
    pub fn unmanaged() -> Self {
        Self { home: None }
    }

    /// Use `home` as-is without creating it.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        if home.as_os_str().is_empty() {
            return Self::unmanaged();
        }
        Self { home: Some(home) }
    }

    /// The directory exported as `TART_HOME`, if any.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Variables to set on top of the inherited environment.
    ///
    /// A home that is not valid UTF-8 is left out; [`TartEnv::check`]
    /// rejects it before anything is spawned.
    pub fn overlay(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        if let Some(home) = self.home.as_deref().and_then(Path::to_str) {
            env.insert(TART_HOME_VAR.to_string(), home.to_string());
        }
        env
    }

    /// Fail if the home cannot be exported or has disappeared since
    /// resolution.
    pub fn check(&self) -> Result<(), ConfigError> {
        let Some(home) = &self.home else {
            return Ok(());
        };
        require_utf8(home)?;
        if !home.is_dir() {
            return Err(ConfigError::HomeMissing {
                path: home.display().to_string(),
            });
        }
        Ok(())
    }
}

/// `~/.tart` for the current user.
pub fn default_home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_HOME_DIR))
        .ok_or(ConfigError::HomeNotFound)
}

fn require_utf8(path: &Path) -> Result<(), ConfigError> {
    match path.to_str() {
        Some(_) => Ok(()),
        None => Err(ConfigError::HomeNotUtf8 {
            path: path.display().to_string(),
        }),
    }
}

fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
    if path.is_dir() {
        return Ok(());
    }
    create_private_dir(path).map_err(|source| ConfigError::CreateHome {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
