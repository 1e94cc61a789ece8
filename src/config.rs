use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::paths;

/// Name of the remote used when `config.toml` does not set one.
pub const DEFAULT_REMOTE: &str = "origin";

/// Top-level configuration structure loaded from `config.toml`.
///
/// Every section is optional; a missing file yields [`Config::default`].
///
/// Example TOML:
/// ```toml
/// [repository]
/// path   = "/opt/project"
/// remote = "origin"
/// include_untracked = false
///
/// [log]
/// level = "debug"
/// ```
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub log: LogSettings,
}

/// The `[repository]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct RepositorySettings {
    /// Repository root. Relative paths are taken as-is; `None` means the
    /// current directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Count untracked files as pending changes in the safety check.
    #[serde(default)]
    pub include_untracked: bool,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            path: None,
            remote: default_remote(),
            include_untracked: false,
        }
    }
}

impl RepositorySettings {
    /// Root path of the repository, falling back to `.`.
    pub fn root(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// The `[log]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

fn default_level() -> String {
    "info".to_string()
}

/// Load `config.toml` from the branchkeeper home (see [`paths()`]).
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<Config> {
    let p = paths()?;
    load_config_from(&p.config)
}

/// Load a configuration file from an explicit location.
///
/// A missing file is not an error and yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let txt = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: Config = toml::from_str(&txt)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(cfg)
}
