//! User configuration: service endpoint, credentials, snapshot location.
//!
//! Configuration is a small TOML file, by default at
//! `<config dir>/deskwatch/config.toml`. Credentials live in it as plain
//! text, the same way the service's own API examples store them; the setup
//! command warns about this.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How requests authenticate to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer <key>`.
    ApiKey(String),
    /// HTTP Basic with operator credentials.
    Basic { username: String, password: String },
}

/// Connection settings for the TOPdesk instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL, e.g. `https://support.example.com`.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Page size for assigned-item list calls.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            username: None,
            password: None,
            page_size: default_page_size(),
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    /// Override for the snapshot document location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Resolve the effective authentication method.
    ///
    /// An API key wins over operator credentials when both are present.
    ///
    /// # Errors
    ///
    /// When neither an API key nor a complete username/password pair is
    /// configured.
    pub fn auth(&self) -> Result<Auth> {
        if let Some(key) = self.service.api_key.as_deref().filter(|key| !key.is_empty()) {
            return Ok(Auth::ApiKey(key.to_string()));
        }

        match (&self.service.username, &self.service.password) {
            (Some(username), Some(password)) if !username.is_empty() => Ok(Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => anyhow::bail!(
                "no authentication configured: set api_key, or username and password"
            ),
        }
    }

    /// Where the snapshot document lives for this configuration.
    #[must_use]
    pub fn resolve_snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(default_snapshot_path)
    }
}

/// Load configuration from `path`.
///
/// # Errors
///
/// When the file is missing, unreadable, or not valid TOML.
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write configuration to `path`, creating parent directories as needed.
///
/// # Errors
///
/// When a parent directory cannot be created or the file cannot be written.
pub fn store(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let body = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Effective config path: explicit flag, then `DESKWATCH_CONFIG`, then the
/// platform default.
#[must_use]
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    resolve_config_path_inner(flag, std::env::var_os("DESKWATCH_CONFIG").map(PathBuf::from))
}

fn resolve_config_path_inner(flag: Option<&Path>, env_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env_path {
        return path;
    }
    default_config_path()
}

/// Default config location: `<config dir>/deskwatch/config.toml`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from("deskwatch.toml"),
        |dir| dir.join("deskwatch").join("config.toml"),
    )
}

/// Default snapshot location: `<local data dir>/deskwatch/snapshot.json`.
#[must_use]
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from("deskwatch-snapshot.json"),
        |dir| dir.join("deskwatch").join("snapshot.json"),
    )
}

const fn default_page_size() -> u32 {
    10
}
