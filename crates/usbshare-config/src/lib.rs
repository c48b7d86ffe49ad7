//! Configuration for usbshare.
//!
//! TOML config file (daemon settings, output defaults and the persisted
//! ignore list), environment overrides, and translation to
//! `usbshare_core::DaemonConfig`. Also provides the file-backed
//! [`IgnoreListStore`] the controller persists through.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use usbshare_core::{CoreError, DaemonConfig, IgnoreListStore};

/// Environment variable prefix for overrides (`USBSHARE_DAEMON__TIMEOUT_SECS=10`).
pub const ENV_PREFIX: &str = "USBSHARE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { .. } => CoreError::Config {
                message: err.to_string(),
            },
            ConfigError::Serialization(_) | ConfigError::Figment(_) | ConfigError::Io(_) => {
                CoreError::Persistence {
                    message: err.to_string(),
                }
            }
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Ignored identities as `"vid:pid"` strings, in display order.
    #[serde(default)]
    pub ignored_devices: Vec<String>,

    /// How to reach the daemon.
    #[serde(default)]
    pub daemon: DaemonSettings,

    /// Output defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DaemonSettings {
    /// Executable name (looked up on `PATH`) or full path.
    #[serde(default = "default_program")]
    pub program: String,

    /// Per-invocation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Pass `-f` to `usbipd bind`.
    #[serde(default = "default_force_bind")]
    pub force_bind: bool,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_secs: default_timeout(),
            force_bind: default_force_bind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_program() -> String {
    "usbipd".into()
}
fn default_timeout() -> u64 {
    5
}
fn default_force_bind() -> bool {
    true
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// Validate and translate the daemon section.
    pub fn daemon_config(&self) -> Result<DaemonConfig, ConfigError> {
        let program = self.daemon.program.trim();
        if program.is_empty() {
            return Err(ConfigError::Validation {
                field: "daemon.program".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.daemon.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "daemon.timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(DaemonConfig {
            program: PathBuf::from(program),
            timeout: Duration::from_secs(self.daemon.timeout_secs),
            force_bind: self.daemon.force_bind,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "usbshare", "usbshare").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("usbshare");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config: defaults, then the TOML file at `path` (if it
/// exists), then `USBSHARE_*` environment overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path)
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

/// Defaults plus the file only. Used before rewriting the file so
/// environment overrides never leak into it.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    Ok(file_figment(path).extract()?)
}

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories as needed.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Ignore-list persistence ─────────────────────────────────────────

/// Stores the ignore list in the `ignored_devices` key of the config
/// file. Every other setting in the file is preserved on save.
#[derive(Debug, Clone)]
pub struct ConfigIgnoreStore {
    path: PathBuf,
}

impl ConfigIgnoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IgnoreListStore for ConfigIgnoreStore {
    fn load(&self) -> Result<Vec<String>, CoreError> {
        let config = load_config_file(&self.path)?;
        debug!(
            path = %self.path.display(),
            entries = config.ignored_devices.len(),
            "loaded ignore list"
        );
        Ok(config.ignored_devices)
    }

    fn save(&self, entries: &[String]) -> Result<(), CoreError> {
        let mut config = load_config_file(&self.path)?;
        config.ignored_devices = entries.to_vec();
        save_config(&config, &self.path)?;
        debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "saved ignore list"
        );
        Ok(())
    }
}
