//! CLI-side configuration glue: resolves the config file path, merges CLI
//! flags over file settings, and builds the `DaemonConfig` core receives.
//!
//! Core never sees these types -- it receives a pre-built `DaemonConfig`
//! and an `IgnoreListStore`.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::warn;

use usbshare_config::{Config, Defaults};
use usbshare_core::DaemonConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Config file in effect: `--config` / `USBSHARE_CONFIG`, else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(usbshare_config::config_path)
}

/// Load the config file in effect.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(usbshare_config::load_config(&config_path(global))?)
}

/// Fill `--output` / `--color` from the config file when not given.
pub fn apply_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = parse_value::<OutputFormat>("defaults.output", &defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_value::<ColorMode>("defaults.color", &defaults.color);
    }
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Option<T> {
    match T::from_str(raw, true) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(field, value = raw, "ignoring unrecognized config value");
            None
        }
    }
}

/// Build the daemon configuration: file settings, then CLI overrides.
pub fn daemon_config(cfg: &Config, global: &GlobalOpts) -> Result<DaemonConfig, CliError> {
    let mut cfg = cfg.clone();
    if let Some(ref program) = global.usbipd {
        cfg.daemon.program = program.display().to_string();
    }
    if let Some(timeout) = global.timeout {
        cfg.daemon.timeout_secs = timeout;
    }
    Ok(cfg.daemon_config()?)
}
