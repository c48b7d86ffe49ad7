//! Status handler: daemon availability, version and a device summary.
//!
//! Runs without requiring the daemon, so a missing install is reported
//! rather than treated as an error.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use usbshare_config::{Config, ConfigIgnoreStore};
use usbshare_core::{Controller, CoreError, IgnoreList, IgnoreListStore};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct StatusReport {
    available: bool,
    program: String,
    resolved_path: Option<String>,
    version: Option<String>,
    config_path: String,
    ignored: usize,
    devices: Option<DeviceCounts>,
    refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct DeviceCounts {
    not_shared: usize,
    shared: usize,
    attached: usize,
    persisted: usize,
    unclassified: usize,
    ignored_connected: usize,
}

/// Leading `major.minor.patch` of a usbipd version string, which may
/// carry build metadata (`4.3.0+52.Branch.master.Sha.…`).
fn version_number(raw: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+").expect("valid version regex"))
        .find(raw.trim())
        .map(|m| m.as_str())
}

fn detail(r: &StatusReport) -> String {
    let daemon = if r.available {
        r.resolved_path.as_deref().unwrap_or(&r.program).to_owned()
    } else {
        format!("not found ({})", r.program)
    };
    let version = match r.version.as_deref() {
        Some(raw) => match version_number(raw) {
            Some(number) if number != raw => format!("{number} ({raw})"),
            _ => raw.to_owned(),
        },
        None => "-".into(),
    };

    let mut lines = vec![
        format!("usbipd:     {daemon}"),
        format!("Version:    {version}"),
        format!("Config:     {}", r.config_path),
        format!("Ignored:    {}", r.ignored),
    ];
    if let Some(ref c) = r.devices {
        lines.push(format!(
            "Devices:    {} not shared, {} shared, {} attached, {} persisted",
            c.not_shared, c.shared, c.attached, c.persisted
        ));
        if c.unclassified > 0 {
            lines.push(format!("Anomalies:  {} device(s) in an unknown state", c.unclassified));
        }
    }
    if let Some(at) = r.refreshed_at {
        lines.push(format!("Refreshed:  {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines.join("\n")
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let daemon = config::daemon_config(cfg, global)?;
    let config_path = config::config_path(global);
    let mut report = StatusReport {
        available: false,
        program: daemon.program.display().to_string(),
        resolved_path: daemon.resolve_program().map(|p| p.display().to_string()),
        version: None,
        config_path: config_path.display().to_string(),
        ignored: IgnoreList::from_persisted(&cfg.ignored_devices).len(),
        devices: None,
        refreshed_at: None,
    };

    let store: Arc<dyn IgnoreListStore> = Arc::new(ConfigIgnoreStore::new(config_path));
    match Controller::connect(daemon, Some(store)) {
        Ok(controller) => {
            report.available = true;
            report.version = controller.daemon_version().await;

            // A failed query still leaves availability and version worth showing
            match controller.try_refresh().await {
                Ok(view) => {
                    report.ignored = view.ignored_connected.len() + view.ignored_disconnected.len();
                    report.refreshed_at = view.refreshed_at;
                    report.devices = Some(DeviceCounts {
                        not_shared: view.not_shared().count(),
                        shared: view.shared().count(),
                        attached: view.attached().count(),
                        persisted: view.persisted.len(),
                        unclassified: view.unclassified.len(),
                        ignored_connected: view.ignored_connected.len(),
                    });
                }
                Err(e) => tracing::warn!(error = %e, "device query failed"),
            }
        }
        Err(CoreError::DaemonUnavailable { program }) => {
            tracing::info!(%program, "usbipd is not available");
        }
        Err(e) => return Err(e.into()),
    }

    let out = output::render_single(&global.output(), &report, detail, |r| {
        r.available.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_number_strips_build_metadata() {
        assert_eq!(
            version_number("4.3.0+52.Branch.master.Sha.0a1b2c3\n"),
            Some("4.3.0")
        );
        assert_eq!(version_number("4.3.0"), Some("4.3.0"));
        assert_eq!(version_number("unknown"), None);
    }

    #[test]
    fn unavailable_daemon_is_reported_in_detail() {
        let report = StatusReport {
            available: false,
            program: "usbipd".into(),
            resolved_path: None,
            version: None,
            config_path: "/tmp/config.toml".into(),
            ignored: 2,
            devices: None,
            refreshed_at: None,
        };
        let text = detail(&report);
        assert!(text.contains("not found (usbipd)"));
        assert!(text.contains("Ignored:    2"));
    }
}
