//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use usbshare_config::ConfigError;
use usbshare_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const COMMAND_FAILED: i32 = 5;
    pub const DAEMON_UNAVAILABLE: i32 = 7;
    pub const QUERY_FAILED: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Daemon ───────────────────────────────────────────────────────

    #[error("usbipd was not found ({program})")]
    #[diagnostic(
        code(usbshare::daemon_unavailable),
        help(
            "Install usbipd-win from https://github.com/dorssel/usbipd-win/releases,\n\
             or point usbshare at it with --usbipd <PATH> (or [daemon] program in the config file)."
        )
    )]
    DaemonUnavailable { program: String },

    #[error("Could not read device state from usbipd")]
    #[diagnostic(
        code(usbshare::query_failed),
        help(
            "{message}\n\
             Run with -v for details, or raise the limit with --timeout."
        )
    )]
    QueryFailed { message: String },

    #[error("Failed to {action} device {bus_id}")]
    #[diagnostic(
        code(usbshare::command_failed),
        help(
            "{reason}\n\
             Binding and unbinding usually require an elevated (administrator) shell."
        )
    )]
    CommandFailed {
        action: String,
        bus_id: String,
        reason: String,
    },

    // ── Devices ──────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(usbshare::not_found),
        help("Run: usbshare {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Device {device} has no VID:PID identity")]
    #[diagnostic(
        code(usbshare::unidentifiable),
        help("Only devices whose instance id carries VID_xxxx&PID_xxxx can be ignored.")
    )]
    Unidentifiable { device: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(usbshare::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(usbshare::config),
        help("Check the config file (usbshare config path) or recreate it with: usbshare config init")
    )]
    Config(#[from] ConfigError),

    #[error("Could not save the ignore list: {message}")]
    #[diagnostic(
        code(usbshare::persistence),
        help("Check that the config file is writable: usbshare config path")
    )]
    Persistence { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(usbshare::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(usbshare::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DaemonUnavailable { .. } => exit_code::DAEMON_UNAVAILABLE,
            Self::QueryFailed { .. } => exit_code::QUERY_FAILED,
            Self::CommandFailed { .. } => exit_code::COMMAND_FAILED,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::Unidentifiable { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Persistence { .. } => exit_code::CONFIG,
            Self::Io(_) | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DaemonUnavailable { program } => CliError::DaemonUnavailable { program },

            CoreError::QueryFailed { message } => CliError::QueryFailed { message },

            CoreError::CommandFailed {
                action,
                bus_id,
                reason,
            } => CliError::CommandFailed {
                action,
                bus_id,
                reason,
            },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::UnidentifiableDevice { device } => CliError::Unidentifiable { device },

            CoreError::MalformedIgnoreEntry { entry } => CliError::Validation {
                field: "device".into(),
                reason: format!("{entry:?} is not a VID:PID pair"),
            },

            CoreError::Persistence { message } => CliError::Persistence { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let cases = [
            (
                CoreError::DaemonUnavailable {
                    program: "usbipd".into(),
                },
                exit_code::DAEMON_UNAVAILABLE,
            ),
            (
                CoreError::QueryFailed {
                    message: "timeout".into(),
                },
                exit_code::QUERY_FAILED,
            ),
            (
                CoreError::DeviceNotFound {
                    identifier: "bus 9-9".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::CommandFailed {
                    action: "bind".into(),
                    bus_id: "1-4".into(),
                    reason: "device is still not shared".into(),
                },
                exit_code::COMMAND_FAILED,
            ),
            (
                CoreError::UnidentifiableDevice {
                    device: "3-1 | -:- | hub".into(),
                },
                exit_code::USAGE,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }
}
