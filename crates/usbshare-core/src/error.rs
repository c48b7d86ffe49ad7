// ── Core error types ──
//
// User-facing errors from usbshare-core. These are NOT transport-specific --
// consumers never see exit codes or JSON parse failures directly.
// The `From<usbshare_api::Error>` impl translates subprocess errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Daemon errors ────────────────────────────────────────────────
    #[error("usbipd is not available ({program})")]
    DaemonUnavailable { program: String },

    #[error("Querying usbipd failed: {message}")]
    QueryFailed { message: String },

    #[error("Failed to {action} device {bus_id}: {reason}")]
    CommandFailed {
        action: String,
        bus_id: String,
        reason: String,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Device has no usable VID:PID identity: {device}")]
    UnidentifiableDevice { device: String },

    #[error("Malformed ignore-list entry: {entry:?}")]
    MalformedIgnoreEntry { entry: String },

    // ── Persistence / configuration errors ───────────────────────────
    #[error("Failed to persist ignore list: {message}")]
    Persistence { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<usbshare_api::Error> for CoreError {
    fn from(err: usbshare_api::Error) -> Self {
        match err {
            usbshare_api::Error::NotInstalled { program } => CoreError::DaemonUnavailable {
                program: program.display().to_string(),
            },
            other @ (usbshare_api::Error::Launch { .. }
            | usbshare_api::Error::Exited { .. }
            | usbshare_api::Error::Timeout { .. }
            | usbshare_api::Error::Deserialization { .. }) => CoreError::QueryFailed {
                message: other.to_string(),
            },
        }
    }
}
