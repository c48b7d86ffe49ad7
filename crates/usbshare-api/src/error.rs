use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `usbshare-api` crate.
///
/// Covers every way a daemon invocation can go wrong: the executable is
/// missing, it could not be launched, it exited unsuccessfully, it hung
/// past the timeout, or it printed something we could not decode.
/// `usbshare-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Launch ──────────────────────────────────────────────────────
    /// The daemon executable could not be found.
    #[error("usbipd executable not found: {}", .program.display())]
    NotInstalled { program: PathBuf },

    /// The executable exists but spawning or waiting on it failed.
    #[error("failed to run {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Process outcome ─────────────────────────────────────────────
    /// The daemon ran and exited with a non-zero status.
    #[error("usbipd exited with {}: {stderr}", exit_label(.code.as_ref()))]
    Exited { code: Option<i32>, stderr: String },

    /// The daemon did not exit within the configured timeout.
    #[error("usbipd did not respond within {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    // ── Data ────────────────────────────────────────────────────────
    /// Output could not be decoded, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn exit_label(code: Option<&i32>) -> String {
    code.map_or_else(|| "a signal".to_owned(), |c| format!("status {c}"))
}
