// ── Runtime daemon configuration ──
//
// These types describe *how* to reach the usbipd executable. They never
// touch disk: the CLI (via usbshare-config) builds a `DaemonConfig` and
// hands it in.

use std::path::PathBuf;
use std::time::Duration;

use usbshare_api::TransportConfig;
use usbshare_api::transport::{DEFAULT_PROGRAM, DEFAULT_TIMEOUT};

/// Configuration for talking to the sharing daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Executable name or path (defaults to `usbipd` on `PATH`).
    pub program: PathBuf,
    /// Per-invocation timeout.
    pub timeout: Duration,
    /// Pass `-f` on bind, forcing the daemon to take the device from its
    /// host driver.
    pub force_bind: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
            force_bind: true,
        }
    }
}

impl DaemonConfig {
    /// Translate into the transport-level configuration.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            program: self.program.clone(),
            timeout: self.timeout,
        }
    }

    /// Where the executable resolves to, if it exists.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        self.transport().resolve_program()
    }
}
