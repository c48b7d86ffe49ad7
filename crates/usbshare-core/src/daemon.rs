// ── Daemon adapter seam ──
//
// Everything the engine needs from the sharing daemon, behind one
// object-safe trait. The production implementation forwards to
// `UsbipdClient`; tests substitute an in-memory fake.

use std::fmt;

use async_trait::async_trait;
use usbshare_api::{CommandOutput, Error as ApiError, RawDevice, UsbipdClient};

/// A state-changing daemon subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonAction {
    /// Share the device. `force` takes it from its host driver.
    Bind { force: bool },
    /// Stop sharing the device.
    Unbind,
}

impl DaemonAction {
    /// Value the Shared flag must have once the action took effect.
    pub fn expects_shared(self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}

impl fmt::Display for DaemonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { .. } => f.write_str("bind"),
            Self::Unbind => f.write_str("unbind"),
        }
    }
}

/// Query and command interface to the sharing daemon.
///
/// Implementations do no interpretation: raw records and raw command
/// output go back to the caller untouched.
#[async_trait]
pub trait Daemon: Send + Sync {
    /// `true` iff the daemon executable can be resolved.
    fn is_available(&self) -> bool;

    /// One point-in-time snapshot of every device the daemon knows.
    async fn list_devices(&self) -> Result<Vec<RawDevice>, ApiError>;

    /// Run `action` against `bus_id`. Launch errors, non-zero exits and
    /// timeouts are all failures.
    async fn run_command(&self, action: DaemonAction, bus_id: &str)
    -> Result<CommandOutput, ApiError>;

    /// Daemon version string.
    async fn version(&self) -> Result<String, ApiError>;
}

#[async_trait]
impl Daemon for UsbipdClient {
    fn is_available(&self) -> bool {
        UsbipdClient::is_available(self)
    }

    async fn list_devices(&self) -> Result<Vec<RawDevice>, ApiError> {
        Ok(self.state().await?.devices)
    }

    async fn run_command(
        &self,
        action: DaemonAction,
        bus_id: &str,
    ) -> Result<CommandOutput, ApiError> {
        match action {
            DaemonAction::Bind { force } => self.bind(bus_id, force).await,
            DaemonAction::Unbind => self.unbind(bus_id).await,
        }
    }

    async fn version(&self) -> Result<String, ApiError> {
        UsbipdClient::version(self).await
    }
}
