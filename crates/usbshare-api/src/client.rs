// usbipd subprocess client
//
// Thin, typed wrappers around the daemon subcommands this workspace uses.
// Each method maps to exactly one invocation; none of them inspect the
// result beyond decoding it.

use tracing::debug;

use crate::error::Error;
use crate::models::{StateResponse, parse_state};
use crate::transport::{CommandOutput, TransportConfig};

/// Client for the `usbipd` executable.
#[derive(Debug, Clone, Default)]
pub struct UsbipdClient {
    transport: TransportConfig,
}

impl UsbipdClient {
    pub fn new(transport: TransportConfig) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// `true` iff the configured executable can be resolved.
    pub fn is_available(&self) -> bool {
        self.transport.resolve_program().is_some()
    }

    /// `usbipd state` -- a point-in-time snapshot of every known device.
    pub async fn state(&self) -> Result<StateResponse, Error> {
        let output = self.transport.run(["state"]).await?;
        let state = parse_state(&output.stdout)?;
        debug!(devices = state.devices.len(), "decoded daemon state");
        Ok(state)
    }

    /// `usbipd bind [-f] -b <bus_id>`.
    pub async fn bind(&self, bus_id: &str, force: bool) -> Result<CommandOutput, Error> {
        let mut args = vec!["bind"];
        if force {
            args.push("-f");
        }
        args.extend(["-b", bus_id]);
        self.transport.run(args).await
    }

    /// `usbipd unbind -b <bus_id>`.
    pub async fn unbind(&self, bus_id: &str) -> Result<CommandOutput, Error> {
        self.transport.run(["unbind", "-b", bus_id]).await
    }

    /// `usbipd --version`, trimmed.
    pub async fn version(&self) -> Result<String, Error> {
        let output = self.transport.run(["--version"]).await?;
        let version = output.stdout.trim();
        if version.is_empty() {
            return Err(Error::Deserialization {
                message: "empty version string".into(),
                body: output.stdout,
            });
        }
        Ok(version.to_owned())
    }
}
