// ── Command API ──
//
// All write operations flow through a unified `Command` enum. Daemon
// commands (bind / unbind) are verified against a fresh query before they
// count as done; ignore-list commands are persisted before they count.

pub(crate) mod verify;

use crate::model::{IgnoredDevice, UsbDevice, UsbId};

/// All state-changing operations the engine supports.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Daemon operations ────────────────────────────────────────────
    BindDevice {
        device: UsbDevice,
        force: bool,
    },
    UnbindDevice {
        device: UsbDevice,
    },

    // ── Ignore-list operations ───────────────────────────────────────
    IgnoreDevice {
        device: UsbDevice,
    },
    IgnoreId {
        id: UsbId,
    },
    UnignoreId {
        id: UsbId,
    },
}

impl Command {
    /// Short verb for logs and error messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::BindDevice { .. } => "bind",
            Self::UnbindDevice { .. } => "unbind",
            Self::IgnoreDevice { .. } | Self::IgnoreId { .. } => "ignore",
            Self::UnignoreId { .. } => "unignore",
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// The daemon command took effect; carries the verified fresh record.
    Device(UsbDevice),
    /// The ignore list changed; carries the affected entry.
    Ignored(IgnoredDevice),
    /// Nothing to do: the identity was already (or was never) ignored.
    Unchanged,
}
