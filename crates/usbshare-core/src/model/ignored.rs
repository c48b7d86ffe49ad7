// ── Ignore-list entries ──

use std::fmt;

use serde::Serialize;

use super::device::UsbDevice;
use super::identity::UsbId;

/// A device the user asked to hide from sharing actions.
///
/// The identity never changes after creation. Description and bus id are
/// runtime enrichment refreshed on every reconciliation pass; neither is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredDevice {
    id: UsbId,
    description: Option<String>,
    bus_id: Option<String>,
}

impl IgnoredDevice {
    /// A bare entry, as loaded from persistence.
    pub fn new(id: UsbId) -> Self {
        Self {
            id,
            description: None,
            bus_id: None,
        }
    }

    /// An entry enriched from a live device record.
    pub fn from_device(device: &UsbDevice) -> Self {
        Self {
            id: device.id().clone(),
            description: device.description().map(str::to_owned),
            bus_id: device.bus_id().map(str::to_owned),
        }
    }

    pub fn id(&self) -> &UsbId {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn bus_id(&self) -> Option<&str> {
        self.bus_id.as_deref()
    }

    /// Currently plugged in, as of the last reconciliation.
    pub fn is_connected(&self) -> bool {
        self.bus_id.is_some()
    }

    /// Overwrite the runtime fields from a live record. Without a match the
    /// last known description survives and only the bus id is cleared.
    pub(crate) fn enrich(&mut self, device: Option<&UsbDevice>) {
        match device {
            Some(device) => {
                self.description = device.description().map(str::to_owned);
                self.bus_id = device.bus_id().map(str::to_owned);
            }
            None => self.bus_id = None,
        }
    }
}

impl fmt::Display for IgnoredDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.bus_id.as_deref().unwrap_or("none"),
            self.id,
            self.description.as_deref().unwrap_or("Unknown device"),
        )
    }
}
