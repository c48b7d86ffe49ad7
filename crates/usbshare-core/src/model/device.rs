// ── Device domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identity::UsbId;

/// Connection state derived from three presence facts: a bus id
/// (connected), a persisted GUID (shared) and a client address (attached).
///
/// Only five combinations are legal. Anything else is `Unknown`, which
/// presentation must surface as an anomaly rather than hide.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[strum(to_string = "none")]
    None,
    #[strum(to_string = "persisted")]
    DisconnectedPersisted,
    #[strum(to_string = "not shared")]
    ConnectedNotShared,
    #[strum(to_string = "shared")]
    ConnectedShared,
    #[strum(to_string = "attached")]
    ConnectedAttached,
    #[strum(to_string = "unknown")]
    Unknown,
}

impl ConnectionState {
    /// Total mapping from the presence facts to a state.
    pub fn derive(connected: bool, shared: bool, attached: bool) -> Self {
        match (connected, shared, attached) {
            (false, false, false) => Self::None,
            (false, true, false) => Self::DisconnectedPersisted,
            (true, false, false) => Self::ConnectedNotShared,
            (true, true, false) => Self::ConnectedShared,
            (true, true, true) => Self::ConnectedAttached,
            _ => Self::Unknown,
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(
            self,
            Self::ConnectedNotShared | Self::ConnectedShared | Self::ConnectedAttached
        )
    }

    pub fn is_shared(self) -> bool {
        matches!(
            self,
            Self::DisconnectedPersisted | Self::ConnectedShared | Self::ConnectedAttached
        )
    }

    pub fn is_attached(self) -> bool {
        matches!(self, Self::ConnectedAttached)
    }

    /// `true` for the two states that never reach a presentation group.
    pub fn is_unclassified(self) -> bool {
        matches!(self, Self::None | Self::Unknown)
    }
}

/// Constructor input for [`UsbDevice`].
///
/// Blank strings are treated the same as absent ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFields {
    pub id: UsbId,
    pub bus_id: Option<String>,
    pub client_address: Option<String>,
    pub description: Option<String>,
    pub instance_id: Option<String>,
    pub is_forced: bool,
    pub persisted_guid: Option<String>,
    pub stub_instance_id: Option<String>,
}

/// One device as reported by the daemon, with its derived state.
///
/// Immutable: the state is computed once at construction and can never
/// disagree with the presence facts it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbDevice {
    id: UsbId,
    bus_id: Option<String>,
    client_address: Option<String>,
    description: Option<String>,
    instance_id: Option<String>,
    is_forced: bool,
    persisted_guid: Option<String>,
    stub_instance_id: Option<String>,
    state: ConnectionState,
}

impl UsbDevice {
    pub fn new(fields: DeviceFields) -> Self {
        let bus_id = non_blank(fields.bus_id);
        let client_address = non_blank(fields.client_address);
        let persisted_guid = non_blank(fields.persisted_guid);
        let state = ConnectionState::derive(
            bus_id.is_some(),
            persisted_guid.is_some(),
            client_address.is_some(),
        );
        Self {
            id: fields.id,
            bus_id,
            client_address,
            description: non_blank(fields.description),
            instance_id: non_blank(fields.instance_id),
            is_forced: fields.is_forced,
            persisted_guid,
            stub_instance_id: non_blank(fields.stub_instance_id),
            state,
        }
    }

    pub fn id(&self) -> &UsbId {
        &self.id
    }

    pub fn bus_id(&self) -> Option<&str> {
        self.bus_id.as_deref()
    }

    pub fn client_address(&self) -> Option<&str> {
        self.client_address.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    pub fn is_forced(&self) -> bool {
        self.is_forced
    }

    pub fn persisted_guid(&self) -> Option<&str> {
        self.persisted_guid.as_deref()
    }

    pub fn stub_instance_id(&self) -> Option<&str> {
        self.stub_instance_id.as_deref()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.bus_id.is_some()
    }

    /// The "Shared" flag: the daemon holds a persisted binding.
    pub fn is_shared(&self) -> bool {
        self.persisted_guid.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.client_address.is_some()
    }
}

impl fmt::Display for UsbDevice {
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

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
