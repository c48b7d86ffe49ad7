// ── Visible-set projection ──
//
// Splits one reconciled snapshot into the groups presentation renders:
// connected devices (by share state), persisted-but-unplugged devices,
// ignored devices (plugged / unplugged) and anything unclassifiable.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ignore::IgnoreList;
use crate::model::{ConnectionState, IgnoredDevice, UsbDevice, UsbId};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceView {
    /// Visible connected devices, in bus order.
    pub connected: Vec<UsbDevice>,
    /// Visible devices the daemon still shares while unplugged.
    pub persisted: Vec<UsbDevice>,
    /// Ignored identities currently plugged in, in ignore-list order.
    pub ignored_connected: Vec<IgnoredDevice>,
    /// Ignored identities not plugged in, in ignore-list order.
    pub ignored_disconnected: Vec<IgnoredDevice>,
    /// Visible devices in state `None` or `Unknown`.
    pub unclassified: Vec<UsbDevice>,
    /// When the snapshot behind this view was taken.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl DeviceView {
    /// Partition `live` (already reconciled into `ignored`, already bus
    /// ordered) into presentation groups.
    ///
    /// Live records with an ignored identity are left out of every visible
    /// group. The visible set holds one record per identity: the first in
    /// bus order wins, and unidentifiable (`-:-`) records collapse the same
    /// way.
    pub fn project(live: &[UsbDevice], ignored: &IgnoreList) -> Self {
        let mut view = Self::default();
        let mut seen: HashSet<&UsbId> = HashSet::new();

        for device in live {
            if ignored.contains(device.id()) {
                continue;
            }
            if !seen.insert(device.id()) {
                continue;
            }
            match device.state() {
                ConnectionState::ConnectedNotShared
                | ConnectionState::ConnectedShared
                | ConnectionState::ConnectedAttached => view.connected.push(device.clone()),
                ConnectionState::DisconnectedPersisted => view.persisted.push(device.clone()),
                ConnectionState::None | ConnectionState::Unknown => {
                    view.unclassified.push(device.clone());
                }
            }
        }

        let (plugged, unplugged): (Vec<_>, Vec<_>) =
            ignored.iter().cloned().partition(IgnoredDevice::is_connected);
        view.ignored_connected = plugged;
        view.ignored_disconnected = unplugged;
        view
    }

    pub fn not_shared(&self) -> impl Iterator<Item = &UsbDevice> {
        self.connected_in(ConnectionState::ConnectedNotShared)
    }

    pub fn shared(&self) -> impl Iterator<Item = &UsbDevice> {
        self.connected_in(ConnectionState::ConnectedShared)
    }

    pub fn attached(&self) -> impl Iterator<Item = &UsbDevice> {
        self.connected_in(ConnectionState::ConnectedAttached)
    }

    fn connected_in(&self, state: ConnectionState) -> impl Iterator<Item = &UsbDevice> {
        self.connected.iter().filter(move |d| d.state() == state)
    }

    /// Every visible (non-ignored) device: connected, then persisted, then
    /// unclassified.
    pub fn visible(&self) -> impl Iterator<Item = &UsbDevice> {
        self.connected
            .iter()
            .chain(&self.persisted)
            .chain(&self.unclassified)
    }

    /// Total number of rows across every group.
    pub fn len(&self) -> usize {
        self.connected.len()
            + self.persisted.len()
            + self.unclassified.len()
            + self.ignored_connected.len()
            + self.ignored_disconnected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
