// ── Ignore list ──
//
// Ordered, de-duplicated set of identities the user wants hidden from
// sharing actions. Membership changes only through `add` / `remove`;
// `reconcile` refreshes the runtime enrichment after each query.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{IgnoredDevice, UsbDevice, UsbId};

/// Durable storage for the ignore list as ordered `"vid:pid"` strings.
///
/// Implemented by `usbshare-config` on top of the config file. Core never
/// touches disk itself.
pub trait IgnoreListStore: Send + Sync {
    fn load(&self) -> Result<Vec<String>, CoreError>;
    fn save(&self, entries: &[String]) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    entries: IndexMap<UsbId, IgnoredDevice>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted lines. Malformed lines and repeated identities
    /// are dropped; first occurrence wins the position.
    pub fn from_persisted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for line in lines {
            match parse_entry(line.as_ref()) {
                Ok(id) => {
                    if list.entries.contains_key(&id) {
                        debug!(%id, "dropping duplicate ignore-list entry");
                    } else {
                        list.entries.insert(id.clone(), IgnoredDevice::new(id));
                    }
                }
                Err(e) => debug!(error = %e, "skipping ignore-list entry"),
            }
        }
        list
    }

    /// Persisted form, in list order.
    pub fn to_persisted(&self) -> Vec<String> {
        self.entries.keys().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &UsbId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &UsbId) -> Option<&IgnoredDevice> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IgnoredDevice> {
        self.entries.values()
    }

    /// Refresh every entry from the first live record with the same
    /// identity. Order and membership are untouched.
    pub fn reconcile(&mut self, live: &[UsbDevice]) {
        for (id, entry) in &mut self.entries {
            entry.enrich(live.iter().find(|device| device.id() == id));
        }
    }

    /// Ignore a live device. Returns `true` if the identity was new; an
    /// existing entry is refreshed in place.
    pub fn add(&mut self, device: &UsbDevice) -> Result<bool, CoreError> {
        if !device.id().is_known() {
            return Err(CoreError::UnidentifiableDevice {
                device: device.to_string(),
            });
        }
        let entry = IgnoredDevice::from_device(device);
        Ok(self.entries.insert(device.id().clone(), entry).is_none())
    }

    /// Ignore an identity that may not be plugged in right now.
    pub fn add_id(&mut self, id: UsbId) -> Result<bool, CoreError> {
        if !id.is_known() {
            return Err(CoreError::UnidentifiableDevice {
                device: id.to_string(),
            });
        }
        if self.entries.contains_key(&id) {
            return Ok(false);
        }
        self.entries.insert(id.clone(), IgnoredDevice::new(id));
        Ok(true)
    }

    /// Remove an identity, keeping the relative order of the rest.
    pub fn remove(&mut self, id: &UsbId) -> Option<IgnoredDevice> {
        self.entries.shift_remove(id)
    }
}

fn parse_entry(line: &str) -> Result<UsbId, CoreError> {
    line.parse().map_err(|_| CoreError::MalformedIgnoreEntry {
        entry: line.to_owned(),
    })
}

impl<'a> IntoIterator for &'a IgnoreList {
    type Item = &'a IgnoredDevice;
    type IntoIter = indexmap::map::Values<'a, UsbId, IgnoredDevice>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
