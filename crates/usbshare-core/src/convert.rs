// ── Raw → domain conversion ──
//
// Turns `usbipd state` records into `UsbDevice`s and puts them in bus
// order. Identity extraction and blank-string handling live in the model
// constructors; this module only wires raw fields through and sorts.

use std::cmp::Ordering;

use tracing::warn;
use usbshare_api::RawDevice;

use crate::model::{ConnectionState, DeviceFields, UsbDevice, UsbId};

impl From<RawDevice> for UsbDevice {
    fn from(raw: RawDevice) -> Self {
        let id = UsbId::from_instance_id(raw.instance_id.as_deref());
        let device = UsbDevice::new(DeviceFields {
            id,
            bus_id: raw.bus_id,
            client_address: raw.client_ip_address,
            description: raw.description,
            instance_id: raw.instance_id,
            is_forced: raw.is_forced,
            persisted_guid: raw.persisted_guid,
            stub_instance_id: raw.stub_instance_id,
        });
        if device.state() == ConnectionState::Unknown {
            warn!(
                device = %device,
                bus_id = ?device.bus_id(),
                persisted = device.is_shared(),
                client = ?device.client_address(),
                "device reported an impossible combination of connection facts"
            );
        }
        device
    }
}

/// Convert a full daemon snapshot into bus-ordered device records.
pub fn derive_devices(raw: Vec<RawDevice>) -> Vec<UsbDevice> {
    let mut devices: Vec<UsbDevice> = raw.into_iter().map(UsbDevice::from).collect();
    sort_by_bus(&mut devices);
    devices
}

/// Stable ascending sort on [`bus_sort_key`].
pub fn sort_by_bus(devices: &mut [UsbDevice]) {
    devices.sort_by(|a, b| compare_bus(a.bus_id(), b.bus_id()));
}

fn compare_bus(a: Option<&str>, b: Option<&str>) -> Ordering {
    bus_sort_key(a).total_cmp(&bus_sort_key(b))
}

/// Bus id read as a decimal number with `-` as the separator, so `1-2`
/// becomes `1.2` and `1-10` becomes `1.1`. Missing or unparseable ids
/// sort as `0`.
pub fn bus_sort_key(bus_id: Option<&str>) -> f32 {
    bus_id
        .and_then(|bus| bus.trim().replace('-', ".").parse::<f32>().ok())
        .unwrap_or(0.0)
}
