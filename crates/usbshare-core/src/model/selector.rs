// ── Device selector ──
//
// How users name a device on the command line: by its current bus id
// (`1-4`) or by its hardware identity (`0403:6001`).

use std::fmt;
use std::str::FromStr;

use super::device::UsbDevice;
use super::identity::UsbId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    BusId(String),
    Id(UsbId),
}

impl DeviceSelector {
    pub fn matches(&self, device: &UsbDevice) -> bool {
        match self {
            Self::BusId(bus) => device.bus_id() == Some(bus.as_str()),
            Self::Id(id) => device.id() == id,
        }
    }

    /// First match in `devices` (which are in bus order).
    pub fn find<'a>(&self, devices: &'a [UsbDevice]) -> Option<&'a UsbDevice> {
        devices.iter().find(|device| self.matches(device))
    }
}

impl FromStr for DeviceSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<UsbId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::BusId(s.to_owned()),
        })
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusId(bus) => write!(f, "bus {bus}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}
