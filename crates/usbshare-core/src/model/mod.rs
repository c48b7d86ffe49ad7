// ── Domain model ──
//
// Canonical, validated types every consumer works with. Raw daemon records
// are converted into these by `crate::convert`.

pub mod device;
pub mod identity;
pub mod ignored;
pub mod selector;

pub use device::{ConnectionState, DeviceFields, UsbDevice};
pub use identity::{ParseUsbIdError, UsbId};
pub use ignored::IgnoredDevice;
pub use selector::DeviceSelector;
