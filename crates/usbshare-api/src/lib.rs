// usbshare-api: Async subprocess client for the usbipd daemon.
//
// Everything here is transport: launching the executable, enforcing the
// timeout, capturing output and decoding the raw `usbipd state` JSON.
// No device semantics live in this crate -- see `usbshare-core`.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::UsbipdClient;
pub use error::Error;
pub use models::{RawDevice, StateResponse};
pub use transport::{CommandOutput, TransportConfig};
