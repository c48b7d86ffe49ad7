//! Device state model and reconciliation engine between `usbshare-api` and
//! presentation layers (CLI, tray, ...).
//!
//! - **[`Controller`]**: Central facade. [`connect()`](Controller::connect)
//!   probes the daemon and loads the persisted ignore list;
//!   [`refresh()`](Controller::refresh) queries the daemon, reconciles the
//!   ignore list and publishes a fresh [`DeviceView`];
//!   [`bind()`](Controller::bind) / [`unbind()`](Controller::unbind) issue a
//!   daemon command and verify its effect by re-querying.
//!
//! - **[`Daemon`]**: The adapter seam. Implemented for
//!   [`usbshare_api::UsbipdClient`]; tests plug in canned fakes.
//!
//! - **Domain model** ([`model`]): [`UsbId`] hardware identity,
//!   [`UsbDevice`] with its derived [`ConnectionState`], and the
//!   [`IgnoredDevice`] entries of the [`IgnoreList`].
//!
//! - **[`DeviceView`]**: The partitioned, ordered set of visible devices
//!   handed to presentation.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod daemon;
pub mod error;
pub mod ignore;
pub mod model;
pub mod store;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::DaemonConfig;
pub use controller::Controller;
pub use daemon::{Daemon, DaemonAction};
pub use error::CoreError;
pub use ignore::{IgnoreList, IgnoreListStore};
pub use store::DeviceStore;
pub use view::DeviceView;

pub use model::{
    ConnectionState, DeviceFields, DeviceSelector, IgnoredDevice, UsbDevice, UsbId,
};
