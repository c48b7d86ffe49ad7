// ── Controller abstraction ──
//
// Session facade over one sharing daemon. Queries the daemon, reconciles
// the ignore list, publishes the visible set and runs verified bind /
// unbind commands.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use usbshare_api::UsbipdClient;

use crate::command::verify::check_post_condition;
use crate::command::{Command, CommandResult};
use crate::config::DaemonConfig;
use crate::convert::derive_devices;
use crate::daemon::{Daemon, DaemonAction};
use crate::error::CoreError;
use crate::ignore::{IgnoreList, IgnoreListStore};
use crate::model::{DeviceSelector, IgnoredDevice, UsbDevice, UsbId};
use crate::store::DeviceStore;
use crate::view::DeviceView;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Every operation is
/// request/response: nothing polls in the background.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DaemonConfig,
    daemon: Arc<dyn Daemon>,
    store: Arc<DeviceStore>,
    ignore_store: Option<Arc<dyn IgnoreListStore>>,
    /// Held across a daemon command and its verification query, and
    /// across refreshes, so passes never interleave.
    daemon_lock: Mutex<()>,
}

impl Controller {
    /// Assemble a controller around an already-built daemon adapter and
    /// ignore list. Performs no I/O.
    pub fn with_daemon(
        daemon: Arc<dyn Daemon>,
        config: DaemonConfig,
        ignored: IgnoreList,
        ignore_store: Option<Arc<dyn IgnoreListStore>>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                daemon,
                store: Arc::new(DeviceStore::new(ignored)),
                ignore_store,
                daemon_lock: Mutex::new(()),
            }),
        }
    }

    /// Start a session against the `usbipd` executable described by
    /// `config`.
    ///
    /// Fails with [`CoreError::DaemonUnavailable`] if the executable cannot
    /// be found, and with [`CoreError::Persistence`] if the stored ignore
    /// list cannot be read.
    pub fn connect(
        config: DaemonConfig,
        ignore_store: Option<Arc<dyn IgnoreListStore>>,
    ) -> Result<Self, CoreError> {
        let daemon: Arc<dyn Daemon> = Arc::new(UsbipdClient::new(config.transport()));
        Self::connect_with(daemon, config, ignore_store)
    }

    /// [`connect()`](Self::connect) with an injected daemon adapter.
    pub fn connect_with(
        daemon: Arc<dyn Daemon>,
        config: DaemonConfig,
        ignore_store: Option<Arc<dyn IgnoreListStore>>,
    ) -> Result<Self, CoreError> {
        if !daemon.is_available() {
            return Err(CoreError::DaemonUnavailable {
                program: config.program.display().to_string(),
            });
        }

        let ignored = match &ignore_store {
            Some(store) => IgnoreList::from_persisted(store.load()?),
            None => IgnoreList::new(),
        };
        info!(
            program = %config.program.display(),
            ignored = ignored.len(),
            "connected to usbipd"
        );

        Ok(Self::with_daemon(daemon, config, ignored, ignore_store))
    }

    /// Access the daemon configuration.
    pub fn config(&self) -> &DaemonConfig {
        &self.inner.config
    }


    // ── Queries ──────────────────────────────────────────────────

    /// Fresh, bus-ordered device records.
    ///
    /// Fails softly: an unreachable daemon or malformed output yields an
    /// empty list, which means "state unknown", not "no devices".
    pub async fn devices(&self) -> Vec<UsbDevice> {
        match self.try_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "device query failed, treating state as unknown");
                Vec::new()
            }
        }
    }

    /// [`devices()`](Self::devices) that reports why the query failed.
    pub async fn try_devices(&self) -> Result<Vec<UsbDevice>, CoreError> {
        let raw = self.inner.daemon.list_devices().await?;
        let devices = derive_devices(raw);
        debug!(count = devices.len(), "derived device records");
        Ok(devices)
    }

    /// Query, reconcile and publish a new [`DeviceView`].
    ///
    /// A failed query publishes a view with no live devices. The ignore
    /// list is not reconciled against it, so entries keep their last known
    /// bus id and description.
    pub async fn refresh(&self) -> Arc<DeviceView> {
        let _guard = self.inner.daemon_lock.lock().await;
        match self.try_devices().await {
            Ok(live) => self.inner.store.apply_snapshot(&live).await,
            Err(e) => {
                warn!(error = %e, "device query failed, treating state as unknown");
                self.inner.store.apply_unavailable().await
            }
        }
    }

    /// [`refresh()`](Self::refresh) that leaves the published view alone
    /// and returns the error when the query fails.
    pub async fn try_refresh(&self) -> Result<Arc<DeviceView>, CoreError> {
        let _guard = self.inner.daemon_lock.lock().await;
        let live = self.try_devices().await?;
        Ok(self.inner.store.apply_snapshot(&live).await)
    }

    /// The last published view.
    pub fn view(&self) -> Arc<DeviceView> {
        self.inner.store.view_snapshot()
    }

    /// Subscribe to published views.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DeviceView>> {
        self.inner.store.subscribe()
    }

    /// Resolve a selector against a fresh query.
    pub async fn find(&self, selector: &DeviceSelector) -> Result<UsbDevice, CoreError> {
        let devices = self.try_devices().await?;
        selector
            .find(&devices)
            .cloned()
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: selector.to_string(),
            })
    }

    /// Current ignore-list entries, in list order.
    pub async fn ignored(&self) -> Vec<IgnoredDevice> {
        self.inner
            .store
            .ignored_snapshot()
            .await
            .iter()
            .cloned()
            .collect()
    }

    /// `usbipd --version`, if the daemon answers.
    pub async fn daemon_version(&self) -> Option<String> {
        match self.inner.daemon.version().await {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(error = %e, "could not read usbipd version");
                None
            }
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command.
    ///
    /// Daemon commands hold the daemon lock from invocation through
    /// verification; ignore-list commands are persisted before the
    /// in-memory list changes.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        debug!(command = cmd.verb(), "executing command");
        match cmd {
            Command::BindDevice { device, force } => self
                .run_daemon_command(&device, DaemonAction::Bind { force })
                .await
                .map(CommandResult::Device),
            Command::UnbindDevice { device } => self
                .run_daemon_command(&device, DaemonAction::Unbind)
                .await
                .map(CommandResult::Device),
            Command::IgnoreDevice { device } => {
                self.update_ignored(|list| {
                    let added = list.add(&device)?;
                    Ok(added.then(|| IgnoredDevice::from_device(&device)))
                })
                .await
            }
            Command::IgnoreId { id } => {
                self.update_ignored(|list| {
                    let added = list.add_id(id.clone())?;
                    Ok(added.then(|| IgnoredDevice::new(id)))
                })
                .await
            }
            Command::UnignoreId { id } => self.update_ignored(|list| Ok(list.remove(&id))).await,
        }
    }

    /// Share a device. `false` on any failure (already logged).
    pub async fn bind(&self, device: &UsbDevice) -> bool {
        let cmd = Command::BindDevice {
            device: device.clone(),
            force: self.inner.config.force_bind,
        };
        self.execute_logged(cmd).await
    }

    /// Stop sharing a device. `false` on any failure (already logged).
    pub async fn unbind(&self, device: &UsbDevice) -> bool {
        let cmd = Command::UnbindDevice {
            device: device.clone(),
        };
        self.execute_logged(cmd).await
    }

    /// Add a live device to the ignore list and persist it. Returns `true`
    /// if the identity was new.
    pub async fn ignore(&self, device: &UsbDevice) -> Result<bool, CoreError> {
        let result = self
            .execute(Command::IgnoreDevice {
                device: device.clone(),
            })
            .await?;
        Ok(matches!(result, CommandResult::Ignored(_)))
    }

    /// Remove an identity from the ignore list and persist it. Returns
    /// `true` if it was present.
    pub async fn unignore(&self, id: &UsbId) -> Result<bool, CoreError> {
        let result = self.execute(Command::UnignoreId { id: id.clone() }).await?;
        Ok(matches!(result, CommandResult::Ignored(_)))
    }

    async fn execute_logged(&self, cmd: Command) -> bool {
        let verb = cmd.verb();
        match self.execute(cmd).await {
            Ok(_) => true,
            Err(e) => {
                warn!(command = verb, error = %e, "command failed");
                false
            }
        }
    }

    /// Invoke, re-query, verify. The verification snapshot is also
    /// published, so subscribers see the outcome without another query.
    async fn run_daemon_command(
        &self,
        device: &UsbDevice,
        action: DaemonAction,
    ) -> Result<UsbDevice, CoreError> {
        let failed = |bus_id: &str, reason: String| CoreError::CommandFailed {
            action: action.to_string(),
            bus_id: bus_id.to_owned(),
            reason,
        };

        let Some(bus_id) = device.bus_id() else {
            return Err(failed("none", format!("{} is not connected", device.id())));
        };

        let _guard = self.inner.daemon_lock.lock().await;
        info!(%action, bus_id, id = %device.id(), "running usbipd command");

        self.inner
            .daemon
            .run_command(action, bus_id)
            .await
            .map_err(|e| failed(bus_id, e.to_string()))?;

        let fresh = self
            .try_devices()
            .await
            .map_err(|e| failed(bus_id, format!("could not verify: {e}")))?;
        self.inner.store.apply_snapshot(&fresh).await;

        let verified = check_post_condition(&fresh, action, bus_id)?;
        info!(%action, bus_id, state = %verified.state(), "usbipd command verified");
        Ok(verified)
    }

    /// Apply `change` to a copy of the ignore list, persist the copy if
    /// its membership changed, then swap it in.
    ///
    /// `change` returns the affected entry when membership changed, `None`
    /// when it did not.
    async fn update_ignored<F>(&self, change: F) -> Result<CommandResult, CoreError>
    where
        F: FnOnce(&mut IgnoreList) -> Result<Option<IgnoredDevice>, CoreError>,
    {
        let mut current = self.inner.store.lock_ignored().await;
        let mut next = current.clone();
        let changed = change(&mut next)?;

        if let (Some(_), Some(store)) = (&changed, &self.inner.ignore_store) {
            store.save(&next.to_persisted())?;
        }
        *current = next;

        Ok(match changed {
            Some(entry) => {
                info!(id = %entry.id(), total = current.len(), "ignore list updated");
                CommandResult::Ignored(entry)
            }
            None => CommandResult::Unchanged,
        })
    }
}
