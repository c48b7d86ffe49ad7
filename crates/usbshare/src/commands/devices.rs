//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;
use usbshare_core::{
    Command as CoreCommand, CommandResult, ConnectionState, Controller, IgnoredDevice, UsbDevice,
};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── List entry ──────────────────────────────────────────────────────

/// One row of `devices list`: a live device or an ignore-list entry.
#[derive(Debug, Serialize)]
struct DeviceEntry {
    bus_id: Option<String>,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<ConnectionState>,
    description: Option<String>,
    client_address: Option<String>,
    ignored: bool,
}

impl From<&UsbDevice> for DeviceEntry {
    fn from(d: &UsbDevice) -> Self {
        Self {
            bus_id: d.bus_id().map(str::to_owned),
            id: d.id().to_string(),
            state: Some(d.state()),
            description: d.description().map(str::to_owned),
            client_address: d.client_address().map(str::to_owned),
            ignored: false,
        }
    }
}

impl From<&IgnoredDevice> for DeviceEntry {
    fn from(d: &IgnoredDevice) -> Self {
        Self {
            bus_id: d.bus_id().map(str::to_owned),
            id: d.id().to_string(),
            state: None,
            description: d.description().map(str::to_owned),
            client_address: None,
            ignored: true,
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "BUS ID")]
    bus_id: String,
    #[tabled(rename = "VID:PID")]
    id: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "CLIENT")]
    client: String,
}

impl DeviceRow {
    fn new(entry: &DeviceEntry, color: bool) -> Self {
        let state = match entry.state {
            Some(state) if !entry.ignored => output::state_label(state, color),
            _ => output::ignored_label(color),
        };
        Self {
            bus_id: entry.bus_id.clone().unwrap_or_default(),
            id: entry.id.clone(),
            state,
            description: entry.description.clone().unwrap_or_default(),
            client: entry.client_address.clone().unwrap_or_default(),
        }
    }
}

fn detail(d: &UsbDevice, ignored: bool) -> String {
    let mut lines = vec![
        format!("Bus ID:        {}", util::or_dash(d.bus_id())),
        format!("VID:PID:       {}", d.id()),
        format!("State:         {}", d.state()),
        format!("Description:   {}", util::or_dash(d.description())),
        format!("Client:        {}", util::or_dash(d.client_address())),
        format!("Instance ID:   {}", util::or_dash(d.instance_id())),
        format!("Persisted:     {}", util::or_dash(d.persisted_guid())),
        format!("Stub instance: {}", util::or_dash(d.stub_instance_id())),
        format!("Forced:        {}", d.is_forced()),
    ];
    if ignored {
        lines.push("Ignored:       true".into());
    }
    lines.join("\n")
}

/// Identifier for plain output: the bus id, else the hardware identity.
fn entry_id(entry: &DeviceEntry) -> String {
    entry.bus_id.clone().unwrap_or_else(|| entry.id.clone())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output();
    let color = output::should_color(&global.color());

    match args.command {
        DevicesCommand::List { all } => {
            let view = controller.try_refresh().await?;
            let mut entries: Vec<DeviceEntry> = view.visible().map(DeviceEntry::from).collect();
            if all {
                entries.extend(
                    view.ignored_connected
                        .iter()
                        .chain(&view.ignored_disconnected)
                        .map(DeviceEntry::from),
                );
            }

            let out = output::render_list(
                &format,
                &entries,
                |e| DeviceRow::new(e, color),
                entry_id,
            );
            output::print_output(&out, global.quiet);

            let hidden = view.ignored_connected.len() + view.ignored_disconnected.len();
            if !all && hidden > 0 {
                output::print_status(
                    &format!("{hidden} ignored device(s) hidden, use --all to show them"),
                    global.quiet,
                );
            }
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = util::resolve_device(controller, &device).await?;
            let ignored = controller
                .ignored()
                .await
                .iter()
                .any(|entry| entry.id() == found.id());
            let out = output::render_single(
                &format,
                &found,
                |d| detail(d, ignored),
                |d| d.bus_id().unwrap_or_default().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Bind { device, no_force } => {
            let found = util::resolve_device(controller, &device).await?;
            if found.is_connected() && found.is_shared() {
                output::print_status(&format!("{found} is already shared"), global.quiet);
                return Ok(());
            }

            let force = controller.config().force_bind && !no_force;
            let result = controller
                .execute(CoreCommand::BindDevice {
                    device: found,
                    force,
                })
                .await?;
            if let CommandResult::Device(fresh) = result {
                output::print_status(&format!("Shared {fresh}"), global.quiet);
            }
            Ok(())
        }

        DevicesCommand::Unbind { device } => {
            let found = util::resolve_device(controller, &device).await?;
            if !found.is_shared() {
                output::print_status(&format!("{found} is not shared"), global.quiet);
                return Ok(());
            }

            if let Some(client) = found.client_address() {
                let prompt = format!("{found} is attached to {client}. Unbind anyway?");
                if !util::confirm("unbind attached device", &prompt, global.yes)? {
                    output::print_status("Aborted", global.quiet);
                    return Ok(());
                }
            }

            let result = controller
                .execute(CoreCommand::UnbindDevice { device: found })
                .await?;
            if let CommandResult::Device(fresh) = result {
                output::print_status(&format!("Stopped sharing {fresh}"), global.quiet);
            }
            Ok(())
        }
    }
}
