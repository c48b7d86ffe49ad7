//! Ignore-list command handlers.

use tabled::Tabled;
use usbshare_core::{
    Command as CoreCommand, CommandResult, Controller, DeviceSelector, IgnoredDevice,
};

use crate::cli::{GlobalOpts, IgnoreArgs, IgnoreCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct IgnoredRow {
    #[tabled(rename = "VID:PID")]
    id: String,
    #[tabled(rename = "BUS ID")]
    bus_id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

impl From<&IgnoredDevice> for IgnoredRow {
    fn from(d: &IgnoredDevice) -> Self {
        Self {
            id: d.id().to_string(),
            bus_id: d.bus_id().unwrap_or_default().to_owned(),
            description: d.description().unwrap_or_default().to_owned(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: IgnoreArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        IgnoreCommand::List => {
            // Refresh first so connected entries carry their bus id
            let view = controller.refresh().await;
            let entries: Vec<IgnoredDevice> = view
                .ignored_connected
                .iter()
                .chain(&view.ignored_disconnected)
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output(),
                &entries,
                |d| IgnoredRow::from(d),
                |d| d.id().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IgnoreCommand::Add { device } => {
            let selector = util::parse_selector(&device);
            let live = controller.devices().await;
            let cmd = match (selector.find(&live), &selector) {
                (Some(found), _) => CoreCommand::IgnoreDevice {
                    device: found.clone(),
                },
                // Unplugged devices can still be ignored by identity
                (None, DeviceSelector::Id(id)) => CoreCommand::IgnoreId { id: id.clone() },
                (None, DeviceSelector::BusId(_)) => {
                    return Err(CliError::NotFound {
                        resource_type: "device".into(),
                        identifier: device,
                        list_command: "devices list".into(),
                    });
                }
            };

            match controller.execute(cmd).await? {
                CommandResult::Ignored(entry) => {
                    output::print_status(&format!("Ignoring {entry}"), global.quiet);
                }
                _ => output::print_status(&format!("{selector} is already ignored"), global.quiet),
            }
            Ok(())
        }

        IgnoreCommand::Remove { device } => {
            let id = match util::parse_selector(&device) {
                DeviceSelector::Id(id) => id,
                selector @ DeviceSelector::BusId(_) => controller.find(&selector).await?.id().clone(),
            };

            match controller.execute(CoreCommand::UnignoreId { id }).await? {
                CommandResult::Ignored(entry) => {
                    output::print_status(&format!("No longer ignoring {entry}"), global.quiet);
                    Ok(())
                }
                _ => Err(CliError::NotFound {
                    resource_type: "ignored device".into(),
                    identifier: device,
                    list_command: "ignore list".into(),
                }),
            }
        }
    }
}
