//! Shared helpers for command handlers.

use std::io::IsTerminal;

use usbshare_core::{Controller, DeviceSelector, UsbDevice};

use crate::error::CliError;

/// Parse a device argument: `vid:pid` selects by identity, anything else
/// is taken as a bus id.
pub fn parse_selector(raw: &str) -> DeviceSelector {
    let Ok(selector) = raw.parse::<DeviceSelector>();
    selector
}

/// Resolve a device argument against a fresh daemon query.
pub async fn resolve_device(controller: &Controller, raw: &str) -> Result<UsbDevice, CliError> {
    let selector = parse_selector(raw);
    Ok(controller.find(&selector).await?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, the operation is refused instead of
/// silently going ahead.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Render an optional field for detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
