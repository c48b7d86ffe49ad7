//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod ignore;
pub mod status;
pub mod util;

use usbshare_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a daemon-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::Ignore(args) => ignore::handle(controller, args, global).await,
        // Status, Config and Completions are handled before dispatch
        Command::Status | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
