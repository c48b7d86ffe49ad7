//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use usbshare_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for the daemon settings, starting from `cfg`'s values.
fn prompt_daemon(cfg: &mut Config) -> Result<(), CliError> {
    cfg.daemon.program = Input::new()
        .with_prompt("usbipd executable")
        .default(cfg.daemon.program.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.daemon.timeout_secs = Input::new()
        .with_prompt("Timeout (seconds)")
        .default(cfg.daemon.timeout_secs)
        .validate_with(|secs: &u64| {
            if *secs == 0 {
                Err("must be at least 1")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(prompt_err)?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        // ── Init: guided setup ──────────────────────────────────────
        ConfigCommand::Init => {
            // Keep the ignore list of a file being replaced. An unreadable
            // file is an error rather than a silent reset.
            let ignored_devices = usbshare_config::load_config_file(&path)?.ignored_devices;
            if path.exists() {
                let prompt = format!("{} already exists. Overwrite?", path.display());
                if !util::confirm("overwrite config", &prompt, global.yes)? {
                    output::print_status("Aborted", global.quiet);
                    return Ok(());
                }
            }

            let mut cfg = Config {
                ignored_devices,
                ..Config::default()
            };
            if let Some(ref program) = global.usbipd {
                cfg.daemon.program = program.display().to_string();
            }
            if let Some(timeout) = global.timeout {
                cfg.daemon.timeout_secs = timeout;
            }

            if !global.yes && std::io::stdin().is_terminal() {
                eprintln!("usbshare configuration");
                eprintln!("  Config path: {}\n", path.display());
                prompt_daemon(&mut cfg)?;
            }

            // Reject values the daemon config would refuse later
            cfg.daemon_config()?;
            usbshare_config::save_config(&cfg, &path)?;

            output::print_status(
                &format!("Configuration written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = match global.output() {
                OutputFormat::Table => toml::to_string_pretty(&cfg).map_err(|e| {
                    CliError::Internal(format!("failed to render config: {e}"))
                })?,
                structured => output::render_single(
                    &structured,
                    &cfg,
                    |c| format!("{c:#?}"),
                    |_| path.display().to_string(),
                ),
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
