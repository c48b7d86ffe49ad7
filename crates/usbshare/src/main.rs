mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use usbshare_config::ConfigIgnoreStore;
use usbshare_core::{Controller, IgnoreListStore};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        // Config commands work without a daemon (and with a broken file)
        Command::Config(args) => commands::config_cmd::handle(args, &global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "usbshare", &mut std::io::stdout());
            Ok(())
        }

        // Status reports a missing daemon instead of failing on it
        Command::Status => {
            let cfg = config::load(&global)?;
            config::apply_defaults(&mut global, &cfg.defaults);
            commands::status::handle(&cfg, &global).await
        }

        // All other commands require a daemon
        cmd => {
            let cfg = config::load(&global)?;
            config::apply_defaults(&mut global, &cfg.defaults);
            let controller = connect(&cfg, &global)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, &global).await
        }
    }
}

/// Start a controller session with the file-backed ignore list.
fn connect(cfg: &usbshare_config::Config, global: &cli::GlobalOpts) -> Result<Controller, CliError> {
    let daemon = config::daemon_config(cfg, global)?;
    let store: Arc<dyn IgnoreListStore> =
        Arc::new(ConfigIgnoreStore::new(config::config_path(global)));
    Ok(Controller::connect(daemon, Some(store))?)
}
