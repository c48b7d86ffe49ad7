//! Clap derive structures for the `usbshare` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// usbshare -- share local USB devices with remote clients through usbipd
#[derive(Debug, Parser)]
#[command(
    name = "usbshare",
    version,
    about = "Share local USB devices through usbipd",
    long_about = "Lists the USB devices known to the usbipd daemon, binds and unbinds\n\
        them for sharing, and keeps a persistent list of devices to ignore.\n\n\
        Every bind and unbind is verified against a fresh daemon query.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "USBSHARE_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// usbipd executable (name on PATH or full path)
    #[arg(long, env = "USBSHARE_USBIPD", global = true, value_name = "PROGRAM")]
    pub usbipd: Option<PathBuf>,

    /// usbipd timeout in seconds
    #[arg(long, env = "USBSHARE_TIMEOUT", global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "USBSHARE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

impl GlobalOpts {
    /// Selected output format, after config defaults were applied.
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    /// Selected color mode, after config defaults were applied.
    pub fn color(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, bind and unbind USB devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage the list of ignored devices
    #[command(alias = "ign")]
    Ignore(IgnoreArgs),

    /// Show daemon availability, version and a device summary
    Status,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices (ignored devices are hidden unless --all)
    #[command(alias = "ls")]
    List {
        /// Also show ignored devices
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one device in detail
    Get {
        /// Bus id (e.g. 1-4) or VID:PID (e.g. 0403:6001)
        device: String,
    },

    /// Share a device (usbipd bind)
    Bind {
        /// Bus id (e.g. 1-4) or VID:PID (e.g. 0403:6001)
        device: String,

        /// Do not force the device away from its host driver
        #[arg(long)]
        no_force: bool,
    },

    /// Stop sharing a device (usbipd unbind)
    Unbind {
        /// Bus id (e.g. 1-4) or VID:PID (e.g. 0403:6001)
        device: String,
    },
}

// ── Ignore list ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IgnoreArgs {
    #[command(subcommand)]
    pub command: IgnoreCommand,
}

#[derive(Debug, Subcommand)]
pub enum IgnoreCommand {
    /// List ignored devices
    #[command(alias = "ls")]
    List,

    /// Hide a device from sharing actions
    Add {
        /// Bus id of a connected device, or VID:PID
        device: String,
    },

    /// Stop ignoring a device
    #[command(alias = "rm")]
    Remove {
        /// Bus id of a connected device, or VID:PID
        device: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
