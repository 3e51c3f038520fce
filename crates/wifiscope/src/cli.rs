//! Clap derive structures for the `wifiscope` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wifiscope -- inspect 802.11 capture telemetry from the command line
#[derive(Debug, Parser)]
#[command(
    name = "wifiscope",
    version,
    about = "Inspect 802.11 capture telemetry from the command line",
    long_about = "Feeds a capture backend's event stream through the wifiscope state engine\n\
        and renders the resulting access points, stations and session state.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "WIFISCOPE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "WIFISCOPE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Also write logs to the configured log file
    #[arg(long, global = true)]
    pub log_to_file: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Play a recorded event log through the state engine
    #[command(alias = "r")]
    Replay(ReplayArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPLAY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON-lines event log, one `{"event": ..., "data": ...}` frame per line
    pub log: PathBuf,

    /// What to render once the log is exhausted
    #[arg(long, value_enum, default_value = "access-points")]
    pub view: ReplayView,

    /// Pause between events, e.g. "250ms" (overrides replay.interval)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Simulated agent starts out connected
    #[arg(long)]
    pub connected: bool,

    /// Issue a connect command to the configured server address
    #[arg(long)]
    pub connect: bool,

    /// Issue a start-capture command with the configured defaults
    #[arg(long)]
    pub start: bool,

    /// Simulated agent refuses every command
    #[arg(long)]
    pub reject_commands: bool,

    /// Select an access point by BSSID
    #[arg(long, value_name = "BSSID", conflicts_with = "select_sta")]
    pub select_ap: Option<String>,

    /// Select a station by MAC address
    #[arg(long, value_name = "MAC")]
    pub select_sta: Option<String>,

    /// Weakest listed signal in dBm (defaults to min_bss_creation_rssi)
    #[arg(long, value_name = "DBM", allow_hyphen_values = true)]
    pub min_signal: Option<i32>,

    /// Only list access points on this channel
    #[arg(long)]
    pub channel: Option<u32>,

    /// List every access point, including unmeasured and weak ones
    #[arg(long, conflicts_with = "min_signal")]
    pub all: bool,

    /// Print a status line to stderr on every state change
    #[arg(long)]
    pub follow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplayView {
    /// Access points, strongest first
    AccessPoints,
    /// Top-level stations
    Stations,
    /// Stations of the selected access point
    Associated,
    /// The selected performance target
    Target,
    /// Connection, capture and snapshot bookkeeping
    Session,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
