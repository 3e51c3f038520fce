//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wifiscope_config::ConfigError;
use wifiscope_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend ──────────────────────────────────────────────────────
    #[error("Not connected to a capture agent")]
    #[diagnostic(
        code(wifiscope::not_connected),
        help(
            "Capture can only start while an agent connection exists.\n\
             Try: wifiscope replay <log> --connect --start"
        )
    )]
    NotConnected,

    #[error("{command} was rejected: {message}")]
    #[diagnostic(code(wifiscope::command_rejected))]
    CommandRejected { command: String, message: String },

    #[error("Could not attach to the backend event stream: {message}")]
    #[diagnostic(code(wifiscope::listener_setup))]
    ListenerSetup { message: String },

    #[error("The state engine shut down unexpectedly")]
    #[diagnostic(code(wifiscope::shutdown))]
    Shutdown,

    // ── Replay ───────────────────────────────────────────────────────
    #[error("Could not read event log {path}")]
    #[diagnostic(
        code(wifiscope::replay_log),
        help("The log must be JSON lines, one {{\"event\": ..., \"data\": ...}} frame per line.")
    )]
    ReplayLog {
        path: String,
        #[source]
        source: wifiscope_api::Error,
    },

    // ── Selection ────────────────────────────────────────────────────
    #[error("Nothing is selected")]
    #[diagnostic(
        code(wifiscope::no_selection),
        help("Pick an entity with --select-ap <BSSID> or --select-sta <MAC>.")
    )]
    NoSelection,

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wifiscope::not_found),
        help("Run: wifiscope replay <log> --view {list_view} to see what the log contains")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_view: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wifiscope::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(wifiscope::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(wifiscope::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(wifiscope::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(wifiscope::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Could not render TOML: {0}")]
    #[diagnostic(code(wifiscope::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("Internal error: {message}")]
    #[diagnostic(code(wifiscope::internal))]
    Internal { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotConnected => exit_code::CONNECTION,
            Self::CommandRejected { .. } => exit_code::REJECTED,
            Self::NotFound { .. } | Self::NoSelection => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidMac { value } => CliError::Validation {
                field: "MAC address".into(),
                reason: format!("{value:?} is not six colon-separated hex octets"),
            },
            CoreError::ValidationFailed { field, message } => CliError::Validation {
                field: field.into(),
                reason: message,
            },
            CoreError::NotConnected => CliError::NotConnected,
            CoreError::CommandRejected { command, message } => CliError::CommandRejected {
                command: command.into(),
                message,
            },
            CoreError::AdapterSetup { message } => CliError::ListenerSetup { message },
            CoreError::ControllerShutdown => CliError::Shutdown,
            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}
