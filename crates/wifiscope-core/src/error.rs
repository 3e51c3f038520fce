// ── Core error types ──
//
// User-facing errors from wifiscope-core. Snapshot and status problems
// never surface here: the transition function absorbs them and reports
// an `Outcome`. What remains is command failures, input validation and
// listener setup. The `From<wifiscope_api::Error>` impl translates
// transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid MAC address: {value:?}")]
    InvalidMac { value: String },

    #[error("Invalid {field}: {message}")]
    ValidationFailed {
        field: &'static str,
        message: String,
    },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Not connected to a capture agent")]
    NotConnected,

    #[error("{command} failed: {message}")]
    CommandRejected {
        command: &'static str,
        message: String,
    },

    // ── Listener errors ──────────────────────────────────────────────
    /// Event listener registration failed. Nothing works without it.
    #[error("Event listener setup failed: {message}")]
    AdapterSetup { message: String },

    #[error("Controller has shut down")]
    ControllerShutdown,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap any failure of a backend command call.
    pub fn rejected(command: &'static str, err: impl std::fmt::Display) -> Self {
        Self::CommandRejected {
            command,
            message: err.to_string(),
        }
    }

    /// Returns `true` when the process cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AdapterSetup { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wifiscope_api::Error> for CoreError {
    fn from(err: wifiscope_api::Error) -> Self {
        match err {
            wifiscope_api::Error::Rejected { command, message } => {
                CoreError::CommandRejected { command, message }
            }
            wifiscope_api::Error::NotConnected => CoreError::NotConnected,
            wifiscope_api::Error::InvalidParameter { field, reason } => {
                CoreError::ValidationFailed {
                    field,
                    message: reason,
                }
            }
            wifiscope_api::Error::ListenerUnavailable(message) => {
                CoreError::AdapterSetup { message }
            }
            wifiscope_api::Error::ChannelClosed => CoreError::ControllerShutdown,
            wifiscope_api::Error::Io(e) => CoreError::Internal(format!("IO error: {e}")),
            wifiscope_api::Error::Deserialization { message, .. } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
