use thiserror::Error;

/// Top-level error type for the `wifiscope-api` crate.
///
/// Covers every failure a backend call can surface: command rejection,
/// parameter validation, listener registration, and the replay log.
/// `wifiscope-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Commands ────────────────────────────────────────────────────
    /// The backend refused the command (agent unreachable, capture failure, ...).
    #[error("Backend rejected {command}: {message}")]
    Rejected {
        command: &'static str,
        message: String,
    },

    /// The command needs an agent connection that does not exist.
    #[error("Backend is not connected to a capture agent")]
    NotConnected,

    /// A command parameter was refused before anything was sent.
    #[error("Invalid {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    // ── Events ──────────────────────────────────────────────────────
    /// Event listener registration failed.
    #[error("Event listener unavailable: {0}")]
    ListenerUnavailable(String),

    /// The event channel was closed by the other side.
    #[error("Event channel closed")]
    ChannelClosed,

    // ── Data ────────────────────────────────────────────────────────
    /// Reading a replay log or other local resource failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding failed, with the offending input for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::NotConnected)
    }

    /// Name of the command this error belongs to, if any.
    pub fn command(&self) -> Option<&'static str> {
        match self {
            Self::Rejected { command, .. } => Some(command),
            _ => None,
        }
    }
}
