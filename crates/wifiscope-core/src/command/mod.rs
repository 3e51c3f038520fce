// ── Command API ──
//
// Every backend command goes through the `Command` enum. The controller
// applies the matching optimistic hint, awaits the backend, and reverts
// the hint if the call fails.

pub mod requests;

use crate::error::CoreError;
use crate::store::StoreAction;

pub use requests::{BANDWIDTHS_MHZ, CHANNELS_5GHZ, StartCaptureRequest, parse_bandwidth};

/// All state-changing operations against the capture backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartCapture(StartCaptureRequest),
    StopCapture,
    Connect { server_address: String },
    Disconnect,
}

impl Command {
    /// Backend command name, as used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartCapture(_) => "start_capture",
            Self::StopCapture => "stop_capture",
            Self::Connect { .. } => "connect",
            Self::Disconnect => "disconnect",
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::StartCapture(req) => req.validate(),
            Self::Connect { server_address } if server_address.trim().is_empty() => {
                Err(CoreError::ValidationFailed {
                    field: "server_address",
                    message: "server address must not be empty".into(),
                })
            }
            Self::Connect { .. } | Self::StopCapture | Self::Disconnect => Ok(()),
        }
    }

    /// The hint to set before the call, and the action that reverts it.
    pub(crate) fn optimistic(&self) -> (StoreAction, StoreAction) {
        match self {
            Self::StartCapture(_) => (
                StoreAction::SetCapturingOptimistic(true),
                StoreAction::ClearCapturingOptimistic,
            ),
            Self::StopCapture => (
                StoreAction::SetCapturingOptimistic(false),
                StoreAction::ClearCapturingOptimistic,
            ),
            Self::Connect { .. } => (
                StoreAction::SetConnectedOptimistic(true),
                StoreAction::ClearConnectedOptimistic,
            ),
            Self::Disconnect => (
                StoreAction::SetConnectedOptimistic(false),
                StoreAction::ClearConnectedOptimistic,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_requires_an_address() {
        let cmd = Command::Connect {
            server_address: " ".into(),
        };
        assert!(matches!(
            cmd.validate(),
            Err(CoreError::ValidationFailed {
                field: "server_address",
                ..
            })
        ));
        assert_eq!(cmd.name(), "connect");
    }

    #[test]
    fn stop_sets_capturing_hint_false() {
        let (set, clear) = Command::StopCapture.optimistic();
        assert_eq!(set, StoreAction::SetCapturingOptimistic(false));
        assert_eq!(clear, StoreAction::ClearCapturingOptimistic);
    }
}
