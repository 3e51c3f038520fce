// ── Runtime controller configuration ──
//
// Describes which agent to connect to and what to capture by default.
// Never touches disk: the CLI builds a `ControllerConfig` from
// `wifiscope-config` and hands it in.

use wifiscope_api::{BackendConfig, CaptureDefaults};

/// Configuration for a [`Controller`](crate::Controller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Capture agent address, `host:port`.
    pub server_address: String,
    pub capture: CaptureDefaults,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let backend = BackendConfig::default();
        Self {
            server_address: backend.server_address,
            capture: backend.capture,
        }
    }
}

impl From<BackendConfig> for ControllerConfig {
    fn from(cfg: BackendConfig) -> Self {
        Self {
            server_address: cfg.server_address,
            capture: cfg.capture,
        }
    }
}
