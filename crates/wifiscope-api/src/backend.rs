// ── Capture backend command interface ──
//
// The async calls the engine can make into the backend. Implementations own
// the transport (IPC bridge, gRPC agent, recorded log); the engine only sees
// results. No call carries an engine-side timeout.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::event::EventReceiver;

/// Parameters for `start_capture`, already in the backend's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCaptureParams {
    pub interface_name: String,
    pub channel: u32,
    /// e.g. `"80MHz"`
    pub bandwidth: String,
    /// BPF filter expression.
    pub filter_expr: String,
}

/// Capture defaults advertised by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDefaults {
    pub interface: String,
    pub channel: u32,
    pub bandwidth: String,
    pub filter: String,
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            interface: "ath1".into(),
            channel: 149,
            bandwidth: "20MHz".into(),
            filter: "type mgt or type data".into(),
        }
    }
}

/// Result of `get_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Capture agent address, `host:port`.
    pub server_address: String,
    pub log_file: String,
    pub log_level: String,
    /// Weakest signal (dBm) at which the backend starts tracking a BSS.
    pub min_bss_creation_rssi: i32,
    #[serde(default)]
    pub capture: CaptureDefaults,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            server_address: "192.168.110.1:50051".into(),
            log_file: "wifiscope.log".into(),
            log_level: "info".into(),
            min_bss_creation_rssi: -84,
            capture: CaptureDefaults::default(),
        }
    }
}

/// Commands and event registration exposed by a capture backend.
///
/// Every command resolves asynchronously; the engine never blocks on one.
/// A command's completion carries no ordering guarantee relative to events
/// delivered through [`subscribe`](Self::subscribe).
pub trait CaptureBackend: Send + Sync + 'static {
    fn start_capture(
        &self,
        params: StartCaptureParams,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn stop_capture(&self) -> impl Future<Output = Result<(), Error>> + Send;

    fn connect(&self, server_address: &str) -> impl Future<Output = Result<(), Error>> + Send;

    fn disconnect(&self) -> impl Future<Output = Result<(), Error>> + Send;

    fn is_connected(&self) -> impl Future<Output = Result<bool, Error>> + Send;

    fn get_config(&self) -> impl Future<Output = Result<BackendConfig, Error>> + Send;

    /// Register the event listener and return the receiving half.
    ///
    /// Failing here means the application cannot observe the backend at all.
    fn subscribe(&self) -> impl Future<Output = Result<EventReceiver, Error>> + Send;
}
