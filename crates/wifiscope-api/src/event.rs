//! Asynchronous backend events.
//!
//! The backend pushes four event kinds. On the wire each is a JSON frame
//! `{ "event": "<name>", "data": <payload> }`; [`BackendEvent::from_frame`]
//! turns a frame into a typed event, skipping anything it cannot read.

use serde::Deserialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use tokio::sync::mpsc;

// ── Channel types ────────────────────────────────────────────────────

/// Default capacity of the event channel between backend and engine.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Producer half, held by the backend.
pub type EventSender = mpsc::Sender<BackendEvent>;

/// Consumer half, handed to the engine's single ingest task.
pub type EventReceiver = mpsc::Receiver<BackendEvent>;

/// Create a bounded event channel.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}

// ── Event names ──────────────────────────────────────────────────────

pub const STATE_SNAPSHOT: &str = "state_snapshot";
pub const CAPTURE_STATUS: &str = "capture_status";
pub const CONNECTION_STATUS: &str = "connection_status";
pub const ERROR: &str = "error";

// ── BackendEvent ─────────────────────────────────────────────────────

/// One event delivered by the capture backend.
///
/// Payloads are kept close to the wire: snapshots stay raw JSON and status
/// values stay strings, so the engine decides what is malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// Full-replacement telemetry snapshot (`state_snapshot`).
    Snapshot(Value),
    /// Capture state, normally `"started"` or `"stopped"` (`capture_status`).
    CaptureStatus(String),
    /// Agent connectivity, normally `"connected"` or `"disconnected"` (`connection_status`).
    ConnectionStatus(String),
    /// Free-form diagnostic message (`error`).
    Error(String),
}

#[derive(Debug, Deserialize)]
struct EventFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

impl BackendEvent {
    /// Wire name of this event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => STATE_SNAPSHOT,
            Self::CaptureStatus(_) => CAPTURE_STATUS,
            Self::ConnectionStatus(_) => CONNECTION_STATUS,
            Self::Error(_) => ERROR,
        }
    }

    /// Build an event from its wire name and payload.
    ///
    /// Returns `None` for unknown event names.
    pub fn from_parts(name: &str, data: Value) -> Option<Self> {
        let event = match name {
            STATE_SNAPSHOT => Self::Snapshot(data),
            CAPTURE_STATUS => Self::CaptureStatus(text_payload(data)),
            CONNECTION_STATUS => Self::ConnectionStatus(text_payload(data)),
            ERROR => Self::Error(text_payload(data)),
            _ => return None,
        };
        Some(event)
    }

    /// Decode a JSON text frame. Unparseable frames and unknown event
    /// names are logged and skipped.
    pub fn from_frame(text: &str) -> Option<Self> {
        let frame: EventFrame = match serde_json::from_str(text) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to parse event frame");
                return None;
            }
        };

        let name = frame.event;
        let event = Self::from_parts(&name, frame.data);
        if event.is_none() {
            tracing::debug!(event = %name, "Skipping unknown event kind");
        }
        event
    }

    /// Encode back into a wire frame.
    pub fn to_frame(&self) -> Value {
        let data = match self {
            Self::Snapshot(v) => v.clone(),
            Self::CaptureStatus(s) | Self::ConnectionStatus(s) | Self::Error(s) => {
                Value::String(s.clone())
            }
        };
        serde_json::json!({ "event": self.name(), "data": data })
    }
}

/// Status payloads are strings; anything else is kept as its JSON text so
/// the engine can report it as unrecognized.
fn text_payload(data: Value) -> String {
    match data {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// ── Status values ────────────────────────────────────────────────────

/// Recognized `capture_status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum CaptureStatus {
    Started,
    Stopped,
}

impl CaptureStatus {
    /// Parse a wire value; anything outside the enumeration is `None`.
    pub fn recognize(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    pub fn is_capturing(self) -> bool {
        matches!(self, Self::Started)
    }
}

/// Recognized `connection_status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    /// Parse a wire value; anything outside the enumeration is `None`.
    pub fn recognize(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_snapshot_frame() {
        let text = r#"{"event":"state_snapshot","data":{"access_points":[],"stations":[]}}"#;
        let event = BackendEvent::from_frame(text).unwrap();
        assert_eq!(
            event,
            BackendEvent::Snapshot(json!({ "access_points": [], "stations": [] }))
        );
    }

    #[test]
    fn decode_status_frames() {
        let capture = BackendEvent::from_frame(r#"{"event":"capture_status","data":"started"}"#);
        assert_eq!(capture, Some(BackendEvent::CaptureStatus("started".into())));

        let conn =
            BackendEvent::from_frame(r#"{"event":"connection_status","data":"disconnected"}"#);
        assert_eq!(
            conn,
            Some(BackendEvent::ConnectionStatus("disconnected".into()))
        );
    }

    #[test]
    fn non_string_status_payload_is_kept_as_text() {
        let event = BackendEvent::from_frame(r#"{"event":"capture_status","data":1}"#).unwrap();
        assert_eq!(event, BackendEvent::CaptureStatus("1".into()));
    }

    #[test]
    fn unknown_event_name_is_skipped() {
        assert!(BackendEvent::from_frame(r#"{"event":"heartbeat","data":null}"#).is_none());
    }

    #[test]
    fn malformed_frame_is_skipped() {
        assert!(BackendEvent::from_frame("not json at all").is_none());
        assert!(BackendEvent::from_frame(r#"{"data":"started"}"#).is_none());
    }

    #[test]
    fn frame_encoding_round_trips_name() {
        let event = BackendEvent::Error("agent lost".into());
        let frame = event.to_frame();
        assert_eq!(frame["event"], "error");
        assert_eq!(
            BackendEvent::from_frame(&frame.to_string()),
            Some(event)
        );
    }

    #[test]
    fn status_recognition() {
        assert_eq!(CaptureStatus::recognize("started"), Some(CaptureStatus::Started));
        assert_eq!(CaptureStatus::recognize("stopped"), Some(CaptureStatus::Stopped));
        assert_eq!(CaptureStatus::recognize("paused"), None);
        assert_eq!(CaptureStatus::recognize("Started"), None);
        assert!(ConnectionStatus::recognize("connected").unwrap().is_connected());
        assert_eq!(ConnectionStatus::recognize(""), None);
        assert_eq!(CaptureStatus::Stopped.to_string(), "stopped");
    }
}
