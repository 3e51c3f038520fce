//! Boundary types between wifiscope and an 802.11 capture backend.
//!
//! The capture backend (packet capture, frame parsing, agent connectivity)
//! lives elsewhere. This crate only describes what crosses the boundary:
//!
//! - **Wire records** ([`records`]) -- serde models of the JSON the backend
//!   pushes inside `state_snapshot` events.
//! - **Events** ([`event`]) -- the four asynchronous event kinds and the
//!   frame decoder that turns `{ "event", "data" }` frames into them.
//! - **Commands** ([`backend`]) -- the [`CaptureBackend`] trait with the
//!   async start/stop/connect/disconnect/config calls.
//! - **Replay** ([`replay`]) -- a backend that plays a recorded JSON-lines
//!   event log, used by the CLI and by tests.

pub mod backend;
pub mod error;
pub mod event;
pub mod records;
pub mod replay;

pub use backend::{BackendConfig, CaptureBackend, CaptureDefaults, StartCaptureParams};
pub use error::Error;
pub use event::{BackendEvent, CaptureStatus, ConnectionStatus, EventReceiver, EventSender};
pub use records::{
    AccessPointRecord, HeCapabilitiesRecord, HtCapabilitiesRecord, SnapshotEnvelope,
    StationRecord, VhtCapabilitiesRecord,
};
pub use replay::{ReplayBackend, ReplayOptions};
