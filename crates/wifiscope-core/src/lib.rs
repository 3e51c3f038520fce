//! State synchronization engine between a capture backend and its viewers.
//!
//! This crate owns the domain model, the entity transform, and the state
//! store for live 802.11 telemetry:
//!
//! - **[`Controller`]** -- Coordinator for one [`CaptureBackend`]:
//!   [`attach()`](Controller::attach) registers the event listener and spawns
//!   the single ingest task; [`execute()`](Controller::execute) runs commands
//!   with optimistic capture/connection flags that revert on failure.
//!
//! - **[`DataStore`]** -- Holds the immutable [`AppState`] and publishes each
//!   new version over a `tokio::sync::watch` channel. All changes go through
//!   the pure, total [`store::apply`] transition.
//!
//! - **[`StateStream`]** -- Subscription handle vended by the `DataStore`.
//!   Exposes `current()` / `latest()` / `changed()` and a `Stream` adapter.
//!
//! - **Entity transform** ([`convert`]) -- Maps raw wire records to canonical
//!   [`AccessPoint`] / [`Station`] values. Records missing their key are
//!   reported as [`MalformedRecord`] and dropped individually.
//!
//! - **Selection** ([`selection`]) -- Resolves selection references at read
//!   time; a vanished entity resolves to [`Resolution::NotFound`].
//!
//! [`CaptureBackend`]: wifiscope_api::CaptureBackend

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod selection;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, StartCaptureRequest};
pub use config::ControllerConfig;
pub use controller::{Controller, ListenerGuard};
pub use convert::{MalformedRecord, RecordKind};
pub use error::CoreError;
pub use selection::{Resolution, StationList, TargetEntity};
pub use store::{AppState, DataStore, Diagnostics, Outcome, Rejection, StoreAction};
pub use stream::{AccessPointFilter, StateStream, StationFilter};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AccessPoint, BitsPerSecond, Bssid, Capabilities, CaptureSession, HeCapabilities,
    HtCapabilities, MacAddress, PerformanceTarget, ReconciledFlag, Selection, Station,
    TrafficCounters, VhtCapabilities,
};
