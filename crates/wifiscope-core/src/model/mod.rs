// ── Domain model ──
//
// Canonical view-model types produced by the entity transform and held by
// the store. Raw wire records live in `wifiscope_api::records`.

pub mod access_point;
pub mod capabilities;
pub mod entity_id;
pub mod selection;
pub mod session;
pub mod station;
pub mod units;

pub use access_point::{AccessPoint, AccessPointHistory, HIDDEN_SSID};
pub use capabilities::{Capabilities, HeCapabilities, HtCapabilities, VhtCapabilities};
pub use entity_id::{Bssid, MacAddress};
pub use selection::{PerformanceTarget, Selection, TargetKind};
pub use session::{CaptureSession, ReconciledFlag};
pub use station::{Station, StationHistory, TrafficCounters};
pub use units::{BitsPerSecond, display_timestamp, format_mbps};
