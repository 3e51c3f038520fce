// ── Access point domain types ──

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::capabilities::Capabilities;
use super::entity_id::{Bssid, MacAddress};
use super::station::Station;
use super::units::{BitsPerSecond, display_timestamp};

/// Shown in place of an empty SSID.
pub const HIDDEN_SSID: &str = "(Hidden)";

/// Historical series kept by the backend for a BSS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessPointHistory {
    /// Percent samples.
    pub utilization: Vec<f64>,
    pub throughput: Vec<BitsPerSecond>,
}

/// The canonical AccessPoint (BSS) type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub bssid: Bssid,
    /// Empty for hidden networks.
    pub ssid: String,
    pub channel: u32,
    /// e.g. `"80MHz"`
    pub bandwidth: String,
    /// e.g. `"WPA2-PSK"`
    pub security: String,
    /// dBm; `None` when never measured.
    pub signal_dbm: Option<i32>,
    pub last_seen: DateTime<Utc>,
    pub capabilities: Capabilities,

    // Metrics
    /// Percent of airtime the channel was busy.
    pub channel_utilization: f64,
    pub throughput: BitsPerSecond,
    pub history: AccessPointHistory,

    /// Stations associated with this BSS, keyed by MAC.
    pub associated_stations: IndexMap<MacAddress, Station>,
}

impl AccessPoint {
    pub fn is_hidden(&self) -> bool {
        self.ssid.is_empty()
    }

    /// SSID for display, `(Hidden)` when empty.
    pub fn display_ssid(&self) -> &str {
        if self.is_hidden() { HIDDEN_SSID } else { &self.ssid }
    }

    pub fn station_count(&self) -> usize {
        self.associated_stations.len()
    }

    pub fn station(&self, mac: &MacAddress) -> Option<&Station> {
        self.associated_stations.get(mac)
    }

    pub fn last_seen_display(&self) -> String {
        display_timestamp(&self.last_seen)
    }
}
