// ── Station domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capabilities::Capabilities;
use super::entity_id::{Bssid, MacAddress};
use super::units::{BitsPerSecond, display_timestamp};

/// Cumulative traffic counters reported for a station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_retries: u64,
    pub tx_retries: u64,
}

impl TrafficCounters {
    /// Fraction of transmitted packets that were retries, `None` before any TX.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn tx_retry_ratio(&self) -> Option<f64> {
        (self.tx_packets > 0).then(|| self.tx_retries as f64 / self.tx_packets as f64)
    }
}

/// Historical series kept by the backend for a station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationHistory {
    pub uplink: Vec<BitsPerSecond>,
    pub downlink: Vec<BitsPerSecond>,
    /// Percent samples.
    pub utilization: Vec<f64>,
}

/// The canonical Station type.
///
/// The same value is produced whether the station was found in the
/// top-level list or nested under an access point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub mac: MacAddress,
    /// `None` when the station is not associated.
    pub associated_bssid: Option<Bssid>,
    /// dBm; `None` when never measured.
    pub signal_dbm: Option<i32>,
    pub last_seen: DateTime<Utc>,
    pub capabilities: Capabilities,

    // Metrics
    /// Percent of airtime attributed to this station.
    pub channel_utilization: f64,
    pub uplink: BitsPerSecond,
    pub downlink: BitsPerSecond,
    /// Combined current rate in both directions.
    pub throughput: BitsPerSecond,
    /// Instantaneous PHY rate in Mbps, as reported.
    pub bitrate_mbps: f64,
    pub counters: TrafficCounters,
    pub history: StationHistory,
}

impl Station {
    pub fn is_associated(&self) -> bool {
        self.associated_bssid.is_some()
    }

    pub fn is_associated_with(&self, bssid: &Bssid) -> bool {
        self.associated_bssid.as_ref() == Some(bssid)
    }

    /// Uplink plus downlink.
    pub fn total_throughput(&self) -> BitsPerSecond {
        self.uplink.saturating_add(self.downlink)
    }

    pub fn last_seen_display(&self) -> String {
        display_timestamp(&self.last_seen)
    }
}
