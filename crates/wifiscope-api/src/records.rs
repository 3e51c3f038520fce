// Backend telemetry records
//
// Models for the JSON the capture backend pushes inside `state_snapshot`
// events. Fields use `#[serde(default)]` liberally: the backend omits empty
// series as `null`, and older agents leave out the HE block entirely. Only the
// identity key matters for validity, and it is checked by the transform in
// `wifiscope-core`, not here.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

// ── Snapshot envelope ────────────────────────────────────────────────

/// Full-replacement snapshot payload.
///
/// ```json
/// { "access_points": [...], "stations": [...] }
/// ```
///
/// The desktop backend serializes the same payload as `{ "bsss", "stas" }`;
/// both spellings are accepted. Records stay as raw JSON so a single bad
/// record can be dropped without losing the rest of the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEnvelope {
    #[serde(alias = "bsss")]
    pub access_points: Vec<Value>,
    #[serde(alias = "stas")]
    pub stations: Vec<Value>,
}

impl SnapshotEnvelope {
    /// Decode the envelope from an event payload.
    ///
    /// Fails when either top-level collection is missing or is not an array.
    pub fn from_value(payload: &Value) -> Result<Self, Error> {
        Self::deserialize(payload).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: truncate_body(payload),
        })
    }
}

// ── Access point ─────────────────────────────────────────────────────

/// One BSS as reported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessPointRecord {
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub channel: i64,
    /// e.g. `"20MHz"`, `"80MHz"`
    #[serde(default)]
    pub bandwidth: Option<String>,
    /// e.g. `"Open"`, `"WPA2-PSK"`, `"WPA3-SAE"`
    #[serde(default)]
    pub security: Option<String>,
    /// dBm
    #[serde(default)]
    pub signal_strength: Option<i64>,
    /// Unix milliseconds
    #[serde(default)]
    pub last_seen: i64,
    #[serde(default)]
    pub ht_capabilities: Option<HtCapabilitiesRecord>,
    #[serde(default)]
    pub vht_capabilities: Option<VhtCapabilitiesRecord>,
    #[serde(default)]
    pub he_capabilities: Option<HeCapabilitiesRecord>,
    /// Associated stations keyed by MAC. Entries may be `null`.
    #[serde(default)]
    pub associated_stas: Option<BTreeMap<String, Value>>,
    /// Percent, 0.0 - 100.0
    #[serde(default)]
    pub channel_utilization: f64,
    /// Bits per second
    #[serde(default)]
    pub throughput: i64,
    #[serde(default)]
    pub historical_channel_utilization: Option<Vec<f64>>,
    #[serde(default)]
    pub historical_throughput: Option<Vec<i64>>,
    /// Short-key mirror of `channel_utilization`.
    #[serde(default)]
    pub util: f64,
    /// Short-key mirror of `throughput`.
    #[serde(default)]
    pub thrpt: i64,
}

// ── Station ──────────────────────────────────────────────────────────

/// One station as reported by the backend, either top-level or nested
/// inside an access point's `associated_stas` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(default)]
    pub mac_address: Option<String>,
    /// Empty or absent when the station is not associated.
    #[serde(default)]
    pub associated_bssid: Option<String>,
    #[serde(default)]
    pub signal_strength: Option<i64>,
    #[serde(default)]
    pub last_seen: i64,
    #[serde(default)]
    pub ht_capabilities: Option<HtCapabilitiesRecord>,
    #[serde(default)]
    pub vht_capabilities: Option<VhtCapabilitiesRecord>,
    #[serde(default)]
    pub he_capabilities: Option<HeCapabilitiesRecord>,
    #[serde(default)]
    pub channel_utilization: f64,
    #[serde(default)]
    pub uplink_throughput: i64,
    #[serde(default)]
    pub downlink_throughput: i64,
    #[serde(default)]
    pub historical_channel_utilization: Option<Vec<f64>>,
    #[serde(default)]
    pub historical_uplink_throughput: Option<Vec<i64>>,
    #[serde(default)]
    pub historical_downlink_throughput: Option<Vec<i64>>,
    #[serde(default)]
    pub rx_bytes: i64,
    #[serde(default)]
    pub tx_bytes: i64,
    #[serde(default)]
    pub rx_packets: i64,
    #[serde(default)]
    pub tx_packets: i64,
    #[serde(default)]
    pub rx_retries: i64,
    #[serde(default)]
    pub tx_retries: i64,
    /// Instantaneous PHY rate, already in Mbps.
    #[serde(default)]
    pub bitrate: f64,
    /// Short-key mirror of `channel_utilization`.
    #[serde(default)]
    pub util: f64,
    /// Uplink plus downlink, in bits per second.
    #[serde(default)]
    pub thrpt: i64,
}

// ── Capabilities ─────────────────────────────────────────────────────

/// HT (802.11n) capability advertisement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct HtCapabilitiesRecord {
    #[serde(default)]
    pub supported_mcs_set: Option<Vec<u8>>,
    #[serde(default)]
    pub short_gi_20mhz: bool,
    #[serde(default)]
    pub short_gi_40mhz: bool,
    #[serde(default)]
    pub channel_width_40mhz: bool,
    #[serde(default)]
    pub ldpc_coding: bool,
    #[serde(default, rename = "40mhz_intolerant")]
    pub forty_mhz_intolerant: bool,
    #[serde(default)]
    pub tx_stbc: bool,
    #[serde(default)]
    pub rx_stbc: u8,
    #[serde(default)]
    pub max_amsdu_length: u16,
    #[serde(default)]
    pub max_ampdu_length: u32,
    #[serde(default)]
    pub primary_channel: u8,
}

/// VHT (802.11ac) capability advertisement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct VhtCapabilitiesRecord {
    /// Keyed by spatial-stream label, e.g. `"1x1"`.
    #[serde(default)]
    pub supported_mcs_set: Option<BTreeMap<String, Vec<u8>>>,
    #[serde(default)]
    pub short_gi_80mhz: bool,
    #[serde(default)]
    pub short_gi_160mhz: bool,
    #[serde(default)]
    pub channel_width_80mhz: bool,
    #[serde(default)]
    pub channel_width_160mhz: bool,
    #[serde(default)]
    pub channel_width_80plus80mhz: bool,
    #[serde(default)]
    pub su_beamformer_capable: bool,
    #[serde(default)]
    pub su_beamformee_capable: bool,
    #[serde(default)]
    pub mu_beamformer_capable: bool,
    #[serde(default)]
    pub mu_beamformee_capable: bool,
    #[serde(default)]
    pub beamformee_sts: u8,
    #[serde(default)]
    pub sounding_dimensions: u8,
    #[serde(default)]
    pub max_mpdu_length: u8,
    #[serde(default)]
    pub rx_ldpc: bool,
    #[serde(default)]
    pub tx_stbc: bool,
    #[serde(default)]
    pub rx_stbc: u8,
    #[serde(default)]
    pub rx_mcs_map: u16,
    #[serde(default)]
    pub tx_mcs_map: u16,
    #[serde(default)]
    pub channel_center_0: u8,
    #[serde(default)]
    pub channel_center_1: u8,
}

/// HE (802.11ax) capability advertisement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct HeCapabilitiesRecord {
    #[serde(default)]
    pub supported_mcs_set: Option<BTreeMap<String, Vec<u8>>>,
    #[serde(default)]
    pub bss_color: Option<String>,
    #[serde(default)]
    pub htc_he_support: bool,
    #[serde(default)]
    pub twt_requester_support: bool,
    #[serde(default)]
    pub twt_responder_support: bool,
    #[serde(default)]
    pub su_beamformer: bool,
    #[serde(default)]
    pub su_beamformee: bool,
    #[serde(default)]
    pub channel_width_160mhz: bool,
    #[serde(default)]
    pub channel_width_80plus80mhz: bool,
    #[serde(default)]
    pub channel_width_40_80mhz_in_5g: bool,
    #[serde(default)]
    pub max_mcs_for_1_ss: u8,
    #[serde(default)]
    pub max_mcs_for_2_ss: u8,
    #[serde(default)]
    pub max_mcs_for_3_ss: u8,
    #[serde(default)]
    pub max_mcs_for_4_ss: u8,
    #[serde(default)]
    pub rx_he_mcs_map: u16,
    #[serde(default)]
    pub tx_he_mcs_map: u16,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Decode one raw record into its typed form.
pub fn decode_record<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    T::deserialize(value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: truncate_body(value),
    })
}

/// Keep error bodies short enough to log.
fn truncate_body(value: &Value) -> String {
    const MAX_BODY: usize = 256;
    let mut body = value.to_string();
    if body.len() > MAX_BODY {
        let mut cut = MAX_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
