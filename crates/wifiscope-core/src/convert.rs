// ── Wire-to-domain conversions (entity transform) ──
//
// Bridges raw `wifiscope_api` records into canonical `wifiscope_core::model`
// types. Every function here is pure: the same input always yields the same
// output, and nothing depends on prior state.
//
// A record whose identity key is missing or unparseable is rejected with a
// `MalformedRecord`; the caller drops it and keeps going.

use std::fmt;

use serde_json::Value;
use strum::Display;

use wifiscope_api::records::{
    AccessPointRecord, HeCapabilitiesRecord, HtCapabilitiesRecord, StationRecord,
    VhtCapabilitiesRecord, decode_record,
};

use crate::model::units::{epoch_ms_to_datetime, non_negative, non_negative_f64};
use crate::model::{
    AccessPoint, AccessPointHistory, BitsPerSecond, Capabilities, HeCapabilities,
    HtCapabilities, MacAddress, Station, StationHistory, TrafficCounters, VhtCapabilities,
};

// ── MalformedRecord ──────────────────────────────────────────────────

/// Which collection a rejected record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    AccessPoint,
    Station,
}

/// One snapshot record that failed the transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub kind: RecordKind,
    /// Raw identity key, when one could be read.
    pub key: Option<String>,
    pub reason: String,
}

impl MalformedRecord {
    fn new(kind: RecordKind, key: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.map(str::to_owned),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} {key}: {}", self.kind, self.reason),
            None => write!(f, "{}: {}", self.kind, self.reason),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// A reading of 0 dBm means "not measured"; so does anything outside i32.
fn signal_dbm(raw: Option<i64>) -> Option<i32> {
    raw.filter(|v| *v != 0).and_then(|v| i32::try_from(v).ok())
}

fn throughput_series(raw: Option<Vec<i64>>) -> Vec<BitsPerSecond> {
    raw.unwrap_or_default()
        .into_iter()
        .map(BitsPerSecond::from_raw)
        .collect()
}

fn percent_series(raw: Option<Vec<f64>>) -> Vec<f64> {
    raw.unwrap_or_default()
        .into_iter()
        .map(non_negative_f64)
        .collect()
}

fn identity(
    kind: RecordKind,
    raw: Option<&str>,
    field: &str,
) -> Result<MacAddress, MalformedRecord> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Err(MalformedRecord::new(kind, None, format!("missing {field}")));
    };
    MacAddress::parse(raw)
        .map_err(|e| MalformedRecord::new(kind, Some(raw), e.to_string()))
}

/// Best-effort identity for diagnostics when the record does not decode.
fn peek_key<'a>(raw: &'a Value, field: &str) -> Option<&'a str> {
    raw.get(field).and_then(Value::as_str)
}

fn decode<T: serde::de::DeserializeOwned>(
    kind: RecordKind,
    raw: &Value,
    key_field: &str,
) -> Result<T, MalformedRecord> {
    if !raw.is_object() {
        return Err(MalformedRecord::new(kind, None, "record is not an object"));
    }
    decode_record(raw)
        .map_err(|e| MalformedRecord::new(kind, peek_key(raw, key_field), e.to_string()))
}

// ── Capabilities ─────────────────────────────────────────────────────

impl From<HtCapabilitiesRecord> for HtCapabilities {
    fn from(r: HtCapabilitiesRecord) -> Self {
        Self {
            supported_mcs_set: r.supported_mcs_set.unwrap_or_default(),
            short_gi_20mhz: r.short_gi_20mhz,
            short_gi_40mhz: r.short_gi_40mhz,
            channel_width_40mhz: r.channel_width_40mhz,
            ldpc_coding: r.ldpc_coding,
            forty_mhz_intolerant: r.forty_mhz_intolerant,
            tx_stbc: r.tx_stbc,
            rx_stbc: r.rx_stbc,
            max_amsdu_length: r.max_amsdu_length,
            max_ampdu_length: r.max_ampdu_length,
            primary_channel: r.primary_channel,
        }
    }
}

impl From<VhtCapabilitiesRecord> for VhtCapabilities {
    fn from(r: VhtCapabilitiesRecord) -> Self {
        Self {
            supported_mcs_set: r.supported_mcs_set.unwrap_or_default(),
            short_gi_80mhz: r.short_gi_80mhz,
            short_gi_160mhz: r.short_gi_160mhz,
            channel_width_80mhz: r.channel_width_80mhz,
            channel_width_160mhz: r.channel_width_160mhz,
            channel_width_80plus80mhz: r.channel_width_80plus80mhz,
            su_beamformer_capable: r.su_beamformer_capable,
            su_beamformee_capable: r.su_beamformee_capable,
            mu_beamformer_capable: r.mu_beamformer_capable,
            mu_beamformee_capable: r.mu_beamformee_capable,
            beamformee_sts: r.beamformee_sts,
            sounding_dimensions: r.sounding_dimensions,
            max_mpdu_length: r.max_mpdu_length,
            rx_ldpc: r.rx_ldpc,
            tx_stbc: r.tx_stbc,
            rx_stbc: r.rx_stbc,
            rx_mcs_map: r.rx_mcs_map,
            tx_mcs_map: r.tx_mcs_map,
            channel_center_0: r.channel_center_0,
            channel_center_1: r.channel_center_1,
        }
    }
}

impl From<HeCapabilitiesRecord> for HeCapabilities {
    fn from(r: HeCapabilitiesRecord) -> Self {
        Self {
            supported_mcs_set: r.supported_mcs_set.unwrap_or_default(),
            bss_color: r.bss_color.filter(|c| !c.is_empty()),
            htc_he_support: r.htc_he_support,
            twt_requester_support: r.twt_requester_support,
            twt_responder_support: r.twt_responder_support,
            su_beamformer: r.su_beamformer,
            su_beamformee: r.su_beamformee,
            channel_width_160mhz: r.channel_width_160mhz,
            channel_width_80plus80mhz: r.channel_width_80plus80mhz,
            channel_width_40_80mhz_in_5g: r.channel_width_40_80mhz_in_5g,
            max_mcs_per_ss: [
                r.max_mcs_for_1_ss,
                r.max_mcs_for_2_ss,
                r.max_mcs_for_3_ss,
                r.max_mcs_for_4_ss,
            ],
            rx_he_mcs_map: r.rx_he_mcs_map,
            tx_he_mcs_map: r.tx_he_mcs_map,
        }
    }
}

fn capabilities(
    ht: Option<HtCapabilitiesRecord>,
    vht: Option<VhtCapabilitiesRecord>,
    he: Option<HeCapabilitiesRecord>,
) -> Capabilities {
    Capabilities {
        ht: ht.map(Into::into),
        vht: vht.map(Into::into),
        he: he.map(Into::into),
    }
}

/// Agents also publish the current utilization under the short `util` key.
fn current(primary: f64, mirror: f64) -> f64 {
    if primary > 0.0 { primary } else { mirror }
}

// ── Station ──────────────────────────────────────────────────────────

impl TryFrom<StationRecord> for Station {
    type Error = MalformedRecord;

    fn try_from(r: StationRecord) -> Result<Self, Self::Error> {
        let mac = identity(RecordKind::Station, r.mac_address.as_deref(), "mac_address")?;
        let last_seen = epoch_ms_to_datetime(r.last_seen).ok_or_else(|| {
            MalformedRecord::new(
                RecordKind::Station,
                Some(mac.as_str()),
                format!("last_seen out of range: {}", r.last_seen),
            )
        })?;

        Ok(Station {
            mac,
            associated_bssid: r
                .associated_bssid
                .filter(|b| !b.trim().is_empty())
                .map(MacAddress::new),
            signal_dbm: signal_dbm(r.signal_strength),
            last_seen,
            capabilities: capabilities(r.ht_capabilities, r.vht_capabilities, r.he_capabilities),
            channel_utilization: non_negative_f64(current(r.channel_utilization, r.util)),
            uplink: BitsPerSecond::from_raw(r.uplink_throughput),
            downlink: BitsPerSecond::from_raw(r.downlink_throughput),
            throughput: if r.thrpt > 0 {
                BitsPerSecond::from_raw(r.thrpt)
            } else {
                BitsPerSecond::from_raw(r.uplink_throughput.saturating_add(r.downlink_throughput))
            },
            bitrate_mbps: non_negative_f64(r.bitrate),
            counters: TrafficCounters {
                rx_bytes: non_negative(r.rx_bytes),
                tx_bytes: non_negative(r.tx_bytes),
                rx_packets: non_negative(r.rx_packets),
                tx_packets: non_negative(r.tx_packets),
                rx_retries: non_negative(r.rx_retries),
                tx_retries: non_negative(r.tx_retries),
            },
            history: StationHistory {
                uplink: throughput_series(r.historical_uplink_throughput),
                downlink: throughput_series(r.historical_downlink_throughput),
                utilization: percent_series(r.historical_channel_utilization),
            },
        })
    }
}

/// Transform one raw station record.
///
/// This is the only station transform. Top-level stations and stations
/// nested under an access point both go through it, so the same source
/// record always yields equal values.
pub fn station_from_value(raw: &Value) -> Result<Station, MalformedRecord> {
    let record: StationRecord = decode(RecordKind::Station, raw, "mac_address")?;
    Station::try_from(record)
}

// ── Access point ─────────────────────────────────────────────────────

/// Transform one raw access point record.
///
/// Nested stations that fail the transform are pushed onto `dropped` and
/// left out; the access point itself is kept. `null` entries in the
/// associated map are skipped without a diagnostic.
pub fn access_point_from_value(
    raw: &Value,
    dropped: &mut Vec<MalformedRecord>,
) -> Result<AccessPoint, MalformedRecord> {
    let r: AccessPointRecord = decode(RecordKind::AccessPoint, raw, "bssid")?;
    let bssid = identity(RecordKind::AccessPoint, r.bssid.as_deref(), "bssid")?;
    let last_seen = epoch_ms_to_datetime(r.last_seen).ok_or_else(|| {
        MalformedRecord::new(
            RecordKind::AccessPoint,
            Some(bssid.as_str()),
            format!("last_seen out of range: {}", r.last_seen),
        )
    })?;

    let mut associated_stations = indexmap::IndexMap::new();
    for (key, value) in r.associated_stas.unwrap_or_default() {
        if value.is_null() {
            continue;
        }
        match station_from_value(&value) {
            Ok(sta) => {
                associated_stations.insert(sta.mac.clone(), sta);
            }
            Err(mut e) => {
                if e.key.is_none() {
                    e.key = Some(key);
                }
                dropped.push(e);
            }
        }
    }

    Ok(AccessPoint {
        bssid,
        ssid: r.ssid.unwrap_or_default(),
        channel: u32::try_from(r.channel).unwrap_or(0),
        bandwidth: r.bandwidth.unwrap_or_default(),
        security: r.security.unwrap_or_default(),
        signal_dbm: signal_dbm(r.signal_strength),
        last_seen,
        capabilities: capabilities(r.ht_capabilities, r.vht_capabilities, r.he_capabilities),
        channel_utilization: non_negative_f64(current(r.channel_utilization, r.util)),
        throughput: BitsPerSecond::from_raw(if r.throughput > 0 {
            r.throughput
        } else {
            r.thrpt
        }),
        history: AccessPointHistory {
            utilization: percent_series(r.historical_channel_utilization),
            throughput: throughput_series(r.historical_throughput),
        },
        associated_stations,
    })
}
