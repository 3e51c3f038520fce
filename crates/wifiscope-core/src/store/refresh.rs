// ── Snapshot decoding ──
//
// Turns a raw `state_snapshot` payload into keyed, transformed entities.
// Records that fail the transform are collected, never fatal; only a
// broken envelope rejects the whole payload.

use serde_json::Value;

use wifiscope_api::SnapshotEnvelope;

use crate::convert::{MalformedRecord, access_point_from_value, station_from_value};
use crate::model::{AccessPoint, Bssid, MacAddress, Station};

/// Everything extracted from one snapshot payload.
#[derive(Debug, Default)]
pub(crate) struct SnapshotBatch {
    pub access_points: Vec<(Bssid, AccessPoint)>,
    pub stations: Vec<(MacAddress, Station)>,
    pub dropped: Vec<MalformedRecord>,
}

/// Decode and transform a snapshot payload.
///
/// Returns the envelope error text when the top-level collections are
/// missing or not arrays.
pub(crate) fn decode_snapshot(payload: &Value) -> Result<SnapshotBatch, String> {
    let envelope = SnapshotEnvelope::from_value(payload).map_err(|e| e.to_string())?;
    let mut batch = SnapshotBatch::default();

    for raw in &envelope.access_points {
        match access_point_from_value(raw, &mut batch.dropped) {
            Ok(ap) => batch.access_points.push((ap.bssid.clone(), ap)),
            Err(e) => batch.dropped.push(e),
        }
    }

    for raw in &envelope.stations {
        match station_from_value(raw) {
            Ok(sta) => batch.stations.push((sta.mac.clone(), sta)),
            Err(e) => batch.dropped.push(e),
        }
    }

    Ok(batch)
}
