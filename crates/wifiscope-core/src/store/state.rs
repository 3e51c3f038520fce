// ── Application state ──

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::collection::EntityCollection;
use crate::model::{AccessPoint, Bssid, CaptureSession, MacAddress, Selection, Station};

/// Recorded backend `error` events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub last_error: Option<String>,
    pub error_count: u64,
}

/// The canonical application state.
///
/// Immutable: transitions build a new value. Cloning is cheap because the
/// entity collections are shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub access_points: EntityCollection<AccessPoint>,
    pub stations: EntityCollection<Station>,
    pub session: CaptureSession,
    pub selection: Selection,
    /// When the last snapshot event arrived, applied or gated.
    pub last_snapshot_observed: Option<DateTime<Utc>>,
    /// When the entity collections were last replaced.
    pub last_snapshot_applied: Option<DateTime<Utc>>,
    pub diagnostics: Diagnostics,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_capturing()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn access_point(&self, bssid: &Bssid) -> Option<Arc<AccessPoint>> {
        self.access_points.get(bssid)
    }

    /// Top-level station lookup only. See `selection::find_station` for
    /// the lookup that also searches associated maps.
    pub fn station(&self, mac: &MacAddress) -> Option<Arc<Station>> {
        self.stations.get(mac)
    }

    /// Access points in list order: strongest signal first (unmeasured
    /// last), then most associated stations, then BSSID.
    pub fn access_points_ranked(&self) -> Vec<Arc<AccessPoint>> {
        let mut ranked = self.access_points.snapshot();
        ranked.sort_by(|a, b| rank(a, b));
        ranked
    }

    /// Age of the last applied snapshot relative to `now`.
    pub fn data_age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.last_snapshot_applied.map(|at| now - at)
    }
}

fn rank(a: &AccessPoint, b: &AccessPoint) -> Ordering {
    let by_signal = match (a.signal_dbm, b.signal_dbm) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_signal
        .then_with(|| b.station_count().cmp(&a.station_count()))
        .then_with(|| a.bssid.cmp(&b.bssid))
}
