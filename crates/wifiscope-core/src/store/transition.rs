// ── Transition function ──
//
// `apply` is the single authority for state changes. It is total: every
// action, however malformed its payload, yields a next state plus an
// `Outcome`. Nothing here can fail or panic.

use chrono::{DateTime, Utc};
use serde_json::Value;
use strum::Display;

use wifiscope_api::{BackendEvent, CaptureStatus, ConnectionStatus};

use super::collection::EntityCollection;
use super::refresh::decode_snapshot;
use super::state::AppState;
use crate::convert::MalformedRecord;
use crate::model::{Bssid, MacAddress, PerformanceTarget};

// ── Actions ──────────────────────────────────────────────────────────

/// Everything that can change the state.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    // Backend events (authoritative)
    Snapshot(Value),
    CaptureStatus(String),
    ConnectionStatus(String),
    Error(String),

    // Command dispatch (advisory)
    SetCapturingOptimistic(bool),
    ClearCapturingOptimistic,
    SetConnectedOptimistic(bool),
    ClearConnectedOptimistic,

    // Selection (user intent)
    SelectBssForStaList(Option<Bssid>),
    SelectPerformanceTarget(Option<PerformanceTarget>),
    /// Sets the station-list BSS and the performance target together.
    SelectAccessPoint(Bssid),
    /// Sets the performance target only.
    SelectStation(MacAddress),
    ClearSelection,
}

impl From<BackendEvent> for StoreAction {
    fn from(event: BackendEvent) -> Self {
        match event {
            BackendEvent::Snapshot(v) => Self::Snapshot(v),
            BackendEvent::CaptureStatus(s) => Self::CaptureStatus(s),
            BackendEvent::ConnectionStatus(s) => Self::ConnectionStatus(s),
            BackendEvent::Error(s) => Self::Error(s),
        }
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Which status event carried an unrecognized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    CaptureStatus,
    ConnectionStatus,
}

/// Why an action left the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MalformedEnvelope { reason: String },
    UnrecognizedStatus { kind: StatusKind, value: String },
}

/// What a transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Both collections were replaced. `dropped` lists skipped records.
    Replaced {
        access_points: usize,
        stations: usize,
        dropped: Vec<MalformedRecord>,
    },
    /// Snapshot arrived while not capturing; only the observed marker moved.
    Gated,
    SessionUpdated,
    SelectionUpdated,
    ErrorRecorded,
    Ignored(Rejection),
}

impl Outcome {
    /// `true` when the action produced a different state.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

// ── apply ────────────────────────────────────────────────────────────

/// Compute the next state for one action.
///
/// `now` stamps snapshot markers; passing it in keeps the function pure.
pub fn apply(state: &AppState, action: StoreAction, now: DateTime<Utc>) -> (AppState, Outcome) {
    let mut next = state.clone();
    let outcome = match action {
        StoreAction::Snapshot(payload) => apply_snapshot(&mut next, &payload, now),

        StoreAction::CaptureStatus(raw) => match CaptureStatus::recognize(&raw) {
            Some(status) => {
                next.session.capturing.confirm(status.is_capturing());
                Outcome::SessionUpdated
            }
            None => unrecognized(StatusKind::CaptureStatus, raw),
        },
        StoreAction::ConnectionStatus(raw) => match ConnectionStatus::recognize(&raw) {
            Some(status) => {
                next.session.connected.confirm(status.is_connected());
                Outcome::SessionUpdated
            }
            None => unrecognized(StatusKind::ConnectionStatus, raw),
        },
        StoreAction::Error(message) => {
            next.diagnostics.last_error = Some(message);
            next.diagnostics.error_count = next.diagnostics.error_count.saturating_add(1);
            Outcome::ErrorRecorded
        }

        StoreAction::SetCapturingOptimistic(value) => {
            next.session.capturing.set_optimistic(value);
            Outcome::SessionUpdated
        }
        StoreAction::ClearCapturingOptimistic => {
            next.session.capturing.clear_optimistic();
            Outcome::SessionUpdated
        }
        StoreAction::SetConnectedOptimistic(value) => {
            next.session.connected.set_optimistic(value);
            Outcome::SessionUpdated
        }
        StoreAction::ClearConnectedOptimistic => {
            next.session.connected.clear_optimistic();
            Outcome::SessionUpdated
        }

        StoreAction::SelectBssForStaList(bssid) => {
            next.selection.bss_for_sta_list = bssid;
            Outcome::SelectionUpdated
        }
        StoreAction::SelectPerformanceTarget(target) => {
            next.selection.performance_target = target;
            Outcome::SelectionUpdated
        }
        StoreAction::SelectAccessPoint(bssid) => {
            next.selection.performance_target = Some(PerformanceTarget::Bss(bssid.clone()));
            next.selection.bss_for_sta_list = Some(bssid);
            Outcome::SelectionUpdated
        }
        StoreAction::SelectStation(mac) => {
            next.selection.performance_target = Some(PerformanceTarget::Sta(mac));
            Outcome::SelectionUpdated
        }
        StoreAction::ClearSelection => {
            next.selection = crate::model::Selection::default();
            Outcome::SelectionUpdated
        }
    };

    if outcome.changed() {
        (next, outcome)
    } else {
        (state.clone(), outcome)
    }
}

fn unrecognized(kind: StatusKind, value: String) -> Outcome {
    Outcome::Ignored(Rejection::UnrecognizedStatus { kind, value })
}

fn apply_snapshot(next: &mut AppState, payload: &Value, now: DateTime<Utc>) -> Outcome {
    if !next.is_capturing() {
        next.last_snapshot_observed = Some(now);
        return Outcome::Gated;
    }

    let batch = match decode_snapshot(payload) {
        Ok(batch) => batch,
        Err(reason) => return Outcome::Ignored(Rejection::MalformedEnvelope { reason }),
    };

    next.access_points = EntityCollection::from_entries(batch.access_points);
    next.stations = EntityCollection::from_entries(batch.stations);
    next.last_snapshot_observed = Some(now);
    next.last_snapshot_applied = Some(now);

    Outcome::Replaced {
        access_points: next.access_points.len(),
        stations: next.stations.len(),
        dropped: batch.dropped,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn capturing() -> AppState {
        let mut state = AppState::new();
        state.session.connected.confirm(true);
        state.session.capturing.confirm(true);
        state
    }

    fn snapshot() -> Value {
        json!({
            "access_points": [
                {
                    "bssid": "aa:bb:cc:dd:ee:01",
                    "ssid": "lab",
                    "channel": 36,
                    "signal_strength": -48,
                    "throughput": 5_000_000,
                    "associated_stas": {
                        "11:22:33:44:55:66": {
                            "mac_address": "11:22:33:44:55:66",
                            "uplink_throughput": 1_000_000
                        }
                    }
                }
            ],
            "stations": [
                { "mac_address": "11:22:33:44:55:66", "uplink_throughput": 1_000_000 }
            ]
        })
    }

    #[test]
    fn snapshot_replaces_collections_while_capturing() {
        let (next, outcome) = apply(&capturing(), StoreAction::Snapshot(snapshot()), at(10));
        assert_eq!(
            outcome,
            Outcome::Replaced {
                access_points: 1,
                stations: 1,
                dropped: Vec::new()
            }
        );
        assert_eq!(next.access_points.len(), 1);
        assert_eq!(next.last_snapshot_applied, Some(at(10)));
    }

    #[test]
    fn snapshot_is_idempotent() {
        let (once, _) = apply(&capturing(), StoreAction::Snapshot(snapshot()), at(10));
        let (twice, _) = apply(&once, StoreAction::Snapshot(snapshot()), at(10));
        assert_eq!(once, twice);
    }

    #[test]
    fn snapshot_is_gated_when_not_capturing() {
        let state = AppState::new();
        let (next, outcome) = apply(&state, StoreAction::Snapshot(snapshot()), at(5));
        assert_eq!(outcome, Outcome::Gated);
        assert!(next.access_points.is_empty());
        assert!(next.stations.is_empty());
        assert_eq!(next.last_snapshot_observed, Some(at(5)));
        assert_eq!(next.last_snapshot_applied, None);
    }

    #[test]
    fn replacement_removes_absent_entities() {
        let (full, _) = apply(&capturing(), StoreAction::Snapshot(snapshot()), at(1));
        let empty = json!({ "access_points": [], "stations": [] });
        let (next, _) = apply(&full, StoreAction::Snapshot(empty), at(2));
        assert!(next.access_points.is_empty());
        assert!(next.stations.is_empty());
    }

    #[test]
    fn malformed_envelope_keeps_previous_state() {
        let (full, _) = apply(&capturing(), StoreAction::Snapshot(snapshot()), at(1));
        let (next, outcome) = apply(&full, StoreAction::Snapshot(json!({ "bsss": [] })), at(2));
        assert!(matches!(
            outcome,
            Outcome::Ignored(Rejection::MalformedEnvelope { .. })
        ));
        assert_eq!(next, full);
    }

    #[test]
    fn partial_snapshot_keeps_valid_records() {
        let payload = json!({
            "access_points": [
                { "bssid": "aa:bb:cc:dd:ee:01" },
                { "ssid": "missing key" }
            ],
            "stations": []
        });
        let (next, outcome) = apply(&capturing(), StoreAction::Snapshot(payload), at(1));
        assert_eq!(next.access_points.len(), 1);
        let Outcome::Replaced { dropped, .. } = outcome else {
            panic!("expected replacement, got {outcome:?}");
        };
        assert_eq!(dropped.len(), 1);
    }

    #[test]
    fn status_events_confirm_and_override_hints() {
        let (hinted, _) = apply(&AppState::new(), StoreAction::SetCapturingOptimistic(true), at(0));
        assert!(hinted.is_capturing());

        let (next, outcome) = apply(&hinted, StoreAction::CaptureStatus("stopped".into()), at(0));
        assert_eq!(outcome, Outcome::SessionUpdated);
        assert!(!next.is_capturing());
        assert!(!next.session.capturing.is_pending());

        let (next, _) = apply(&next, StoreAction::ConnectionStatus("connected".into()), at(0));
        assert!(next.is_connected());
    }

    #[test]
    fn unrecognized_status_is_ignored() {
        let state = capturing();
        let (next, outcome) = apply(&state, StoreAction::CaptureStatus("paused".into()), at(0));
        assert_eq!(
            outcome,
            Outcome::Ignored(Rejection::UnrecognizedStatus {
                kind: StatusKind::CaptureStatus,
                value: "paused".into()
            })
        );
        assert_eq!(next, state);
    }

    #[test]
    fn error_event_only_touches_diagnostics() {
        let (full, _) = apply(&capturing(), StoreAction::Snapshot(snapshot()), at(1));
        let (next, outcome) = apply(&full, StoreAction::Error("agent lost".into()), at(2));
        assert_eq!(outcome, Outcome::ErrorRecorded);
        assert_eq!(next.diagnostics.last_error.as_deref(), Some("agent lost"));
        assert_eq!(next.diagnostics.error_count, 1);
        assert_eq!(next.access_points, full.access_points);
        assert_eq!(next.selection, full.selection);
    }

    #[test]
    fn selecting_access_point_sets_both_references() {
        let bssid = MacAddress::new("AA:BB:CC:DD:EE:01");
        let select = StoreAction::SelectAccessPoint(bssid.clone());
        let (next, _) = apply(&AppState::new(), select, at(0));
        assert_eq!(next.selection.bss_for_sta_list, Some(bssid.clone()));
        assert_eq!(next.selection.performance_target, Some(PerformanceTarget::Bss(bssid.clone())));

        let sta = MacAddress::new("11:22:33:44:55:66");
        let (next, _) = apply(&next, StoreAction::SelectStation(sta.clone()), at(0));
        assert_eq!(next.selection.bss_for_sta_list, Some(bssid));
        assert_eq!(next.selection.performance_target, Some(PerformanceTarget::Sta(sta)));
    }

    #[test]
    fn snapshots_never_touch_selection() {
        let bssid = MacAddress::new("aa:bb:cc:dd:ee:99");
        let select = StoreAction::SelectAccessPoint(bssid.clone());
        let (selected, _) = apply(&capturing(), select, at(0));
        let (next, _) = apply(&selected, StoreAction::Snapshot(snapshot()), at(1));
        assert_eq!(next.selection, selected.selection);
        assert!(next.access_point(&bssid).is_none());
    }
}
