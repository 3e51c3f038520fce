// ── Central state store ──
//
// Owns the current `AppState` and publishes every new version through a
// `watch` channel. Writers are serialized by a mutex around the head, so
// each action is applied to completion before the next one starts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::state::AppState;
use super::transition::{self, Outcome, Rejection, StoreAction};
use crate::model::{AccessPoint, Bssid, MacAddress, Station};
use crate::stream::StateStream;

struct Head {
    version: u64,
    state: Arc<AppState>,
}

/// Central reactive store.
///
/// Reads are cheap `Arc` clones of an immutable state. `dispatch` is the
/// only way to change anything.
pub struct DataStore {
    head: Mutex<Head>,
    published: watch::Sender<Arc<AppState>>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    /// Start from a given state (version 0).
    pub fn with_state(state: AppState) -> Self {
        let state = Arc::new(state);
        let (published, _) = watch::channel(Arc::clone(&state));
        Self {
            head: Mutex::new(Head { version: 0, state }),
            published,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Head> {
        self.head.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Apply one action stamped with the current time.
    pub fn dispatch(&self, action: StoreAction) -> Outcome {
        self.dispatch_at(action, Utc::now())
    }

    /// Apply one action with an explicit clock reading.
    pub fn dispatch_at(&self, action: StoreAction, now: DateTime<Utc>) -> Outcome {
        let mut head = self.lock();
        let (next, outcome) = transition::apply(&head.state, action, now);
        log_outcome(&outcome);

        if outcome.changed() {
            head.version = head.version.wrapping_add(1);
            head.state = Arc::new(next);
            self.published.send_replace(Arc::clone(&head.state));
        }
        outcome
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// The current state (cheap `Arc` clone).
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.lock().state)
    }

    /// Number of state changes applied so far.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn access_points_snapshot(&self) -> Vec<Arc<AccessPoint>> {
        self.state().access_points.snapshot()
    }

    pub fn stations_snapshot(&self) -> Vec<Arc<Station>> {
        self.state().stations.snapshot()
    }

    pub fn access_point_by_bssid(&self, bssid: &Bssid) -> Option<Arc<AccessPoint>> {
        self.state().access_point(bssid)
    }

    pub fn station_by_mac(&self, mac: &MacAddress) -> Option<Arc<Station>> {
        self.state().station(mac)
    }

    pub fn last_snapshot_observed(&self) -> Option<DateTime<Utc>> {
        self.state().last_snapshot_observed
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.published.subscribe())
    }

    pub(crate) fn receiver(&self) -> watch::Receiver<Arc<AppState>> {
        self.published.subscribe()
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Replaced {
            access_points,
            stations,
            dropped,
        } => {
            for record in dropped {
                warn!(
                    kind = %record.kind,
                    key = record.key.as_deref().unwrap_or("-"),
                    reason = %record.reason,
                    "dropping malformed record"
                );
            }
            debug!(
                access_points,
                stations,
                dropped = dropped.len(),
                "snapshot applied"
            );
        }
        Outcome::Gated => debug!("snapshot gated, capture not active"),
        Outcome::Ignored(Rejection::MalformedEnvelope { reason }) => {
            warn!(%reason, "ignoring malformed snapshot envelope");
        }
        Outcome::Ignored(Rejection::UnrecognizedStatus { kind, value }) => {
            warn!(%kind, %value, "ignoring unrecognized status value");
        }
        Outcome::ErrorRecorded => debug!("backend error recorded"),
        Outcome::SessionUpdated | Outcome::SelectionUpdated => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_moves_only_on_change() {
        let store = DataStore::new();
        assert_eq!(store.version(), 0);

        store.dispatch(StoreAction::ConnectionStatus("connected".into()));
        assert_eq!(store.version(), 1);

        store.dispatch(StoreAction::ConnectionStatus("flapping".into()));
        assert_eq!(store.version(), 1);
        assert!(store.state().is_connected());
    }

    #[test]
    fn gated_snapshot_moves_marker_only() {
        let store = DataStore::new();
        let outcome = store.dispatch(StoreAction::Snapshot(json!({
            "access_points": [{ "bssid": "aa:bb:cc:dd:ee:01" }],
            "stations": []
        })));
        assert_eq!(outcome, Outcome::Gated);
        assert!(store.access_points_snapshot().is_empty());
        assert!(store.last_snapshot_observed().is_some());
    }

    #[tokio::test]
    async fn subscribers_see_new_state() {
        let store = DataStore::new();
        let mut stream = store.subscribe();
        assert!(!stream.current().is_capturing());

        store.dispatch(StoreAction::CaptureStatus("started".into()));
        let next = stream.changed().await.unwrap();
        assert!(next.is_capturing());
        assert!(stream.current().is_capturing());
    }

    #[test]
    fn lookups_follow_applied_snapshot() {
        let store = DataStore::new();
        store.dispatch(StoreAction::CaptureStatus("started".into()));
        store.dispatch(StoreAction::Snapshot(json!({
            "access_points": [{ "bssid": "aa:bb:cc:dd:ee:01" }],
            "stations": [{ "mac_address": "11:22:33:44:55:66" }]
        })));

        let bssid = MacAddress::new("aa:bb:cc:dd:ee:01");
        let mac = MacAddress::new("11:22:33:44:55:66");
        assert!(store.access_point_by_bssid(&bssid).is_some());
        assert!(store.station_by_mac(&mac).is_some());
        assert_eq!(store.stations_snapshot().len(), 1);
    }
}
