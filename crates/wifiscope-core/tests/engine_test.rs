//! End-to-end behaviour of the controller, store and ingest task.
#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use wifiscope_api::event::event_channel;
use wifiscope_api::{
    BackendConfig, BackendEvent, CaptureBackend, EventReceiver, EventSender, ReplayBackend,
    ReplayOptions, StartCaptureParams,
};
use wifiscope_core::{
    AppState, Controller, ControllerConfig, CoreError, MacAddress, Resolution, StartCaptureRequest,
    TargetEntity,
};

// ── Mock backend ─────────────────────────────────────────────────────

/// Backend whose events are pushed by the test and whose commands never
/// confirm themselves.
#[derive(Default)]
struct MockBackend {
    sender: Mutex<Option<EventSender>>,
    reject: AtomicBool,
    refuse_listener: AtomicBool,
    commands: Mutex<Vec<&'static str>>,
}

impl MockBackend {
    fn rejecting() -> Self {
        let backend = Self::default();
        backend.reject.store(true, Ordering::SeqCst);
        backend
    }

    async fn push(&self, event: BackendEvent) {
        let tx = self.sender.lock().unwrap().clone().unwrap();
        tx.send(event).await.unwrap();
    }

    fn record(&self, command: &'static str) -> Result<(), wifiscope_api::Error> {
        self.commands.lock().unwrap().push(command);
        if self.reject.load(Ordering::SeqCst) {
            return Err(wifiscope_api::Error::Rejected {
                command,
                message: "agent unreachable".into(),
            });
        }
        Ok(())
    }
}

impl CaptureBackend for MockBackend {
    async fn start_capture(&self, _params: StartCaptureParams) -> Result<(), wifiscope_api::Error> {
        self.record("start_capture")
    }

    async fn stop_capture(&self) -> Result<(), wifiscope_api::Error> {
        self.record("stop_capture")
    }

    async fn connect(&self, _server_address: &str) -> Result<(), wifiscope_api::Error> {
        self.record("connect")
    }

    async fn disconnect(&self) -> Result<(), wifiscope_api::Error> {
        self.record("disconnect")
    }

    async fn is_connected(&self) -> Result<bool, wifiscope_api::Error> {
        Ok(true)
    }

    async fn get_config(&self) -> Result<BackendConfig, wifiscope_api::Error> {
        Ok(BackendConfig::default())
    }

    async fn subscribe(&self) -> Result<EventReceiver, wifiscope_api::Error> {
        if self.refuse_listener.load(Ordering::SeqCst) {
            return Err(wifiscope_api::Error::ListenerUnavailable(
                "event bridge not ready".into(),
            ));
        }
        let (tx, rx) = event_channel(16);
        *self.sender.lock().unwrap() = Some(tx);
        Ok(rx)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn controller(backend: MockBackend) -> Controller<MockBackend> {
    Controller::new(backend, ControllerConfig::default())
}

fn request() -> StartCaptureRequest {
    StartCaptureRequest {
        interface: "ath1".into(),
        channel: 149,
        bandwidth_mhz: 20,
        filter: "type mgt or type data".into(),
    }
}

fn snapshot() -> Value {
    json!({
        "access_points": [
            {
                "bssid": "AA:BB:CC:DD:EE:01",
                "ssid": "lab",
                "channel": 149,
                "signal_strength": -45,
                "last_seen": 1_700_000_000_000_i64,
                "throughput": 5_000_000,
                "associated_stas": {
                    "11:22:33:44:55:66": {
                        "mac_address": "11:22:33:44:55:66",
                        "associated_bssid": "aa:bb:cc:dd:ee:01",
                        "signal_strength": -52,
                        "uplink_throughput": 1_000_000,
                        "ht_capabilities": { "supported_mcs_set": [0, 1] }
                    }
                }
            },
            { "bssid": "aa:bb:cc:dd:ee:02", "ssid": "", "channel": 36 }
        ],
        "stations": [
            {
                "mac_address": "11:22:33:44:55:66",
                "associated_bssid": "aa:bb:cc:dd:ee:01",
                "signal_strength": -52,
                "uplink_throughput": 1_000_000,
                "ht_capabilities": { "supported_mcs_set": [0, 1] }
            }
        ]
    })
}

/// Push a marker error event and wait until it has been applied, so every
/// event pushed before it has been applied too.
async fn settle(ctrl: &Controller<MockBackend>) -> std::sync::Arc<AppState> {
    let marker = ctrl.state().diagnostics.error_count + 1;
    ctrl.backend().push(BackendEvent::Error("sync".into())).await;
    tokio::time::timeout(
        Duration::from_secs(5),
        ctrl.wait_for(|s| s.diagnostics.error_count >= marker),
    )
    .await
    .unwrap()
    .unwrap()
}

async fn connected_and_capturing(ctrl: &Controller<MockBackend>) {
    let backend = ctrl.backend();
    backend.push(BackendEvent::ConnectionStatus("connected".into())).await;
    backend.push(BackendEvent::CaptureStatus("started".into())).await;
    settle(ctrl).await;
}

// ── Snapshot semantics ───────────────────────────────────────────────

#[tokio::test]
async fn same_snapshot_twice_is_idempotent() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    connected_and_capturing(&ctrl).await;

    ctrl.backend().push(BackendEvent::Snapshot(snapshot())).await;
    let once = settle(&ctrl).await;
    ctrl.backend().push(BackendEvent::Snapshot(snapshot())).await;
    let twice = settle(&ctrl).await;

    assert_eq!(once.access_points, twice.access_points);
    assert_eq!(once.stations, twice.stations);
    assert_eq!(once.session, twice.session);
    assert_eq!(once.selection, twice.selection);
}

#[tokio::test]
async fn snapshots_are_gated_while_not_capturing() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();

    for _ in 0..5 {
        ctrl.backend().push(BackendEvent::Snapshot(snapshot())).await;
    }
    let state = settle(&ctrl).await;

    assert!(state.access_points.is_empty());
    assert!(state.stations.is_empty());
    assert!(state.last_snapshot_observed.is_some());
    assert!(state.last_snapshot_applied.is_none());
}

#[tokio::test]
async fn partial_snapshot_keeps_the_valid_access_point() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    connected_and_capturing(&ctrl).await;

    ctrl.backend()
        .push(BackendEvent::Snapshot(json!({
            "access_points": [
                { "bssid": "aa:bb:cc:dd:ee:01", "ssid": "ok" },
                { "ssid": "no bssid" }
            ],
            "stations": []
        })))
        .await;
    let state = settle(&ctrl).await;

    assert_eq!(state.access_points.len(), 1);
    assert!(state.access_point(&MacAddress::new("aa:bb:cc:dd:ee:01")).is_some());
}

#[tokio::test]
async fn nested_and_top_level_station_are_equal() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    connected_and_capturing(&ctrl).await;

    ctrl.backend().push(BackendEvent::Snapshot(snapshot())).await;
    let state = settle(&ctrl).await;

    let mac = MacAddress::new("11:22:33:44:55:66");
    let top = state.station(&mac).unwrap();
    let ap = state.access_point(&MacAddress::new("aa:bb:cc:dd:ee:01")).unwrap();
    let nested = ap.station(&mac).unwrap();

    assert_eq!(nested, top.as_ref());
    assert_eq!(top.uplink.as_mbps(), 1.0);
    assert_eq!(ap.throughput.as_mbps(), 5.0);
}

// ── Optimistic commands ──────────────────────────────────────────────

#[tokio::test]
async fn status_event_overrides_optimistic_start() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    ctrl.backend()
        .push(BackendEvent::ConnectionStatus("connected".into()))
        .await;
    settle(&ctrl).await;

    ctrl.start_capture(request()).await.unwrap();
    assert!(ctrl.state().is_capturing());
    assert!(ctrl.state().session.capturing.is_pending());

    ctrl.backend()
        .push(BackendEvent::CaptureStatus("stopped".into()))
        .await;
    ctrl.backend().push(BackendEvent::Snapshot(snapshot())).await;
    let state = settle(&ctrl).await;

    assert!(!state.is_capturing());
    assert!(!state.session.capturing.is_pending());
    assert!(state.access_points.is_empty());
}

#[tokio::test]
async fn rejected_command_reverts_optimistic_flag() {
    let ctrl = controller(MockBackend::rejecting());
    let _guard = ctrl.attach().await.unwrap();
    ctrl.backend()
        .push(BackendEvent::ConnectionStatus("connected".into()))
        .await;
    settle(&ctrl).await;

    let err = ctrl.start_capture(request()).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::CommandRejected {
            command: "start_capture",
            ..
        }
    ));

    let state = ctrl.state();
    assert!(!state.is_capturing());
    assert!(!state.session.capturing.is_pending());
}

#[tokio::test]
async fn start_is_refused_while_disconnected() {
    let ctrl = controller(MockBackend::default());
    let err = ctrl.start_capture(request()).await.unwrap_err();
    assert!(matches!(err, CoreError::NotConnected));
    assert!(ctrl.backend().commands.lock().unwrap().is_empty());
    assert!(!ctrl.state().is_capturing());
}

#[tokio::test]
async fn invalid_request_never_reaches_backend() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    ctrl.backend()
        .push(BackendEvent::ConnectionStatus("connected".into()))
        .await;
    settle(&ctrl).await;

    let bad = StartCaptureRequest {
        channel: 11,
        ..request()
    };
    let err = ctrl.start_capture(bad).await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { field: "channel", .. }));
    assert!(ctrl.backend().commands.lock().unwrap().is_empty());
    assert!(!ctrl.state().session.capturing.is_pending());
}

#[tokio::test]
async fn disconnect_sets_connected_hint() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    ctrl.backend()
        .push(BackendEvent::ConnectionStatus("connected".into()))
        .await;
    settle(&ctrl).await;

    ctrl.disconnect().await.unwrap();
    assert!(!ctrl.state().is_connected());
    assert!(ctrl.state().session.connected.confirmed());
    assert_eq!(*ctrl.backend().commands.lock().unwrap(), ["disconnect"]);
}

// ── Selection ────────────────────────────────────────────────────────

#[tokio::test]
async fn selection_survives_entity_churn() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    connected_and_capturing(&ctrl).await;
    ctrl.backend().push(BackendEvent::Snapshot(snapshot())).await;
    settle(&ctrl).await;

    let bssid = MacAddress::parse("AA:BB:CC:DD:EE:01").unwrap();
    ctrl.select_access_point(bssid.clone());
    assert!(matches!(
        ctrl.resolve_performance_target(),
        Resolution::Found(TargetEntity::AccessPoint(_))
    ));

    ctrl.backend()
        .push(BackendEvent::Snapshot(json!({
            "access_points": [{ "bssid": "aa:bb:cc:dd:ee:02" }],
            "stations": []
        })))
        .await;
    let state = settle(&ctrl).await;

    assert_eq!(state.selection.bss_for_sta_list, Some(bssid.clone()));
    assert_eq!(ctrl.resolve_performance_target(), Resolution::NotFound(bssid.clone()));
    assert_eq!(ctrl.resolve_station_list(), Resolution::NotFound(bssid));
}

#[tokio::test]
async fn station_selection_resolves_and_clears() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();
    connected_and_capturing(&ctrl).await;
    ctrl.backend().push(BackendEvent::Snapshot(snapshot())).await;
    settle(&ctrl).await;

    ctrl.select_station(MacAddress::new("11:22:33:44:55:66"));
    let Resolution::Found(TargetEntity::Station(sta)) = ctrl.resolve_performance_target() else {
        panic!("station should resolve");
    };
    assert_eq!(sta.signal_dbm, Some(-52));
    assert_eq!(ctrl.state().selection.bss_for_sta_list, None);

    ctrl.clear_selection();
    assert_eq!(ctrl.resolve_performance_target(), Resolution::NoSelection);
}

// ── Listener lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn only_one_listener_at_a_time() {
    let ctrl = controller(MockBackend::default());
    let guard = ctrl.attach().await.unwrap();
    assert!(guard.is_active());

    let err = ctrl.attach().await.err().unwrap();
    assert!(matches!(err, CoreError::AdapterSetup { .. }));
    assert!(err.is_fatal());

    guard.dispose().await;
    let again = ctrl.attach().await.unwrap();
    assert!(again.is_active());
}

#[tokio::test]
async fn refused_subscription_is_fatal_and_retryable() {
    let backend = MockBackend::default();
    backend.refuse_listener.store(true, Ordering::SeqCst);
    let ctrl = controller(backend);

    let err = ctrl.attach().await.err().unwrap();
    assert!(matches!(
        &err,
        CoreError::AdapterSetup { message } if message.contains("event bridge not ready")
    ));
    assert!(err.is_fatal());
    // Nothing was wired up, so no task can be feeding the store.
    assert!(ctrl.backend().sender.lock().unwrap().is_none());
    assert_eq!(ctrl.state().diagnostics.error_count, 0);

    ctrl.backend().refuse_listener.store(false, Ordering::SeqCst);
    let guard = ctrl.attach().await.unwrap();
    assert!(guard.is_active());
    let state = settle(&ctrl).await;
    assert_eq!(state.diagnostics.error_count, 1);
}

#[tokio::test]
async fn replay_listener_can_be_disposed_and_reattached() {
    let log = r#"{"event":"error","data":"agent restarted"}"#;
    let ctrl = Controller::new(
        ReplayBackend::from_lines(log, ReplayOptions::default()),
        ControllerConfig::default(),
    );

    for expected in 1..=2 {
        let guard = ctrl.attach().await.unwrap();
        assert!(guard.is_active());
        tokio::time::timeout(
            Duration::from_secs(5),
            ctrl.wait_for(|s| s.diagnostics.error_count >= expected),
        )
        .await
        .unwrap()
        .unwrap();
        guard.dispose().await;
    }
    assert_eq!(ctrl.state().diagnostics.error_count, 2);
}

#[tokio::test]
async fn events_apply_in_arrival_order() {
    let ctrl = controller(MockBackend::default());
    let _guard = ctrl.attach().await.unwrap();

    for status in ["connected", "disconnected", "connected", "bogus", "disconnected"] {
        ctrl.backend()
            .push(BackendEvent::ConnectionStatus(status.into()))
            .await;
    }
    let state = settle(&ctrl).await;
    assert!(!state.is_connected());
}

#[tokio::test]
async fn replay_log_drives_the_store() {
    let frame = json!({ "event": "state_snapshot", "data": snapshot() }).to_string();
    let log = [
        r#"{"event":"connection_status","data":"connected"}"#,
        r#"{"event":"capture_status","data":"started"}"#,
        frame.as_str(),
        r#"{"event":"capture_status","data":"stopped"}"#,
        r#"{"event":"state_snapshot","data":{"access_points":[],"stations":[]}}"#,
    ]
    .join("\n");
    let options = ReplayOptions {
        close_on_end: true,
        ..ReplayOptions::default()
    };
    let ctrl = Controller::new(
        ReplayBackend::from_lines(&log, options),
        ControllerConfig::default(),
    );

    let guard = ctrl.attach().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), guard.finished())
        .await
        .unwrap();

    let state = ctrl.state();
    assert!(!state.is_capturing());
    assert!(state.is_connected());
    assert_eq!(state.access_points.len(), 2);
    assert_eq!(
        state.access_points_ranked()[0].bssid,
        MacAddress::new("aa:bb:cc:dd:ee:01")
    );
}
