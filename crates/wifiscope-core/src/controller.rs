// ── Controller ──
//
// Coordinates one capture backend and one DataStore. Backend events are
// applied by a single ingest task in arrival order; commands set an
// optimistic hint, await the backend, and revert the hint on failure.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wifiscope_api::{BackendConfig, CaptureBackend, EventReceiver};

use crate::command::{Command, StartCaptureRequest};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Bssid, MacAddress};
use crate::selection::{self, Resolution, StationList, TargetEntity};
use crate::store::{AppState, DataStore, StoreAction};
use crate::stream::StateStream;

// ── ListenerGuard ────────────────────────────────────────────────────

/// Disposer for the active event listener.
///
/// Dropping the guard stops the ingest task; [`dispose`](Self::dispose)
/// also waits for it to finish.
pub struct ListenerGuard {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ListenerGuard {
    /// `false` once disposed or once the backend closed its event stream.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Resolves when the ingest task stops for any reason.
    pub async fn finished(&self) {
        self.cancel.cancelled().await;
    }

    /// Stop the ingest task and wait for it to exit.
    pub async fn dispose(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "ingest task ended abnormally");
            }
        }
        debug!("event listener disposed");
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. At most one event
/// listener is attached at a time.
pub struct Controller<B: CaptureBackend> {
    inner: Arc<ControllerInner<B>>,
}

impl<B: CaptureBackend> Clone for Controller<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<B> {
    config: ControllerConfig,
    backend: B,
    store: Arc<DataStore>,
    listener: Mutex<Option<CancellationToken>>,
}

impl<B: CaptureBackend> Controller<B> {
    /// Create a controller. Does NOT subscribe to events; call
    /// [`attach()`](Self::attach) for that.
    pub fn new(backend: B, config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                backend,
                store: Arc::new(DataStore::new()),
                listener: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// The current state (cheap `Arc` clone).
    pub fn state(&self) -> Arc<AppState> {
        self.inner.store.state()
    }

    pub fn subscribe(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    // ── Event listener ───────────────────────────────────────────────

    /// Register the event listener and start the ingest task.
    ///
    /// Fails with [`CoreError::AdapterSetup`] when a listener is already
    /// active or when the backend refuses the subscription.
    pub async fn attach(&self) -> Result<ListenerGuard, CoreError> {
        let cancel = {
            let mut slot = self
                .inner
                .listener
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().is_some_and(|t| !t.is_cancelled()) {
                return Err(CoreError::AdapterSetup {
                    message: "an event listener is already attached".into(),
                });
            }
            let token = CancellationToken::new();
            *slot = Some(token.clone());
            token
        };

        let rx = match self.inner.backend.subscribe().await {
            Ok(rx) => rx,
            Err(e) => {
                cancel.cancel();
                return Err(CoreError::AdapterSetup {
                    message: e.to_string(),
                });
            }
        };

        let store = Arc::clone(&self.inner.store);
        let handle = tokio::spawn(ingest_task(store, rx, cancel.clone()));
        info!("event listener attached");

        Ok(ListenerGuard {
            cancel,
            handle: Some(handle),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one backend command with optimistic state.
    ///
    /// The hint is set before the call and cleared again if the call
    /// fails. On success it stays until the backend's status event.
    pub async fn execute(&self, command: Command) -> Result<(), CoreError> {
        command.validate()?;
        if matches!(command, Command::StartCapture(_)) && !self.state().is_connected() {
            return Err(CoreError::NotConnected);
        }

        let name = command.name();
        let (hint, revert) = command.optimistic();
        self.inner.store.dispatch(hint);
        debug!(command = name, "dispatching command");

        let backend = &self.inner.backend;
        let result = match command {
            Command::StartCapture(req) => backend.start_capture(req.to_params()).await,
            Command::StopCapture => backend.stop_capture().await,
            Command::Connect { server_address } => backend.connect(&server_address).await,
            Command::Disconnect => backend.disconnect().await,
        };

        if let Err(e) = result {
            warn!(command = name, error = %e, "command rejected, reverting optimistic state");
            self.inner.store.dispatch(revert);
            return Err(CoreError::rejected(name, e));
        }
        Ok(())
    }

    pub async fn start_capture(&self, request: StartCaptureRequest) -> Result<(), CoreError> {
        self.execute(Command::StartCapture(request)).await
    }

    /// Start a capture with the configured defaults.
    pub async fn start_capture_default(&self) -> Result<(), CoreError> {
        let request = StartCaptureRequest::from_defaults(&self.inner.config.capture)?;
        self.start_capture(request).await
    }

    pub async fn stop_capture(&self) -> Result<(), CoreError> {
        self.execute(Command::StopCapture).await
    }

    pub async fn connect(&self, server_address: impl Into<String>) -> Result<(), CoreError> {
        self.execute(Command::Connect {
            server_address: server_address.into(),
        })
        .await
    }

    /// Connect to the configured agent address.
    pub async fn connect_default(&self) -> Result<(), CoreError> {
        self.connect(self.inner.config.server_address.clone()).await
    }

    pub async fn disconnect(&self) -> Result<(), CoreError> {
        self.execute(Command::Disconnect).await
    }

    /// Ask the backend directly; does not touch the store.
    pub async fn is_connected(&self) -> Result<bool, CoreError> {
        self.inner.backend.is_connected().await.map_err(Into::into)
    }

    pub async fn get_config(&self) -> Result<BackendConfig, CoreError> {
        self.inner.backend.get_config().await.map_err(Into::into)
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select an access point for both the station list and the
    /// performance view.
    pub fn select_access_point(&self, bssid: Bssid) {
        self.inner.store.dispatch(StoreAction::SelectAccessPoint(bssid));
    }

    pub fn select_station(&self, mac: MacAddress) {
        self.inner.store.dispatch(StoreAction::SelectStation(mac));
    }

    pub fn clear_selection(&self) {
        self.inner.store.dispatch(StoreAction::ClearSelection);
    }

    pub fn resolve_performance_target(&self) -> Resolution<TargetEntity> {
        selection::resolve_performance_target(&self.state())
    }

    pub fn resolve_station_list(&self) -> Resolution<StationList> {
        selection::resolve_station_list(&self.state())
    }

    // ── Waiting ──────────────────────────────────────────────────────

    /// Wait until the state satisfies `predicate`, checking the current
    /// state first. No timeout is applied.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<Arc<AppState>, CoreError>
    where
        F: FnMut(&AppState) -> bool,
    {
        let mut rx = self.inner.store.receiver();
        let state = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| CoreError::ControllerShutdown)?;
        Ok(Arc::clone(&state))
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Apply backend events to the store, one at a time, in arrival order.
async fn ingest_task(store: Arc<DataStore>, mut rx: EventReceiver, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = rx.recv() => {
                let Some(event) = event else {
                    info!("backend event stream ended");
                    break;
                };
                debug!(event = event.name(), "applying backend event");
                store.dispatch(event.into());
            }
        }
    }
    cancel.cancel();
}
