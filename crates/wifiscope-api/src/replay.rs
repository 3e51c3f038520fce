//! Backend that replays a recorded event log.
//!
//! The log is JSON lines, one wire frame per line:
//!
//! ```text
//! {"event":"connection_status","data":"connected"}
//! {"event":"capture_status","data":"started"}
//! {"event":"state_snapshot","data":{"access_points":[...],"stations":[...]}}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Lines that do not
//! decode are skipped with a warning. Successful commands emit the matching
//! status event, the way the desktop backend confirms its own actions.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::backend::{BackendConfig, CaptureBackend, StartCaptureParams};
use crate::error::Error;
use crate::event::{
    BackendEvent, CaptureStatus, ConnectionStatus, EVENT_CHANNEL_CAPACITY, EventReceiver,
    EventSender, event_channel,
};

/// Tuning for a [`ReplayBackend`].
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Pause between consecutive recorded events.
    pub interval: Duration,
    /// Fail every command with [`Error::Rejected`].
    pub reject_commands: bool,
    /// Whether the simulated agent starts out connected.
    pub connected: bool,
    /// Close the event channel once the log is exhausted. Commands issued
    /// afterwards are no longer confirmed with status events.
    pub close_on_end: bool,
    /// Returned from `get_config`.
    pub config: BackendConfig,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            reject_commands: false,
            connected: false,
            close_on_end: false,
            config: BackendConfig::default(),
        }
    }
}

/// The current subscriber and the token that stops its replay task.
struct Listener {
    tx: EventSender,
    stop: CancellationToken,
}

type ListenerSlot = Arc<Mutex<Option<Listener>>>;

/// A [`CaptureBackend`] fed from a recorded event log.
pub struct ReplayBackend {
    events: Vec<BackendEvent>,
    options: ReplayOptions,
    connected: AtomicBool,
    capturing: AtomicBool,
    listener: ListenerSlot,
    cancel: CancellationToken,
}

impl ReplayBackend {
    pub fn new(events: Vec<BackendEvent>, options: ReplayOptions) -> Self {
        let connected = AtomicBool::new(options.connected);
        Self {
            events,
            options,
            connected,
            capturing: AtomicBool::new(false),
            listener: Arc::new(Mutex::new(None)),
            cancel: CancellationToken::new(),
        }
    }

    /// Parse a JSON-lines event log.
    pub fn from_lines(text: &str, options: ReplayOptions) -> Self {
        let mut events = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match BackendEvent::from_frame(line) {
                Some(event) => events.push(event),
                None => tracing::warn!(line = idx + 1, "Skipping unreadable replay line"),
            }
        }
        tracing::debug!(events = events.len(), "Loaded replay log");
        Self::new(events, options)
    }

    /// Read and parse a JSON-lines event log from disk.
    pub async fn load(path: impl AsRef<Path>, options: ReplayOptions) -> Result<Self, Error> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(Self::from_lines(&text, options))
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Stop the replay task. Events already queued stay in the channel.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn check_accepting(&self, command: &'static str) -> Result<(), Error> {
        if self.options.reject_commands {
            return Err(Error::Rejected {
                command,
                message: "replay backend configured to reject commands".into(),
            });
        }
        Ok(())
    }

    async fn emit(&self, event: BackendEvent) {
        let tx = self.listener.lock().await.as_ref().map(|l| l.tx.clone());
        if let Some(tx) = tx {
            // The listener may have gone away: nothing to confirm to.
            let _ = tx.send(event).await;
        }
    }
}

impl CaptureBackend for ReplayBackend {
    async fn start_capture(&self, params: StartCaptureParams) -> Result<(), Error> {
        self.check_accepting("start_capture")?;
        if params.interface_name.trim().is_empty() {
            return Err(Error::InvalidParameter {
                field: "interface",
                reason: "interface name cannot be empty".into(),
            });
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(Error::NotConnected);
        }

        tracing::info!(
            interface = %params.interface_name,
            channel = params.channel,
            bandwidth = %params.bandwidth,
            filter = %params.filter_expr,
            "Replay capture started"
        );
        self.capturing.store(true, Ordering::SeqCst);
        self.emit(BackendEvent::CaptureStatus(CaptureStatus::Started.to_string()))
            .await;
        Ok(())
    }

    async fn stop_capture(&self) -> Result<(), Error> {
        self.check_accepting("stop_capture")?;
        self.capturing.store(false, Ordering::SeqCst);
        tracing::info!("Replay capture stopped");
        self.emit(BackendEvent::CaptureStatus(CaptureStatus::Stopped.to_string()))
            .await;
        Ok(())
    }

    async fn connect(&self, server_address: &str) -> Result<(), Error> {
        self.check_accepting("connect")?;
        if server_address.trim().is_empty() {
            return Err(Error::InvalidParameter {
                field: "server_address",
                reason: "address cannot be empty".into(),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!(server = %server_address, "Replay agent connected");
        self.emit(BackendEvent::ConnectionStatus(
            ConnectionStatus::Connected.to_string(),
        ))
        .await;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), Error> {
        self.check_accepting("disconnect")?;
        self.connected.store(false, Ordering::SeqCst);
        self.capturing.store(false, Ordering::SeqCst);
        tracing::info!("Replay agent disconnected");
        self.emit(BackendEvent::ConnectionStatus(
            ConnectionStatus::Disconnected.to_string(),
        ))
        .await;
        Ok(())
    }

    async fn is_connected(&self) -> Result<bool, Error> {
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn get_config(&self) -> Result<BackendConfig, Error> {
        Ok(self.options.config.clone())
    }

    async fn subscribe(&self) -> Result<EventReceiver, Error> {
        let mut guard = self.listener.lock().await;
        if guard.as_ref().is_some_and(|l| !l.tx.is_closed()) {
            return Err(Error::ListenerUnavailable(
                "replay backend already has a listener".into(),
            ));
        }
        // A previous listener went away; stop whatever is left of its replay.
        if let Some(stale) = guard.take() {
            stale.stop.cancel();
            tracing::debug!("Replacing disposed replay listener");
        }

        let (tx, rx) = event_channel(EVENT_CHANNEL_CAPACITY);
        let stop = self.cancel.child_token();
        *guard = Some(Listener {
            tx: tx.clone(),
            stop: stop.clone(),
        });
        drop(guard);

        let events = self.events.clone();
        let interval = self.options.interval;
        let release = self
            .options
            .close_on_end
            .then(|| Arc::clone(&self.listener));
        tokio::spawn(replay_task(events, tx, interval, stop, release));

        Ok(rx)
    }
}

impl Drop for ReplayBackend {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Push recorded events into the channel in file order.
async fn replay_task(
    events: Vec<BackendEvent>,
    tx: EventSender,
    interval: Duration,
    cancel: CancellationToken,
    release: Option<ListenerSlot>,
) {
    for (idx, event) in events.into_iter().enumerate() {
        if idx > 0 && !interval.is_zero() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(interval) => {}
            }
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            sent = tx.send(event) => {
                if sent.is_err() {
                    tracing::debug!("Replay listener dropped, stopping");
                    return;
                }
            }
        }
    }
    tracing::debug!("Replay log exhausted");
    if let Some(slot) = release {
        let mut slot = slot.lock().await;
        if slot.as_ref().is_some_and(|l| l.tx.same_channel(&tx)) {
            slot.take();
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
