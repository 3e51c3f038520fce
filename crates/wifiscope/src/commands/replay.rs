//! Replay command: drive the state engine from a recorded event log.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tabled::Tabled;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use wifiscope_api::{ReplayBackend, ReplayOptions};
use wifiscope_core::model::format_mbps;
use wifiscope_core::{
    AccessPoint, AccessPointFilter, AppState, Controller, MacAddress, Resolution, Selection,
    StateStream, Station, StationFilter, TargetEntity,
};

use crate::cli::{ReplayArgs, ReplayView};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccessPointRow {
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Ch")]
    channel: u32,
    #[tabled(rename = "Width")]
    bandwidth: String,
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "STAs")]
    stations: usize,
    #[tabled(rename = "Util")]
    utilization: String,
    #[tabled(rename = "Throughput")]
    throughput: String,
    #[tabled(rename = "Caps")]
    caps: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Arc<AccessPoint>> for AccessPointRow {
    fn from(ap: &Arc<AccessPoint>) -> Self {
        Self {
            bssid: ap.bssid.to_string(),
            ssid: ap.display_ssid().to_owned(),
            channel: ap.channel,
            bandwidth: ap.bandwidth.clone(),
            security: ap.security.clone(),
            signal: output::signal(ap.signal_dbm, false),
            stations: ap.station_count(),
            utilization: format!("{:.1}%", ap.channel_utilization),
            throughput: format_mbps(ap.throughput),
            caps: ap.capabilities.summary(),
            last_seen: ap.last_seen_display(),
        }
    }
}

#[derive(Tabled)]
struct StationRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Up")]
    uplink: String,
    #[tabled(rename = "Down")]
    downlink: String,
    #[tabled(rename = "Bitrate")]
    bitrate: String,
    #[tabled(rename = "TX retry")]
    retry: String,
    #[tabled(rename = "Caps")]
    caps: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Arc<Station>> for StationRow {
    fn from(sta: &Arc<Station>) -> Self {
        Self {
            mac: sta.mac.to_string(),
            bssid: sta
                .associated_bssid
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string),
            signal: output::signal(sta.signal_dbm, false),
            uplink: format_mbps(sta.uplink),
            downlink: format_mbps(sta.downlink),
            bitrate: format!("{:.1} Mbps", sta.bitrate_mbps),
            retry: sta
                .counters
                .tx_retry_ratio()
                .map_or_else(|| "-".into(), |r| format!("{:.1}%", r * 100.0)),
            caps: sta.capabilities.summary(),
            last_seen: sta.last_seen_display(),
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn access_point_detail(ap: &Arc<AccessPoint>, color: bool) -> String {
    let mut lines = vec![
        format!("BSSID:       {}", ap.bssid),
        format!("SSID:        {}", ap.display_ssid()),
        format!("Channel:     {} ({})", ap.channel, ap.bandwidth),
        format!("Security:    {}", ap.security),
        format!("Signal:      {}", output::signal(ap.signal_dbm, color)),
        format!("Utilization: {:.1}%", ap.channel_utilization),
        format!("Throughput:  {}", format_mbps(ap.throughput)),
        format!("Caps:        {}", ap.capabilities.summary()),
        format!("Stations:    {}", ap.station_count()),
        format!("Last seen:   {}", ap.last_seen_display()),
    ];
    if let Some(mcs) = ap.capabilities.ht.as_ref().and_then(|ht| ht.mcs_set_display()) {
        lines.push(format!("HT MCS:      {mcs}"));
    }
    if let Some(color_id) = ap.capabilities.he.as_ref().and_then(|he| he.bss_color.as_deref()) {
        lines.push(format!("BSS color:   {color_id}"));
    }
    if !ap.history.throughput.is_empty() {
        lines.push(format!("History:     {} samples", ap.history.throughput.len()));
    }
    lines.join("\n")
}

fn station_detail(sta: &Arc<Station>, color: bool) -> String {
    let mut lines = vec![
        format!("MAC:         {}", sta.mac),
        format!(
            "Associated:  {}",
            sta.associated_bssid
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Signal:      {}", output::signal(sta.signal_dbm, color)),
        format!("Uplink:      {}", format_mbps(sta.uplink)),
        format!("Downlink:    {}", format_mbps(sta.downlink)),
        format!("Throughput:  {}", format_mbps(sta.throughput)),
        format!("Bitrate:     {:.1} Mbps", sta.bitrate_mbps),
        format!("Utilization: {:.1}%", sta.channel_utilization),
        format!(
            "Traffic:     rx {} B / tx {} B",
            sta.counters.rx_bytes, sta.counters.tx_bytes
        ),
        format!("Caps:        {}", sta.capabilities.summary()),
        format!("Last seen:   {}", sta.last_seen_display()),
    ];
    if let Some(ratio) = sta.counters.tx_retry_ratio() {
        lines.push(format!("TX retries:  {:.1}%", ratio * 100.0));
    }
    lines.join("\n")
}

/// Serializable summary of everything that is not an entity.
#[derive(Debug, Serialize)]
struct SessionView {
    connected: bool,
    connect_pending: bool,
    capturing: bool,
    capture_pending: bool,
    access_points: usize,
    stations: usize,
    last_snapshot_observed: Option<String>,
    last_snapshot_applied: Option<String>,
    data_age: Option<String>,
    error_count: u64,
    last_error: Option<String>,
    selection: Selection,
}

impl SessionView {
    fn new(state: &AppState) -> Self {
        let session = &state.session;
        let data_age = state.data_age(Utc::now()).map(|age| {
            let millis = u64::try_from(age.num_milliseconds()).unwrap_or(0);
            humantime::format_duration(Duration::from_millis(millis)).to_string()
        });
        Self {
            connected: session.connected.value(),
            connect_pending: session.connected.is_pending(),
            capturing: session.capturing.value(),
            capture_pending: session.capturing.is_pending(),
            access_points: state.access_points.len(),
            stations: state.stations.len(),
            last_snapshot_observed: state
                .last_snapshot_observed
                .as_ref()
                .map(wifiscope_core::model::display_timestamp),
            last_snapshot_applied: state
                .last_snapshot_applied
                .as_ref()
                .map(wifiscope_core::model::display_timestamp),
            data_age,
            error_count: state.diagnostics.error_count,
            last_error: state.diagnostics.last_error.clone(),
            selection: state.selection.clone(),
        }
    }
}

fn session_detail(view: &SessionView, color: bool) -> String {
    let pending = |p: bool| if p { " (pending)" } else { "" };
    let mut lines = vec![
        format!(
            "Agent:         {}{}",
            output::state_word(view.connected, "connected", "disconnected", color),
            pending(view.connect_pending)
        ),
        format!(
            "Capture:       {}{}",
            output::state_word(view.capturing, "running", "stopped", color),
            pending(view.capture_pending)
        ),
        format!("Access points: {}", view.access_points),
        format!("Stations:      {}", view.stations),
        format!(
            "Last snapshot: {}",
            view.last_snapshot_observed.as_deref().unwrap_or("-")
        ),
        format!(
            "Last applied:  {}",
            view.last_snapshot_applied.as_deref().unwrap_or("-")
        ),
    ];
    if let Some(age) = &view.data_age {
        lines.push(format!("Data age:      {age}"));
    }
    lines.push(format!("Errors:        {}", view.error_count));
    if let Some(err) = &view.last_error {
        lines.push(format!("Last error:    {err}"));
    }
    lines.join("\n")
}

fn status_line(state: &AppState, color: bool) -> String {
    format!(
        "agent {}  capture {}  aps {}  stas {}  errors {}",
        output::state_word(state.is_connected(), "up", "down", color),
        output::state_word(state.is_capturing(), "on", "off", color),
        state.access_points.len(),
        state.stations.len(),
        state.diagnostics.error_count,
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ReplayArgs, ctx: &Context) -> Result<(), CliError> {
    let cfg = &ctx.config;
    let interval = match args.interval {
        Some(interval) => interval,
        None => cfg.replay_interval()?,
    };
    let select_ap = parse_mac(args.select_ap.as_deref())?;
    let select_sta = parse_mac(args.select_sta.as_deref())?;

    let options = ReplayOptions {
        interval,
        reject_commands: args.reject_commands,
        connected: args.connected,
        close_on_end: true,
        config: cfg.backend_config(),
    };
    let backend = ReplayBackend::load(&args.log, options)
        .await
        .map_err(|source| CliError::ReplayLog {
            path: args.log.display().to_string(),
            source,
        })?;
    info!(events = backend.len(), log = %args.log.display(), "replaying event log");

    let controller = Controller::new(backend, cfg.to_controller_config()?);
    let follow = args
        .follow
        .then(|| spawn_follow(controller.subscribe(), ctx.color));

    let guard = controller.attach().await?;

    if args.connect {
        controller.connect_default().await?;
    }
    if args.start {
        controller.start_capture_default().await?;
    }

    tokio::select! {
        () = guard.finished() => debug!("event log exhausted"),
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                debug!(error = %e, "ctrl-c handler unavailable");
            }
            info!("interrupted, rendering current state");
        }
    }
    guard.dispose().await;
    if let Some(task) = follow {
        task.abort();
    }

    if let Some(bssid) = select_ap {
        controller.select_access_point(bssid);
    } else if let Some(mac) = select_sta {
        controller.select_station(mac);
    }

    render(&controller, &args, ctx)
}

fn parse_mac(raw: Option<&str>) -> Result<Option<MacAddress>, CliError> {
    raw.map(MacAddress::parse)
        .transpose()
        .map_err(CliError::from)
}

fn spawn_follow(mut stream: StateStream, color: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        eprintln!("{}", status_line(stream.current(), color));
        while let Some(state) = stream.changed().await {
            eprintln!("{}", status_line(&state, color));
        }
    })
}

fn access_point_filters(args: &ReplayArgs, min_rssi: i32) -> Vec<AccessPointFilter> {
    let mut filters = Vec::new();
    if !args.all {
        filters.push(match args.min_signal {
            Some(dbm) => AccessPointFilter::MinSignal(dbm),
            None => AccessPointFilter::SignalFloor(min_rssi),
        });
    }
    if let Some(channel) = args.channel {
        filters.push(AccessPointFilter::Channel(channel));
    }
    filters
}

fn render(
    controller: &Controller<ReplayBackend>,
    args: &ReplayArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    let state = controller.state();
    let color = ctx.color;

    let out = match args.view {
        ReplayView::AccessPoints => {
            let filters = access_point_filters(args, ctx.config.min_bss_creation_rssi);
            let aps: Vec<Arc<AccessPoint>> = state
                .access_points_ranked()
                .into_iter()
                .filter(|ap| filters.iter().all(|f| f.matches(ap)))
                .collect();
            output::render_list(ctx.output, &aps, |ap| AccessPointRow::from(ap), |ap| {
                ap.bssid.to_string()
            })?
        }

        ReplayView::Stations => {
            let filter = args
                .min_signal
                .map_or(StationFilter::All, StationFilter::MinSignal);
            let stas: Vec<Arc<Station>> = state
                .stations
                .iter()
                .filter(|sta| filter.matches(sta))
                .cloned()
                .collect();
            output::render_list(ctx.output, &stas, |sta| StationRow::from(sta), |sta| {
                sta.mac.to_string()
            })?
        }

        ReplayView::Associated => match controller.resolve_station_list() {
            Resolution::Found(list) => {
                output::render_list(ctx.output, &list.stations, |sta| StationRow::from(sta), |sta| {
                    sta.mac.to_string()
                })?
            }
            Resolution::NoSelection => return Err(CliError::NoSelection),
            Resolution::NotFound(bssid) => return Err(not_found("access point", &bssid)),
        },

        ReplayView::Target => match controller.resolve_performance_target() {
            Resolution::Found(TargetEntity::AccessPoint(ap)) => output::render_single(
                ctx.output,
                &ap,
                |ap| access_point_detail(ap, color),
                |ap| ap.bssid.to_string(),
            )?,
            Resolution::Found(TargetEntity::Station(sta)) => output::render_single(
                ctx.output,
                &sta,
                |sta| station_detail(sta, color),
                |sta| sta.mac.to_string(),
            )?,
            Resolution::NoSelection => return Err(CliError::NoSelection),
            Resolution::NotFound(id) => return Err(not_found("selected entity", &id)),
        },

        ReplayView::Session => {
            let view = SessionView::new(&state);
            output::render_single(
                ctx.output,
                &view,
                |v| session_detail(v, color),
                |v| String::from(if v.capturing { "capturing" } else { "idle" }),
            )?
        }
    };

    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn not_found(resource_type: &str, id: &MacAddress) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: id.to_string(),
        list_view: "access-points".into(),
    }
}
