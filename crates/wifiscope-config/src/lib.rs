//! Shared configuration for wifiscope tools.
//!
//! One TOML file plus `WIFISCOPE_` environment overrides, translated into
//! `wifiscope_core::ControllerConfig` and the replay backend's settings.
//! Nested keys use a double underscore in the environment, e.g.
//! `WIFISCOPE_SERVER__ADDRESS` or `WIFISCOPE_CAPTURE__CHANNEL`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wifiscope_api::{BackendConfig, CaptureDefaults};
use wifiscope_core::ControllerConfig;
use wifiscope_core::command::parse_bandwidth;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Weakest signal (dBm) at which an access point is listed.
    #[serde(default = "default_min_bss_creation_rssi")]
    pub min_bss_creation_rssi: i32,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub replay: ReplayConfig,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log: LogConfig::default(),
            min_bss_creation_rssi: default_min_bss_creation_rssi(),
            capture: CaptureConfig::default(),
            replay: ReplayConfig::default(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Capture agent address, `host:port`.
    #[serde(default = "default_server_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_server_address(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log file path. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,

    /// `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default = "default_interface")]
    pub interface: String,

    #[serde(default = "default_channel")]
    pub channel: u32,

    /// e.g. `"20MHz"`
    #[serde(default = "default_bandwidth")]
    pub bandwidth: String,

    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            channel: default_channel(),
            bandwidth: default_bandwidth(),
            filter: default_filter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// Pause between recorded events, e.g. `"250ms"` or `"1s"`.
    #[serde(default = "default_replay_interval")]
    pub interval: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            interval: default_replay_interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_server_address() -> String {
    "192.168.110.1:50051".into()
}
fn default_log_file() -> String {
    "wifiscope.log".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_min_bss_creation_rssi() -> i32 {
    -84
}
fn default_interface() -> String {
    "ath1".into()
}
fn default_channel() -> u32 {
    149
}
fn default_bandwidth() -> String {
    "20MHz".into()
}
fn default_filter() -> String {
    "type mgt or type data".into()
}
fn default_replay_interval() -> String {
    "0s".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    pub fn capture_defaults(&self) -> CaptureDefaults {
        CaptureDefaults {
            interface: self.capture.interface.clone(),
            channel: self.capture.channel,
            bandwidth: self.capture.bandwidth.clone(),
            filter: self.capture.filter.clone(),
        }
    }

    /// The configuration a backend reports through `get_config`.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            server_address: self.server.address.clone(),
            log_file: self.log.file.clone(),
            log_level: self.log.level.clone(),
            min_bss_creation_rssi: self.min_bss_creation_rssi,
            capture: self.capture_defaults(),
        }
    }

    /// Build a validated `ControllerConfig`.
    pub fn to_controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        if self.server.address.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "server.address".into(),
                reason: "must not be empty".into(),
            });
        }
        parse_bandwidth(&self.capture.bandwidth).map_err(|e| ConfigError::Validation {
            field: "capture.bandwidth".into(),
            reason: e.to_string(),
        })?;

        Ok(ControllerConfig {
            server_address: self.server.address.clone(),
            capture: self.capture_defaults(),
        })
    }

    /// Parsed `replay.interval`.
    pub fn replay_interval(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(self.replay.interval.trim()).map_err(|e| {
            ConfigError::Validation {
                field: "replay.interval".into(),
                reason: e.to_string(),
            }
        })
    }

    /// Log file path, `None` when file logging is disabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        let file = self.log.file.trim();
        (!file.is_empty()).then(|| PathBuf::from(file))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "wifiscope", "wifiscope").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wifiscope");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WIFISCOPE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
