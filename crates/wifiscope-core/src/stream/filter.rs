// ── Filter predicates for state snapshots ──
//
// Read-side only; filters never change what the store holds.

use crate::model::{AccessPoint, Bssid, Station};

/// Filter predicate for access points.
pub enum AccessPointFilter {
    All,
    /// Measured signal at or above this dBm value.
    MinSignal(i32),
    /// Drops measured signals below this dBm value; unmeasured ones pass.
    SignalFloor(i32),
    Channel(u32),
    /// Exact SSID match.
    Ssid(String),
    Hidden,
    Custom(Box<dyn Fn(&AccessPoint) -> bool + Send + Sync>),
}

impl AccessPointFilter {
    pub fn matches(&self, ap: &AccessPoint) -> bool {
        match self {
            Self::All => true,
            Self::MinSignal(dbm) => ap.signal_dbm.is_some_and(|s| s >= *dbm),
            Self::SignalFloor(dbm) => ap.signal_dbm.is_none_or(|s| s >= *dbm),
            Self::Channel(ch) => ap.channel == *ch,
            Self::Ssid(ssid) => ap.ssid == *ssid,
            Self::Hidden => ap.is_hidden(),
            Self::Custom(f) => f(ap),
        }
    }
}

/// Filter predicate for stations.
pub enum StationFilter {
    All,
    AssociatedWith(Bssid),
    Unassociated,
    MinSignal(i32),
    Custom(Box<dyn Fn(&Station) -> bool + Send + Sync>),
}

impl StationFilter {
    pub fn matches(&self, sta: &Station) -> bool {
        match self {
            Self::All => true,
            Self::AssociatedWith(bssid) => sta.is_associated_with(bssid),
            Self::Unassociated => !sta.is_associated(),
            Self::MinSignal(dbm) => sta.signal_dbm.is_some_and(|s| s >= *dbm),
            Self::Custom(f) => f(sta),
        }
    }
}
