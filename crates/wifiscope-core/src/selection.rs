// ── Selection manager ──
//
// Resolves selection references against the current collections at read
// time. A reference to an entity that is gone resolves to `NotFound`; it is
// never an error and never falls back to some other entity.

use std::sync::Arc;

use crate::model::{AccessPoint, MacAddress, PerformanceTarget, Station};
use crate::store::AppState;

/// Result of resolving one selection reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Nothing is selected.
    NoSelection,
    /// Something is selected but absent from the current state.
    NotFound(MacAddress),
    Found(T),
}

impl<T> Resolution<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::NoSelection | Self::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// The entity behind a performance target.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetEntity {
    AccessPoint(Arc<AccessPoint>),
    Station(Arc<Station>),
}

/// The selected access point and the stations to list under it.
#[derive(Debug, Clone, PartialEq)]
pub struct StationList {
    pub access_point: Arc<AccessPoint>,
    pub stations: Vec<Arc<Station>>,
}

/// Find a station by MAC: top-level collection first, then every access
/// point's associated map.
pub fn find_station(state: &AppState, mac: &MacAddress) -> Option<Arc<Station>> {
    state.station(mac).or_else(|| {
        state
            .access_points
            .iter()
            .find_map(|ap| ap.station(mac))
            .map(|sta| Arc::new(sta.clone()))
    })
}

/// Resolve `selection.performance_target`.
pub fn resolve_performance_target(state: &AppState) -> Resolution<TargetEntity> {
    let Some(target) = &state.selection.performance_target else {
        return Resolution::NoSelection;
    };
    let found = match target {
        PerformanceTarget::Bss(bssid) => state.access_point(bssid).map(TargetEntity::AccessPoint),
        PerformanceTarget::Sta(mac) => find_station(state, mac).map(TargetEntity::Station),
    };
    match found {
        Some(entity) => Resolution::Found(entity),
        None => Resolution::NotFound(target.id().clone()),
    }
}

/// Resolve `selection.bss_for_sta_list`.
///
/// Stations come from the access point's associated map, followed by any
/// top-level station that reports the same BSSID but is not nested.
pub fn resolve_station_list(state: &AppState) -> Resolution<StationList> {
    let Some(bssid) = &state.selection.bss_for_sta_list else {
        return Resolution::NoSelection;
    };
    let Some(access_point) = state.access_point(bssid) else {
        return Resolution::NotFound(bssid.clone());
    };

    let mut stations: Vec<Arc<Station>> = access_point
        .associated_stations
        .values()
        .map(|sta| state.station(&sta.mac).unwrap_or_else(|| Arc::new(sta.clone())))
        .collect();
    stations.extend(
        state
            .stations
            .iter()
            .filter(|sta| sta.is_associated_with(bssid))
            .filter(|sta| !access_point.associated_stations.contains_key(&sta.mac))
            .map(Arc::clone),
    );

    Resolution::Found(StationList {
        access_point,
        stations,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{StoreAction, apply};
    use chrono::Utc;
    use serde_json::json;

    fn with_snapshot(payload: serde_json::Value) -> AppState {
        let mut state = AppState::new();
        state.session.capturing.confirm(true);
        apply(&state, StoreAction::Snapshot(payload), Utc::now()).0
    }

    fn select(state: &AppState, action: StoreAction) -> AppState {
        apply(state, action, Utc::now()).0
    }

    #[test]
    fn nothing_selected() {
        let state = AppState::new();
        assert_eq!(resolve_performance_target(&state), Resolution::NoSelection);
        assert_eq!(resolve_station_list(&state), Resolution::NoSelection);
    }

    #[test]
    fn missing_access_point_is_not_found() {
        let state = with_snapshot(json!({
            "access_points": [{ "bssid": "aa:bb:cc:dd:ee:02" }],
            "stations": []
        }));
        let bssid = MacAddress::new("AA:BB:CC:DD:EE:01");
        let state = select(&state, StoreAction::SelectAccessPoint(bssid.clone()));

        assert_eq!(resolve_performance_target(&state), Resolution::NotFound(bssid.clone()));
        assert_eq!(resolve_station_list(&state), Resolution::NotFound(bssid));
    }

    #[test]
    fn nested_only_station_resolves() {
        let state = with_snapshot(json!({
            "access_points": [{
                "bssid": "aa:bb:cc:dd:ee:01",
                "associated_stas": { "11:22:33:44:55:66": { "mac_address": "11:22:33:44:55:66" } }
            }],
            "stations": []
        }));
        let mac = MacAddress::new("11:22:33:44:55:66");
        let state = select(&state, StoreAction::SelectStation(mac.clone()));

        let Resolution::Found(TargetEntity::Station(sta)) = resolve_performance_target(&state)
        else {
            panic!("station should resolve through the associated map");
        };
        assert_eq!(sta.mac, mac);
    }

    #[test]
    fn top_level_station_wins_over_nested() {
        let state = with_snapshot(json!({
            "access_points": [{
                "bssid": "aa:bb:cc:dd:ee:01",
                "associated_stas": {
                    "11:22:33:44:55:66": {
                        "mac_address": "11:22:33:44:55:66",
                        "signal_strength": -70
                    }
                }
            }],
            "stations": [{ "mac_address": "11:22:33:44:55:66", "signal_strength": -40 }]
        }));
        let sta = find_station(&state, &MacAddress::new("11:22:33:44:55:66")).unwrap();
        assert_eq!(sta.signal_dbm, Some(-40));
    }

    #[test]
    fn station_list_merges_nested_and_top_level() {
        let state = with_snapshot(json!({
            "access_points": [{
                "bssid": "aa:bb:cc:dd:ee:01",
                "associated_stas": { "11:22:33:44:55:66": { "mac_address": "11:22:33:44:55:66" } }
            }],
            "stations": [
                { "mac_address": "11:22:33:44:55:66", "associated_bssid": "aa:bb:cc:dd:ee:01" },
                { "mac_address": "11:22:33:44:55:77", "associated_bssid": "aa:bb:cc:dd:ee:01" },
                { "mac_address": "11:22:33:44:55:88" }
            ]
        }));
        let state = select(
            &state,
            StoreAction::SelectAccessPoint(MacAddress::new("aa:bb:cc:dd:ee:01")),
        );

        let list = resolve_station_list(&state).found().unwrap();
        let macs: Vec<&str> = list.stations.iter().map(|s| s.mac.as_str()).collect();
        assert_eq!(macs, ["11:22:33:44:55:66", "11:22:33:44:55:77"]);
    }
}
