// ── Selection references ──
//
// UI-local references into the entity collections. They are never sent to
// the backend and never cleared by snapshot processing.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::{Bssid, MacAddress};

/// Which entity kind a performance target refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Bss,
    Sta,
}

/// The entity shown in the performance detail view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PerformanceTarget {
    Bss(Bssid),
    Sta(MacAddress),
}

impl PerformanceTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Bss(_) => TargetKind::Bss,
            Self::Sta(_) => TargetKind::Sta,
        }
    }

    pub fn id(&self) -> &MacAddress {
        match self {
            Self::Bss(id) | Self::Sta(id) => id,
        }
    }
}

/// Current selection references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// BSS whose associated stations are listed.
    pub bss_for_sta_list: Option<Bssid>,
    pub performance_target: Option<PerformanceTarget>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.bss_for_sta_list.is_none() && self.performance_target.is_none()
    }
}
