// ── PHY capability advertisements ──
//
// One explicit record per generation. An absent advertisement is `None` on
// the owning entity; a present one with every flag false is still `Some`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// HT (802.11n) capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct HtCapabilities {
    pub supported_mcs_set: Vec<u8>,
    pub short_gi_20mhz: bool,
    pub short_gi_40mhz: bool,
    pub channel_width_40mhz: bool,
    pub ldpc_coding: bool,
    pub forty_mhz_intolerant: bool,
    pub tx_stbc: bool,
    pub rx_stbc: u8,
    pub max_amsdu_length: u16,
    pub max_ampdu_length: u32,
    pub primary_channel: u8,
}

impl HtCapabilities {
    /// MCS indices as `"0,1,2"`, or `None` when none were advertised.
    pub fn mcs_set_display(&self) -> Option<String> {
        if self.supported_mcs_set.is_empty() {
            return None;
        }
        Some(
            self.supported_mcs_set
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// VHT (802.11ac) capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct VhtCapabilities {
    /// MCS indices per spatial-stream label.
    pub supported_mcs_set: BTreeMap<String, Vec<u8>>,
    pub short_gi_80mhz: bool,
    pub short_gi_160mhz: bool,
    pub channel_width_80mhz: bool,
    pub channel_width_160mhz: bool,
    pub channel_width_80plus80mhz: bool,
    pub su_beamformer_capable: bool,
    pub su_beamformee_capable: bool,
    pub mu_beamformer_capable: bool,
    pub mu_beamformee_capable: bool,
    pub beamformee_sts: u8,
    pub sounding_dimensions: u8,
    pub max_mpdu_length: u8,
    pub rx_ldpc: bool,
    pub tx_stbc: bool,
    pub rx_stbc: u8,
    pub rx_mcs_map: u16,
    pub tx_mcs_map: u16,
    pub channel_center_0: u8,
    pub channel_center_1: u8,
}

/// HE (802.11ax) capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct HeCapabilities {
    pub supported_mcs_set: BTreeMap<String, Vec<u8>>,
    pub bss_color: Option<String>,
    pub htc_he_support: bool,
    pub twt_requester_support: bool,
    pub twt_responder_support: bool,
    pub su_beamformer: bool,
    pub su_beamformee: bool,
    pub channel_width_160mhz: bool,
    pub channel_width_80plus80mhz: bool,
    pub channel_width_40_80mhz_in_5g: bool,
    /// Highest MCS per spatial-stream count, 1 through 4.
    pub max_mcs_per_ss: [u8; 4],
    pub rx_he_mcs_map: u16,
    pub tx_he_mcs_map: u16,
}

/// The three capability generations an entity may advertise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub ht: Option<HtCapabilities>,
    pub vht: Option<VhtCapabilities>,
    pub he: Option<HeCapabilities>,
}

impl Capabilities {
    /// Short generation summary, e.g. `"HT/VHT"`, or `"-"` when none.
    pub fn summary(&self) -> String {
        let parts: Vec<&str> = [
            self.ht.as_ref().map(|_| "HT"),
            self.vht.as_ref().map(|_| "VHT"),
            self.he.as_ref().map(|_| "HE"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            "-".into()
        } else {
            parts.join("/")
        }
    }
}
