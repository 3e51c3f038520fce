// ── Command request types ──
//
// Validated inputs for backend commands. Validation happens before any
// optimistic flag is touched.

use serde::{Deserialize, Serialize};

use wifiscope_api::{CaptureDefaults, StartCaptureParams};

use crate::error::CoreError;

/// 5 GHz channels the capture agent can tune to.
pub const CHANNELS_5GHZ: [u32; 25] = [
    36, 40, 44, 48, 52, 56, 60, 64, 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140, 144,
    149, 153, 157, 161, 165,
];

/// Supported channel widths in MHz.
pub const BANDWIDTHS_MHZ: [u32; 4] = [20, 40, 80, 160];

/// Parameters for starting a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCaptureRequest {
    pub interface: String,
    pub channel: u32,
    pub bandwidth_mhz: u32,
    /// BPF-style capture filter.
    pub filter: String,
}

impl StartCaptureRequest {
    /// Build a request from configured defaults.
    pub fn from_defaults(defaults: &CaptureDefaults) -> Result<Self, CoreError> {
        Ok(Self {
            interface: defaults.interface.clone(),
            channel: defaults.channel,
            bandwidth_mhz: parse_bandwidth(&defaults.bandwidth)?,
            filter: defaults.filter.clone(),
        })
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.interface.trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                field: "interface",
                message: "interface name must not be empty".into(),
            });
        }
        if !CHANNELS_5GHZ.contains(&self.channel) {
            return Err(CoreError::ValidationFailed {
                field: "channel",
                message: format!("{} is not a supported 5 GHz channel", self.channel),
            });
        }
        if !BANDWIDTHS_MHZ.contains(&self.bandwidth_mhz) {
            return Err(CoreError::ValidationFailed {
                field: "bandwidth",
                message: format!("{} MHz is not one of 20, 40, 80, 160", self.bandwidth_mhz),
            });
        }
        Ok(())
    }

    /// Wire form: bandwidth is sent as `"<n>MHz"`.
    pub fn to_params(&self) -> StartCaptureParams {
        StartCaptureParams {
            interface_name: self.interface.clone(),
            channel: self.channel,
            bandwidth: format!("{}MHz", self.bandwidth_mhz),
            filter_expr: self.filter.clone(),
        }
    }
}

/// Parse `"80MHz"`, `"80 MHz"` or `"80"`.
pub fn parse_bandwidth(raw: &str) -> Result<u32, CoreError> {
    let digits = raw.trim().trim_end_matches("MHz").trim_end_matches("mhz").trim();
    digits.parse().map_err(|_| CoreError::ValidationFailed {
        field: "bandwidth",
        message: format!("cannot parse {raw:?} as a channel width"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> StartCaptureRequest {
        StartCaptureRequest {
            interface: "ath1".into(),
            channel: 149,
            bandwidth_mhz: 80,
            filter: "type mgt or type data".into(),
        }
    }

    #[test]
    fn valid_request_converts_to_wire_params() {
        let req = request();
        req.validate().unwrap();
        let params = req.to_params();
        assert_eq!(params.bandwidth, "80MHz");
        assert_eq!(params.interface_name, "ath1");
    }

    #[test]
    fn rejects_bad_fields() {
        let cases = [
            StartCaptureRequest { interface: "  ".into(), ..request() },
            StartCaptureRequest { channel: 6, ..request() },
            StartCaptureRequest { bandwidth_mhz: 60, ..request() },
        ];
        let fields: Vec<&str> = cases
            .iter()
            .map(|r| match r.validate() {
                Err(CoreError::ValidationFailed { field, .. }) => field,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(fields, ["interface", "channel", "bandwidth"]);
    }

    #[test]
    fn defaults_build_a_valid_request() {
        let req = StartCaptureRequest::from_defaults(&CaptureDefaults::default()).unwrap();
        assert_eq!(req.bandwidth_mhz, 20);
        req.validate().unwrap();
    }

    #[test]
    fn bandwidth_parsing() {
        assert_eq!(parse_bandwidth("160MHz").unwrap(), 160);
        assert_eq!(parse_bandwidth("40 MHz").unwrap(), 40);
        assert_eq!(parse_bandwidth("20").unwrap(), 20);
        assert!(parse_bandwidth("wide").is_err());
    }
}
