// ── Core identity type ──
//
// Access points are keyed by BSSID and stations by MAC address. Both are
// MAC-formatted and normalized the same way, so one type covers both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

/// BSSIDs are MAC addresses.
pub type Bssid = MacAddress;

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated or dash-separated, any case. Does not validate.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().trim().to_lowercase().replace('-', ":");
        Self(normalized)
    }

    /// Normalize and validate: exactly six two-digit hex octets.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let mac = Self::new(raw.as_ref());
        let octets: Vec<&str> = mac.0.split(':').collect();
        let valid = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if valid {
            Ok(mac)
        } else {
            Err(CoreError::InvalidMac {
                value: raw.as_ref().to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
