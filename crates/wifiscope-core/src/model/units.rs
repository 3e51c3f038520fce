// ── Telemetry units ──
//
// Throughput is stored in raw bits per second and only converted at the
// display boundary. Timestamps arrive as epoch milliseconds.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Bits per second in one megabit per second.
pub const BITS_PER_MEGABIT: u64 = 1_000_000;

/// Throughput in its raw unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitsPerSecond(pub u64);

impl BitsPerSecond {
    /// Build from a wire value; negative readings become zero.
    pub fn from_raw(raw: i64) -> Self {
        Self(non_negative(raw))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Megabits per second (1 Mbps = 1,000,000 bit/s).
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn as_mbps(self) -> f64 {
        self.0 as f64 / BITS_PER_MEGABIT as f64
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for BitsPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_mbps(*self))
    }
}

/// Render throughput as `"12.34 Mbps"`.
pub fn format_mbps(rate: BitsPerSecond) -> String {
    format!("{:.2} Mbps", rate.as_mbps())
}

/// Clamp a signed counter into the unsigned domain.
pub fn non_negative(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// Clamp a float reading: negative or NaN becomes zero.
pub fn non_negative_f64(raw: f64) -> f64 {
    if raw.is_nan() || raw < 0.0 { 0.0 } else { raw }
}

/// Convert epoch milliseconds, `None` when out of chrono's range.
pub fn epoch_ms_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Inspection format: RFC 3339, millisecond precision, `Z` suffix.
///
/// Equal instants always render to identical bytes.
pub fn display_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn mbps_conversion_is_exact_for_whole_megabits() {
        assert_eq!(BitsPerSecond(5_000_000).as_mbps(), 5.0);
        assert_eq!(BitsPerSecond(1_000_000).as_mbps(), 1.0);
        assert_eq!(BitsPerSecond(0).as_mbps(), 0.0);
        assert_eq!(BitsPerSecond(2_500_000).as_mbps(), 2.5);
    }

    #[test]
    fn negative_raw_values_clamp_to_zero() {
        assert_eq!(BitsPerSecond::from_raw(-10), BitsPerSecond(0));
        assert_eq!(non_negative(-1), 0);
        assert_eq!(non_negative_f64(-3.5), 0.0);
        assert_eq!(non_negative_f64(f64::NAN), 0.0);
        assert_eq!(non_negative_f64(42.0), 42.0);
    }

    #[test]
    fn format_mbps_uses_two_decimals() {
        assert_eq!(format_mbps(BitsPerSecond(12_345_678)), "12.35 Mbps");
        assert_eq!(BitsPerSecond(1_000_000).to_string(), "1.00 Mbps");
    }

    #[test]
    fn timestamp_display_is_deterministic() {
        let a = epoch_ms_to_datetime(1_700_000_000_123).unwrap();
        let b = epoch_ms_to_datetime(1_700_000_000_123).unwrap();
        assert_eq!(display_timestamp(&a), "2023-11-14T22:13:20.123Z");
        assert_eq!(display_timestamp(&a), display_timestamp(&b));
        let epoch = epoch_ms_to_datetime(0).unwrap();
        assert_eq!(display_timestamp(&epoch), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn out_of_range_epoch_is_none() {
        assert!(epoch_ms_to_datetime(i64::MAX).is_none());
    }
}
