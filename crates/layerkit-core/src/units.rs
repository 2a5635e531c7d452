//! Feed-rate unit helpers
//!
//! Speeds inside LayerKit are stored in mm/min, the unit G-code `F` words use.
//! These helpers convert to and from mm/s, the unit people usually think in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Feed rate units selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedRateUnits {
    /// Millimeters per minute
    #[default]
    MmPerMin,
    /// Millimeters per second
    MmPerSec,
}

impl fmt::Display for FeedRateUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MmPerMin => write!(f, "mm/min"),
            Self::MmPerSec => write!(f, "mm/sec"),
        }
    }
}

impl FromStr for FeedRateUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mm/min" | "mmm" => Ok(Self::MmPerMin),
            "mm/sec" | "mm/s" | "mms" => Ok(Self::MmPerSec),
            _ => Err(format!("Unknown feed rate units: {}", s)),
        }
    }
}

/// Convert mm/s to mm/min
pub const fn mm_per_sec(value: f64) -> f64 {
    value * 60.0
}

/// Convert mm/min to mm/s
pub const fn to_mm_per_sec(value_mm_per_min: f64) -> f64 {
    value_mm_per_min / 60.0
}

/// Format feed rate value for display
///
/// * `value_mm_per_min` - Feed rate in mm/min
/// * `units` - Target feed rate units
pub fn format_feed_rate(value_mm_per_min: f64, units: FeedRateUnits) -> String {
    match units {
        FeedRateUnits::MmPerMin => format!("{:.0} {}", value_mm_per_min, units),
        FeedRateUnits::MmPerSec => format!("{:.1} {}", to_mm_per_sec(value_mm_per_min), units),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(mm_per_sec(25.0), 1500.0);
        assert_eq!(to_mm_per_sec(9000.0), 150.0);
    }

    #[test]
    fn test_format_feed_rate() {
        assert_eq!(format_feed_rate(1500.0, FeedRateUnits::MmPerMin), "1500 mm/min");
        assert_eq!(format_feed_rate(1500.0, FeedRateUnits::MmPerSec), "25.0 mm/sec");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("mm/s".parse::<FeedRateUnits>(), Ok(FeedRateUnits::MmPerSec));
        assert!("furlongs".parse::<FeedRateUnits>().is_err());
    }
}
