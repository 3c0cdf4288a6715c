//! Latency readings and their status classification.

use crate::{ExchangeId, RegionId};

/// Readings below this latency are [`Status::Low`].
pub const LOW_THRESHOLD_MS: u32 = 20;

/// Readings below this latency (and at or above [`LOW_THRESHOLD_MS`]) are
/// [`Status::Medium`]; everything else is [`Status::High`].
pub const MEDIUM_THRESHOLD_MS: u32 = 80;

/// Latency severity tier.
///
/// Always derived from the millisecond value via [`Status::from_ms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Status {
    Low,
    Medium,
    High,
}

impl Status {
    /// Every status, lowest first.
    pub const ALL: [Status; 3] = [Status::Low, Status::Medium, Status::High];

    /// Classify a latency value against the two fixed thresholds.
    pub const fn from_ms(ms: u32) -> Self {
        if ms < LOW_THRESHOLD_MS {
            Status::Low
        } else if ms < MEDIUM_THRESHOLD_MS {
            Status::Medium
        } else {
            Status::High
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Low => "LOW",
            Status::Medium => "MED",
            Status::High => "HIGH",
        }
    }

    /// Line width hint for drawing a connection with this status.
    pub fn line_width(&self) -> u8 {
        match self {
            Status::High => 6,
            _ => 2,
        }
    }
}

/// One latency measurement between an exchange and a region.
///
/// Immutable once created; the status is computed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "ReadingRecord"))]
pub struct LatencyReading {
    exchange_id: ExchangeId,
    region_id: RegionId,
    ms: u32,
    status: Status,
    timestamp_ms: u64,
}

impl LatencyReading {
    pub fn new(exchange_id: ExchangeId, region_id: RegionId, ms: u32, timestamp_ms: u64) -> Self {
        Self {
            exchange_id,
            region_id,
            ms,
            status: Status::from_ms(ms),
            timestamp_ms,
        }
    }

    pub fn exchange_id(&self) -> &ExchangeId {
        &self.exchange_id
    }

    pub fn region_id(&self) -> &RegionId {
        &self.region_id
    }

    /// Latency in milliseconds.
    pub fn ms(&self) -> u32 {
        self.ms
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Capture time, milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Whether this reading connects the given pair.
    pub fn is_pair(&self, exchange_id: &str, region_id: &str) -> bool {
        self.exchange_id.as_str() == exchange_id && self.region_id.as_str() == region_id
    }

    /// Animation speed hint for a pulse travelling along the connection.
    pub fn pulse_speed(&self) -> f64 {
        f64::from(self.ms) / 100.0
    }
}

/// Wire shape of a reading; any serialized status is ignored and recomputed.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ReadingRecord {
    exchange_id: ExchangeId,
    region_id: RegionId,
    ms: u32,
    timestamp_ms: u64,
}

#[cfg(feature = "serde")]
impl From<ReadingRecord> for LatencyReading {
    fn from(r: ReadingRecord) -> Self {
        LatencyReading::new(r.exchange_id, r.region_id, r.ms, r.timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries() {
        assert_eq!(Status::from_ms(0), Status::Low);
        assert_eq!(Status::from_ms(19), Status::Low);
        assert_eq!(Status::from_ms(20), Status::Medium);
        assert_eq!(Status::from_ms(79), Status::Medium);
        assert_eq!(Status::from_ms(80), Status::High);
        assert_eq!(Status::from_ms(199), Status::High);
    }

    #[test]
    fn status_is_ordered() {
        assert!(Status::Low < Status::Medium);
        assert!(Status::Medium < Status::High);
    }

    #[test]
    fn reading_derives_status() {
        let r = LatencyReading::new("binance_us_e".into(), "aws_us_e".into(), 42, 1000);
        assert_eq!(r.status(), Status::Medium);
        assert!(r.is_pair("binance_us_e", "aws_us_e"));
        assert!(!r.is_pair("aws_us_e", "binance_us_e"));
    }

    #[test]
    fn line_width_is_wider_for_high_latency() {
        assert_eq!(Status::High.line_width(), 6);
        assert_eq!(Status::Low.line_width(), 2);
    }

    #[test]
    fn pulse_speed_scales_with_latency() {
        let fast = LatencyReading::new("okx_eu_w".into(), "gcp_eu_w".into(), 10, 0);
        let slow = LatencyReading::new("okx_eu_w".into(), "aws_us_e".into(), 150, 0);
        assert_eq!(fast.pulse_speed(), 0.1);
        assert_eq!(slow.pulse_speed(), 1.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_status_is_recomputed() {
        let json = r#"{"exchange_id":"okx_eu_w","region_id":"gcp_eu_w","ms":150,
                       "status":"LOW","timestamp_ms":1}"#;
        let r: LatencyReading = serde_json::from_str(json).unwrap();
        assert_eq!(r.status(), Status::High);
    }
}
