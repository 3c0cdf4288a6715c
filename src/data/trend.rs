//! Per-pair latency trends over a time window.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use latwatch_types::{LatencyReading, Status};
use serde::Serialize;

use crate::error::ConfigError;

/// Selectable trend windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Hour,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    pub fn duration(&self) -> Duration {
        const HOUR: u64 = 3_600;
        match self {
            TimeRange::Hour => Duration::from_secs(HOUR),
            TimeRange::Day => Duration::from_secs(24 * HOUR),
            TimeRange::Week => Duration::from_secs(7 * 24 * HOUR),
            TimeRange::Month => Duration::from_secs(30 * 24 * HOUR),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Hour => "1h",
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }

    /// The next range, wrapping back to the first.
    pub fn next(&self) -> Self {
        match self {
            TimeRange::Hour => TimeRange::Day,
            TimeRange::Day => TimeRange::Week,
            TimeRange::Week => TimeRange::Month,
            TimeRange::Month => TimeRange::Hour,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TimeRange::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::TimeRange(s.to_string()))
    }
}

/// One point on a trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub timestamp_ms: u64,
    pub ms: u32,
    pub status: Status,
}

impl From<&LatencyReading> for TrendPoint {
    fn from(reading: &LatencyReading) -> Self {
        Self {
            timestamp_ms: reading.timestamp_ms(),
            ms: reading.ms(),
            status: reading.status(),
        }
    }
}

/// Summary statistics over a trend window. All zero when the window is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrendStats {
    pub min: u32,
    pub max: u32,
    /// Mean latency, rounded to the nearest millisecond.
    pub avg: u32,
}

/// Readings for one pair within a window, plus their statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Trend {
    pub series: Vec<TrendPoint>,
    pub stats: TrendStats,
}

impl Trend {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Latency values in series order, for sparklines.
    pub fn values(&self) -> Vec<u64> {
        self.series.iter().map(|p| u64::from(p.ms)).collect()
    }
}

/// Select the readings for one pair no older than `window` before `now_ms`.
///
/// The series keeps the input order. The window start saturates at zero.
pub fn query<'a, I>(
    readings: I,
    exchange_id: &str,
    region_id: &str,
    window: Duration,
    now_ms: u64,
) -> Trend
where
    I: IntoIterator<Item = &'a LatencyReading>,
{
    let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
    let cutoff = now_ms.saturating_sub(window_ms);

    let series: Vec<TrendPoint> = readings
        .into_iter()
        .filter(|r| r.is_pair(exchange_id, region_id) && r.timestamp_ms() >= cutoff)
        .map(TrendPoint::from)
        .collect();

    let stats = stats(&series);
    Trend { series, stats }
}

fn stats(series: &[TrendPoint]) -> TrendStats {
    if series.is_empty() {
        return TrendStats::default();
    }

    let mut min = u32::MAX;
    let mut max = 0;
    let mut sum: u64 = 0;
    for point in series {
        min = min.min(point.ms);
        max = max.max(point.ms);
        sum += u64::from(point.ms);
    }
    let avg = (sum as f64 / series.len() as f64).round() as u32;

    TrendStats { min, max, avg }
}
