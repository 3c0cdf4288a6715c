//! Aggregate counts for the header line.

use latwatch_types::{LatencyReading, Status};
use serde::Serialize;

/// Totals over a set of readings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SnapshotSummary {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    /// Mean latency in milliseconds, 0.0 when there are no readings.
    pub mean_ms: f64,
}

impl SnapshotSummary {
    pub fn from_readings<'a, I>(readings: I) -> Self
    where
        I: IntoIterator<Item = &'a LatencyReading>,
    {
        let mut summary = Self::default();
        let mut sum: u64 = 0;

        for reading in readings {
            summary.total += 1;
            sum += u64::from(reading.ms());
            match reading.status() {
                Status::Low => summary.low += 1,
                Status::Medium => summary.medium += 1,
                Status::High => summary.high += 1,
            }
        }

        if summary.total > 0 {
            summary.mean_ms = sum as f64 / summary.total as f64;
        }
        summary
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Low => self.low,
            Status::Medium => self.medium,
            Status::High => self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latwatch_types::{ExchangeId, RegionId};

    #[test]
    fn counts_by_status() {
        let readings: Vec<LatencyReading> = [5, 19, 20, 79, 80, 150]
            .into_iter()
            .map(|ms| LatencyReading::new(ExchangeId::new("e"), RegionId::new("r"), ms, 0))
            .collect();

        let summary = SnapshotSummary::from_readings(&readings);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.count(Status::Low), 2);
        assert_eq!(summary.count(Status::Medium), 2);
        assert_eq!(summary.count(Status::High), 2);
        assert!((summary.mean_ms - 58.833).abs() < 0.01);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = SnapshotSummary::from_readings(Vec::<LatencyReading>::new().iter());
        assert_eq!(summary, SnapshotSummary::default());
    }
}
