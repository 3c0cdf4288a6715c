//! Bounded history of latency readings for trend charts.

use std::collections::VecDeque;
use std::time::Duration;

use latwatch_types::LatencyReading;

use super::trend::{self, Trend};

/// Default number of readings to keep.
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Append-only FIFO store of readings, capped at a fixed capacity.
///
/// When an append pushes the length over capacity, the oldest readings are
/// dropped until it fits again. Insertion order is preserved.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    readings: VecDeque<LatencyReading>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` readings.
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a batch of readings, evicting the oldest when over capacity.
    pub fn append<I>(&mut self, readings: I)
    where
        I: IntoIterator<Item = LatencyReading>,
    {
        for reading in readings {
            self.readings.push_back(reading);
            if self.readings.len() > self.capacity {
                self.readings.pop_front();
            }
        }
    }

    /// All readings, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &LatencyReading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy the readings out, oldest first.
    pub fn to_vec(&self) -> Vec<LatencyReading> {
        self.readings.iter().cloned().collect()
    }

    /// Trend for one pair over the given window, ending at `now_ms`.
    pub fn trend(
        &self,
        exchange_id: &str,
        region_id: &str,
        window: Duration,
        now_ms: u64,
    ) -> Trend {
        trend::query(self.all(), exchange_id, region_id, window, now_ms)
    }
}
