//! Snapshot - one generation cycle's full set of readings.

use crate::{ExchangeId, LatencyReading, RegionId};

/// The complete set of readings produced by one generation cycle.
///
/// Every reading in a snapshot shares the snapshot's timestamp; readings are
/// only added through [`Snapshot::push`], which stamps them.
///
/// # Example
///
/// ```rust
/// use latwatch_types::{ExchangeId, RegionId, Snapshot};
///
/// let mut snapshot = Snapshot::with_timestamp(42);
/// snapshot.push(ExchangeId::new("bybit_asia_e"), RegionId::new("azure_asia_e"), 8);
///
/// assert!(snapshot.readings().iter().all(|r| r.timestamp_ms() == 42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "SnapshotRecord"))]
pub struct Snapshot {
    /// Unix timestamp in milliseconds when this snapshot was generated.
    timestamp_ms: u64,
    readings: Vec<LatencyReading>,
}

impl Snapshot {
    /// Create an empty snapshot stamped with the current time.
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    /// Create an empty snapshot with a specific timestamp.
    pub fn with_timestamp(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            readings: Vec::new(),
        }
    }

    /// Create an empty snapshot with room for `capacity` readings.
    pub fn with_capacity(timestamp_ms: u64, capacity: usize) -> Self {
        Self {
            timestamp_ms,
            readings: Vec::with_capacity(capacity),
        }
    }

    /// Record a reading for a pair, stamped with the snapshot's timestamp.
    pub fn push(&mut self, exchange_id: ExchangeId, region_id: RegionId, ms: u32) {
        self.readings
            .push(LatencyReading::new(exchange_id, region_id, ms, self.timestamp_ms));
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn readings(&self) -> &[LatencyReading] {
        &self.readings
    }

    pub fn iter(&self) -> impl Iterator<Item = &LatencyReading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Look up the reading for a specific pair.
    pub fn get(&self, exchange_id: &str, region_id: &str) -> Option<&LatencyReading> {
        self.readings.iter().find(|r| r.is_pair(exchange_id, region_id))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a LatencyReading;
    type IntoIter = std::slice::Iter<'a, LatencyReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

/// Wire shape of a snapshot; readings are re-stamped with its timestamp.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SnapshotRecord {
    timestamp_ms: u64,
    readings: Vec<LatencyReading>,
}

#[cfg(feature = "serde")]
impl From<SnapshotRecord> for Snapshot {
    fn from(record: SnapshotRecord) -> Self {
        let mut snapshot = Snapshot::with_capacity(record.timestamp_ms, record.readings.len());
        for r in record.readings {
            snapshot.push(r.exchange_id().clone(), r.region_id().clone(), r.ms());
        }
        snapshot
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[test]
    fn push_stamps_snapshot_timestamp() {
        let mut snapshot = Snapshot::with_timestamp(1703160000000);
        snapshot.push("okx_eu_w".into(), "gcp_eu_w".into(), 10);
        snapshot.push("okx_eu_w".into(), "aws_us_e".into(), 120);

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|r| r.timestamp_ms() == 1703160000000));
    }

    #[test]
    fn get_finds_pair() {
        let mut snapshot = Snapshot::with_timestamp(1);
        snapshot.push("okx_eu_w".into(), "gcp_eu_w".into(), 10);

        let reading = snapshot.get("okx_eu_w", "gcp_eu_w").unwrap();
        assert_eq!(reading.status(), Status::Low);
        assert!(snapshot.get("gcp_eu_w", "okx_eu_w").is_none());
    }

    #[test]
    fn new_snapshot_uses_current_time() {
        let before = current_timestamp_ms();
        let snapshot = Snapshot::new();
        let after = current_timestamp_ms();

        assert!(snapshot.timestamp_ms() >= before);
        assert!(snapshot.timestamp_ms() <= after);
        assert!(snapshot.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_readings_with_status() {
        let mut snapshot = Snapshot::with_timestamp(7);
        snapshot.push("okx_eu_w".into(), "gcp_eu_w".into(), 90);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["timestamp_ms"], 7);
        assert_eq!(json["readings"][0]["status"], "HIGH");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_readings_take_snapshot_timestamp() {
        let json = r#"{"timestamp_ms":50,"readings":[
            {"exchange_id":"okx_eu_w","region_id":"gcp_eu_w","ms":12,"timestamp_ms":1},
            {"exchange_id":"okx_eu_w","region_id":"aws_us_e","ms":95,"timestamp_ms":999}
        ]}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|r| r.timestamp_ms() == 50));
        assert_eq!(snapshot.get("okx_eu_w", "aws_us_e").unwrap().ms(), 95);
    }
}
