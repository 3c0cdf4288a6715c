//! JSON export of the current feed state.

use std::fs;
use std::path::Path;

use latwatch_types::{current_timestamp_ms, Exchange, Region, Snapshot};
use serde::Serialize;
use tracing::info;

use crate::data::{SnapshotSummary, TimeRange, TrendStats};
use crate::error::ExportError;
use crate::feed::LiveFeed;

/// Everything needed to reproduce the dashboard offline.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub generated_at_ms: u64,
    pub source: String,
    pub exchanges: Vec<Exchange>,
    pub regions: Vec<Region>,
    pub snapshot: Option<Snapshot>,
    pub summary: SnapshotSummary,
    pub history_len: usize,
    pub trend_range: TimeRange,
    pub trends: Vec<PairTrend>,
}

/// Trend statistics for one exchange/region pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairTrend {
    pub key: String,
    pub name: String,
    pub samples: usize,
    pub stats: TrendStats,
}

impl ExportReport {
    /// Capture the feed's current state, with trends over `range`.
    pub fn capture(feed: &LiveFeed, range: TimeRange) -> Self {
        let now_ms = current_timestamp_ms();
        let topology = feed.topology();
        let snapshot = feed.snapshot().map(|s| s.as_ref().clone());
        let summary = snapshot
            .as_ref()
            .map(|s| SnapshotSummary::from_readings(s.readings()))
            .unwrap_or_default();

        let history = feed.history();
        let trends = topology
            .pairs()
            .into_iter()
            .map(|pair| {
                let trend = history.query(
                    pair.exchange_id.as_str(),
                    pair.region_id.as_str(),
                    range.duration(),
                    now_ms,
                );
                PairTrend {
                    key: pair.key(),
                    name: pair.name,
                    samples: trend.series.len(),
                    stats: trend.stats,
                }
            })
            .collect();

        Self {
            generated_at_ms: now_ms,
            source: feed.description(),
            exchanges: topology.exchanges().to_vec(),
            regions: topology.regions().to_vec(),
            snapshot,
            summary,
            history_len: history.len(),
            trend_range: range,
            trends,
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), pairs = self.trends.len(), "Exported latency report");
        Ok(())
    }
}
