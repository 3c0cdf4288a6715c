//! Error types for the latency pipeline.

use thiserror::Error;

/// Errors raised while synthesizing a snapshot.
///
/// These never escape the live feed: a failed cycle is logged and the
/// previous snapshot stays visible.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The source could not produce readings.
    #[error("sample generation failed: {0}")]
    Failed(String),

    /// The source panicked while generating.
    #[error("sample generation panicked: {0}")]
    Panicked(String),
}

/// Errors that can occur while loading settings or building the topology.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A duration setting could not be parsed.
    #[error("Invalid duration for {field}: {value}")]
    Duration { field: &'static str, value: String },

    /// A time range setting is not one of the supported ranges.
    #[error("Unknown time range: {0} (expected 1h, 24h, 7d or 30d)")]
    TimeRange(String),

    /// The history buffer needs room for at least one reading.
    #[error("History capacity must be greater than zero")]
    ZeroCapacity,

    /// The generation interval must be non-zero.
    #[error("Feed interval must be greater than zero")]
    ZeroInterval,

    /// Two sites of the same kind share an identifier.
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// A site's coordinates are outside the documented ranges.
    #[error("{kind} {id} has invalid coordinates ({lat}, {lon})")]
    Coordinates {
        kind: &'static str,
        id: String,
        lat: f64,
        lon: f64,
    },

    /// The topology must contain at least one exchange and one region.
    #[error("Topology needs at least one exchange and one region")]
    EmptyTopology,
}

/// Errors from controlling a live feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed already has a periodic task.
    #[error("Latency feed is already running")]
    AlreadyRunning,
}

/// Errors raised while writing an export report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}
