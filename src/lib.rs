//! # latwatch
//!
//! Live latency map between exchange co-location sites and cloud regions.
//!
//! A [`LiveFeed`] drives a [`LatencySource`] on a timer, keeps a bounded
//! [`HistoryBuffer`] of readings and publishes each snapshot on a watch
//! channel. Consumers derive what to show with [`FilterState`], chart
//! per-pair history with [`data::trend`], and place everything on a sphere
//! with [`geo::project`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  source ──▶ feed ──┬──▶ watch<FeedStatus> ──▶ app ──▶ ui     │
//! │                    │                          │              │
//! │                    └──▶ HistoryBuffer ──▶ trend              │
//! │                                                              │
//! │  topology ──▶ FilterState ──▶ visible sets ──▶ geo ──▶ globe │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`LatencySource`] trait and the randomized [`SimulatedSource`]
//! - **[`feed`]**: Scheduling, status publishing and history retention
//! - **[`data`]**: History, filters, trends and summaries
//! - **[`geo`]**: Sphere projection and arc geometry
//! - **[`config`]**: Settings from a TOML file and `LATWATCH_*` environment variables
//! - **[`app`]** / **[`ui`]**: The interactive terminal consumer
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Interactive dashboard with the built-in sites
//! latwatch
//!
//! # Faster refresh, reproducible readings
//! latwatch --interval 2s --seed 42
//!
//! # Run five cycles and write a JSON report
//! latwatch --export report.json --cycles 5
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use latwatch::{FeedConfig, FilterState, LiveFeed, SimulatedSource, Topology};
//!
//! # tokio_test::block_on(async {
//! let topology = Arc::new(Topology::builtin());
//! let source = Box::new(SimulatedSource::new());
//! let feed = LiveFeed::new(topology.clone(), source, FeedConfig::default()).unwrap();
//!
//! let mut status = feed.subscribe();
//! let handle = feed.start().unwrap();
//!
//! status.changed().await.unwrap();
//! if let Some(snapshot) = status.borrow().snapshot.clone() {
//!     let filter = FilterState::new(&topology);
//!     println!("{} visible readings", filter.visible_readings(&topology, &snapshot).len());
//! }
//!
//! handle.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod feed;
pub mod geo;
pub mod source;
pub mod topology;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{FilterState, HistoryBuffer, SnapshotSummary, TimeRange, Trend, TrendStats};
pub use error::{ConfigError, ExportError, FeedError, GenerateError};
pub use export::ExportReport;
pub use feed::{FeedConfig, FeedHandle, FeedStatus, HistoryView, LiveFeed};
pub use source::{LatencySource, SimulatedSource};
pub use topology::{ConnectionPair, Topology};

pub use latwatch_types::{
    Exchange, ExchangeId, LatencyReading, Provider, Region, RegionId, Snapshot, Status,
};
