//! Derived state over snapshots and history.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "7s", "500ms")
//! - [`filter`]: Provider/exchange selection and the visible sets derived from it
//! - [`history`]: Bounded FIFO of past readings
//! - [`summary`]: Per-status counts for the header
//! - [`trend`]: Windowed per-pair series and min/max/avg
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot ──▶ FilterState::visible_*() ──▶ renderer
//!    │
//!    └──▶ HistoryBuffer::append() ──▶ trend::query() ──▶ chart
//! ```

pub mod duration;
pub mod filter;
pub mod history;
pub mod summary;
pub mod trend;

pub use filter::{Connection, FilterState};
pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use summary::SnapshotSummary;
pub use trend::{TimeRange, Trend, TrendPoint, TrendStats};
