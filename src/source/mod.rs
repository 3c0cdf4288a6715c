//! Latency source abstraction.
//!
//! A source turns the configured topology into one full snapshot of
//! readings per call. The live feed drives it on a timer; tests and the
//! export mode drive it directly.

mod simulated;

pub use simulated::{is_local, SimulatedSource, LOCAL_RANGE_MS, REMOTE_RANGE_MS};

use std::fmt::Debug;

use latwatch_types::{Exchange, Region, Snapshot};

use crate::error::GenerateError;

/// Trait for producing latency snapshots.
///
/// Implementations must return exactly one reading per exchange × region
/// pair, all stamped with the same timestamp.
///
/// # Example
///
/// ```
/// use latwatch::{LatencySource, SimulatedSource, Topology};
///
/// let topology = Topology::builtin();
/// let mut source = SimulatedSource::seeded(7);
/// let snapshot = source.generate(topology.exchanges(), topology.regions()).unwrap();
/// assert_eq!(snapshot.len(), 30);
/// ```
pub trait LatencySource: Send + Debug {
    /// Produce one snapshot covering the full cross product.
    fn generate(
        &mut self,
        exchanges: &[Exchange],
        regions: &[Region],
    ) -> Result<Snapshot, GenerateError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
