//! Randomized latency readings for demo and testing.

use std::ops::Range;

use latwatch_types::{current_timestamp_ms, Exchange, Region, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::LatencySource;
use crate::error::GenerateError;

/// Latency range for pairs that are close to each other.
pub const LOCAL_RANGE_MS: Range<u32> = 5..35;

/// Latency range for everything else.
pub const REMOTE_RANGE_MS: Range<u32> = 50..200;

/// Maximum latitude and longitude difference for a pair to count as local.
const LOCAL_RADIUS_DEG: f64 = 15.0;

/// Whether an exchange and a region are close enough to count as local.
///
/// A cheap bounding-box test on raw degrees, not a geodesic distance.
/// Longitude is compared the short way round the antimeridian.
pub fn is_local(exchange: &Exchange, region: &Region) -> bool {
    let dlat = (exchange.lat - region.lat).abs();
    let dlon = shortest_lon_delta(exchange.lon, region.lon).abs();
    dlat <= LOCAL_RADIUS_DEG && dlon <= LOCAL_RADIUS_DEG
}

/// Signed longitude difference in (-180, 180].
fn shortest_lon_delta(from: f64, to: f64) -> f64 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Source that draws latencies uniformly from fixed ranges.
#[derive(Debug)]
pub struct SimulatedSource {
    rng: StdRng,
    description: String,
}

impl SimulatedSource {
    /// Create a source seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            description: "simulated".to_string(),
        }
    }

    /// Create a source with a fixed seed; the same seed yields the same
    /// sequence of latencies.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            description: format!("simulated (seed {})", seed),
        }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencySource for SimulatedSource {
    fn generate(
        &mut self,
        exchanges: &[Exchange],
        regions: &[Region],
    ) -> Result<Snapshot, GenerateError> {
        let mut snapshot =
            Snapshot::with_capacity(current_timestamp_ms(), exchanges.len() * regions.len());

        for exchange in exchanges {
            for region in regions {
                let range = if is_local(exchange, region) {
                    LOCAL_RANGE_MS
                } else {
                    REMOTE_RANGE_MS
                };
                let ms = self.rng.gen_range(range);
                snapshot.push(exchange.id.clone(), region.id.clone(), ms);
            }
        }

        Ok(snapshot)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
