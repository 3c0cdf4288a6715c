//! User selection over providers, exchanges and connection visibility.

use std::collections::{BTreeSet, HashSet};

use latwatch_types::{Exchange, ExchangeId, LatencyReading, Provider, Region, Snapshot};

use crate::geo::{self, Vec3};
use crate::topology::Topology;

/// A visible reading with its projected endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Connection<'a> {
    pub reading: &'a LatencyReading,
    pub exchange: &'a Exchange,
    pub region: &'a Region,
    pub start: Vec3,
    pub end: Vec3,
}

/// Active providers, active exchanges and the show-connections flag.
///
/// Starts with everything active. Every toggle is its own inverse, and
/// toggling an id the topology doesn't know is accepted silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    providers: BTreeSet<Provider>,
    exchanges: HashSet<ExchangeId>,
    show_connections: bool,
}

impl FilterState {
    /// Initial selection for a topology: all providers and exchanges active.
    pub fn new(topology: &Topology) -> Self {
        Self {
            providers: Provider::ALL.into_iter().collect(),
            exchanges: topology.exchanges().iter().map(|e| e.id.clone()).collect(),
            show_connections: true,
        }
    }

    /// Restore the initial selection.
    pub fn reset(&mut self, topology: &Topology) {
        *self = Self::new(topology);
    }

    pub fn toggle_provider(&mut self, provider: Provider) {
        if !self.providers.remove(&provider) {
            self.providers.insert(provider);
        }
    }

    pub fn toggle_exchange(&mut self, id: &ExchangeId) {
        if !self.exchanges.remove(id) {
            self.exchanges.insert(id.clone());
        }
    }

    pub fn toggle_connections(&mut self) {
        self.show_connections = !self.show_connections;
    }

    pub fn active_providers(&self) -> &BTreeSet<Provider> {
        &self.providers
    }

    pub fn active_exchanges(&self) -> &HashSet<ExchangeId> {
        &self.exchanges
    }

    pub fn show_connections(&self) -> bool {
        self.show_connections
    }

    pub fn is_provider_active(&self, provider: Provider) -> bool {
        self.providers.contains(&provider)
    }

    pub fn is_exchange_active(&self, id: &str) -> bool {
        self.exchanges.contains(id)
    }

    fn exchange_passes(&self, exchange: &Exchange) -> bool {
        self.is_provider_active(exchange.provider) && self.is_exchange_active(exchange.id.as_str())
    }

    /// Exchanges whose provider and id are both active.
    pub fn visible_exchanges<'a>(&self, topology: &'a Topology) -> Vec<&'a Exchange> {
        topology.exchanges().iter().filter(|e| self.exchange_passes(e)).collect()
    }

    /// Regions whose provider is active.
    pub fn visible_regions<'a>(&self, topology: &'a Topology) -> Vec<&'a Region> {
        topology
            .regions()
            .iter()
            .filter(|r| self.is_provider_active(r.provider))
            .collect()
    }

    /// Readings whose exchange is visible; empty while connections are hidden.
    ///
    /// Only the exchange side is filtered: a reading to a region of an
    /// inactive provider stays visible.
    pub fn visible_readings<'a>(
        &self,
        topology: &Topology,
        snapshot: &'a Snapshot,
    ) -> Vec<&'a LatencyReading> {
        if !self.show_connections {
            return Vec::new();
        }

        snapshot
            .iter()
            .filter(|r| {
                topology
                    .exchange(r.exchange_id().as_str())
                    .is_some_and(|e| self.exchange_passes(e))
            })
            .collect()
    }

    /// Visible readings paired with their projected marker positions.
    ///
    /// Readings whose region is unknown to the topology are skipped.
    pub fn visible_connections<'a>(
        &self,
        topology: &'a Topology,
        snapshot: &'a Snapshot,
    ) -> Vec<Connection<'a>> {
        self.visible_readings(topology, snapshot)
            .into_iter()
            .filter_map(|reading| {
                let exchange = topology.exchange(reading.exchange_id().as_str())?;
                let region = topology.region(reading.region_id().as_str())?;
                Some(Connection {
                    reading,
                    exchange,
                    region,
                    start: geo::marker_position(exchange),
                    end: geo::marker_position(region),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LatencySource, SimulatedSource};

    fn setup() -> (Topology, Snapshot) {
        let topology = Topology::builtin();
        let snapshot = SimulatedSource::seeded(5)
            .generate(topology.exchanges(), topology.regions())
            .unwrap();
        (topology, snapshot)
    }

    #[test]
    fn everything_visible_initially() {
        let (topology, snapshot) = setup();
        let filter = FilterState::new(&topology);

        assert!(filter.show_connections());
        assert_eq!(filter.active_providers().len(), 3);
        assert_eq!(filter.visible_exchanges(&topology).len(), 6);
        assert_eq!(filter.visible_regions(&topology).len(), 5);
        assert_eq!(filter.visible_readings(&topology, &snapshot).len(), 30);
        assert_eq!(filter.visible_connections(&topology, &snapshot).len(), 30);
    }

    #[test]
    fn provider_toggle_hides_exchange_side_only() {
        let (topology, snapshot) = setup();
        let mut filter = FilterState::new(&topology);
        filter.toggle_provider(Provider::Aws);

        // Three AWS exchanges and two AWS regions drop out.
        assert_eq!(filter.visible_exchanges(&topology).len(), 3);
        assert_eq!(filter.visible_regions(&topology).len(), 3);

        // Readings to AWS regions remain, readings from AWS exchanges go.
        let readings = filter.visible_readings(&topology, &snapshot);
        assert_eq!(readings.len(), 15);
        assert!(readings.iter().any(|r| r.region_id().as_str() == "aws_us_e"));
        assert!(readings.iter().all(|r| {
            topology.exchange(r.exchange_id().as_str()).unwrap().provider != Provider::Aws
        }));
    }

    #[test]
    fn exchange_toggle_removes_its_readings() {
        let (topology, snapshot) = setup();
        let mut filter = FilterState::new(&topology);
        filter.toggle_exchange(&ExchangeId::new("okx_eu_w"));

        assert!(!filter.is_exchange_active("okx_eu_w"));
        assert_eq!(filter.visible_exchanges(&topology).len(), 5);
        let readings = filter.visible_readings(&topology, &snapshot);
        assert_eq!(readings.len(), 25);
        assert!(readings.iter().all(|r| r.exchange_id().as_str() != "okx_eu_w"));
    }

    #[test]
    fn hidden_connections_yield_nothing() {
        let (topology, snapshot) = setup();
        let mut filter = FilterState::new(&topology);
        filter.toggle_connections();

        assert!(filter.visible_readings(&topology, &snapshot).is_empty());
        assert!(filter.visible_connections(&topology, &snapshot).is_empty());
        // Markers are unaffected.
        assert_eq!(filter.visible_exchanges(&topology).len(), 6);
    }

    #[test]
    fn toggles_are_involutions() {
        let topology = Topology::builtin();
        let initial = FilterState::new(&topology);
        let mut filter = initial.clone();

        filter.toggle_provider(Provider::Gcp);
        filter.toggle_provider(Provider::Gcp);
        filter.toggle_exchange(&ExchangeId::new("bybit_asia_e"));
        filter.toggle_exchange(&ExchangeId::new("bybit_asia_e"));
        filter.toggle_connections();
        filter.toggle_connections();

        assert_eq!(filter, initial);
    }

    #[test]
    fn unknown_exchange_is_harmless() {
        let (topology, snapshot) = setup();
        let mut filter = FilterState::new(&topology);
        filter.toggle_exchange(&ExchangeId::new("nope"));

        assert!(filter.is_exchange_active("nope"));
        assert_eq!(filter.visible_exchanges(&topology).len(), 6);
        assert_eq!(filter.visible_readings(&topology, &snapshot).len(), 30);
    }

    #[test]
    fn reset_restores_initial_selection() {
        let topology = Topology::builtin();
        let mut filter = FilterState::new(&topology);
        filter.toggle_provider(Provider::Azure);
        filter.toggle_connections();
        filter.reset(&topology);

        assert_eq!(filter, FilterState::new(&topology));
    }

    #[test]
    fn connection_endpoints_match_markers() {
        let (topology, snapshot) = setup();
        let filter = FilterState::new(&topology);

        for connection in filter.visible_connections(&topology, &snapshot) {
            assert_eq!(connection.start, geo::marker_position(connection.exchange));
            assert_eq!(connection.end, geo::marker_position(connection.region));
        }
    }
}
