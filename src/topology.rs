//! The static set of exchanges and regions, loaded once at startup.

use std::collections::HashMap;

use latwatch_types::{Exchange, ExchangeId, Provider, Region, RegionId};
use serde::Serialize;

use crate::error::ConfigError;

/// Separator used in connection pair keys ("<exchange>_to_<region>").
const PAIR_KEY_SEPARATOR: &str = "_to_";

/// Immutable site configuration.
///
/// Validated on construction: ids are unique per kind, coordinates are in
/// range, and both lists are non-empty.
#[derive(Debug, Clone)]
pub struct Topology {
    exchanges: Vec<Exchange>,
    regions: Vec<Region>,
    exchange_index: HashMap<ExchangeId, usize>,
    region_index: HashMap<RegionId, usize>,
}

impl Topology {
    /// Build a validated topology.
    pub fn new(exchanges: Vec<Exchange>, regions: Vec<Region>) -> Result<Self, ConfigError> {
        if exchanges.is_empty() || regions.is_empty() {
            return Err(ConfigError::EmptyTopology);
        }

        let mut exchange_index = HashMap::with_capacity(exchanges.len());
        for (i, e) in exchanges.iter().enumerate() {
            check_coordinates("exchange", e.id.as_str(), e.lat, e.lon)?;
            if exchange_index.insert(e.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateId {
                    kind: "exchange",
                    id: e.id.to_string(),
                });
            }
        }

        let mut region_index = HashMap::with_capacity(regions.len());
        for (i, r) in regions.iter().enumerate() {
            check_coordinates("region", r.id.as_str(), r.lat, r.lon)?;
            if region_index.insert(r.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateId {
                    kind: "region",
                    id: r.id.to_string(),
                });
            }
        }

        Ok(Self {
            exchanges,
            regions,
            exchange_index,
            region_index,
        })
    }

    /// The built-in demo topology: six exchanges and five cloud regions.
    pub fn builtin() -> Self {
        let exchanges = vec![
            exchange(
                "binance_us_e",
                "Binance US",
                "Virginia, USA",
                Provider::Aws,
                39.0437,
                -77.4875,
            ),
            exchange(
                "okx_eu_w",
                "OKX",
                "London, UK",
                Provider::Gcp,
                51.5072,
                0.1276,
            ),
            exchange(
                "bybit_asia_e",
                "Bybit",
                "Tokyo, Japan",
                Provider::Azure,
                35.6895,
                139.6917,
            ),
            exchange(
                "deribit_eu",
                "Deribit",
                "Amsterdam, NL",
                Provider::Aws,
                52.3676,
                4.9041,
            ),
            exchange(
                "coinbase_eu",
                "Coinbase",
                "Dublin, IE",
                Provider::Aws,
                53.3498,
                -6.2603,
            ),
            exchange(
                "kucoin_asia_s",
                "Kucoin",
                "Singapore",
                Provider::Gcp,
                1.3521,
                103.8198,
            ),
        ];
        let regions = vec![
            region(
                "aws_us_e",
                "AWS N. Virginia",
                "us-east-1",
                Provider::Aws,
                38.9072,
                -77.0369,
            ),
            region(
                "gcp_eu_w",
                "GCP London",
                "europe-west2",
                Provider::Gcp,
                51.5074,
                0.1278,
            ),
            region(
                "azure_asia_e",
                "Azure Japan East",
                "japaneast",
                Provider::Azure,
                35.6895,
                139.6917,
            ),
            region(
                "aws_eu_w",
                "AWS Ireland",
                "eu-west-1",
                Provider::Aws,
                53.3498,
                -6.2603,
            ),
            region(
                "gcp_asia_s",
                "GCP Singapore",
                "asia-southeast1",
                Provider::Gcp,
                1.3521,
                103.8198,
            ),
        ];

        // The built-in data is known to be valid.
        Self::new(exchanges, regions).unwrap_or_else(|e| unreachable!("builtin topology: {e}"))
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn exchange(&self, id: &str) -> Option<&Exchange> {
        self.exchange_index.get(id).map(|&i| &self.exchanges[i])
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.region_index.get(id).map(|&i| &self.regions[i])
    }

    /// Number of readings in one full snapshot.
    pub fn pair_count(&self) -> usize {
        self.exchanges.len() * self.regions.len()
    }

    /// Every exchange × region pair, exchanges outermost.
    pub fn pairs(&self) -> Vec<ConnectionPair> {
        self.exchanges
            .iter()
            .flat_map(|e| self.regions.iter().map(move |r| ConnectionPair::new(e, r)))
            .collect()
    }
}

fn check_coordinates(kind: &'static str, id: &str, lat: f64, lon: f64) -> Result<(), ConfigError> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(ConfigError::Coordinates {
            kind,
            id: id.to_string(),
            lat,
            lon,
        })
    }
}

fn exchange(
    id: &str,
    name: &str,
    location: &str,
    provider: Provider,
    lat: f64,
    lon: f64,
) -> Exchange {
    Exchange {
        id: ExchangeId::new(id),
        name: name.to_string(),
        location: location.to_string(),
        provider,
        lat,
        lon,
    }
}

fn region(id: &str, name: &str, code: &str, provider: Provider, lat: f64, lon: f64) -> Region {
    Region {
        id: RegionId::new(id),
        name: name.to_string(),
        code: code.to_string(),
        provider,
        lat,
        lon,
    }
}

/// A selectable (exchange, region) pair for trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionPair {
    pub exchange_id: ExchangeId,
    pub region_id: RegionId,
    /// e.g. "OKX (GCP) → europe-west2"
    pub name: String,
}

impl ConnectionPair {
    pub fn new(exchange: &Exchange, region: &Region) -> Self {
        Self {
            exchange_id: exchange.id.clone(),
            region_id: region.id.clone(),
            name: format!("{} ({}) → {}", exchange.name, exchange.provider, region.code),
        }
    }

    /// Stable key, "<exchange>_to_<region>".
    pub fn key(&self) -> String {
        format!("{}{}{}", self.exchange_id, PAIR_KEY_SEPARATOR, self.region_id)
    }

    /// Split a pair key back into its exchange and region ids.
    pub fn parse_key(key: &str) -> Option<(ExchangeId, RegionId)> {
        let (exchange, region) = key.split_once(PAIR_KEY_SEPARATOR)?;
        if exchange.is_empty() || region.is_empty() {
            return None;
        }
        Some((ExchangeId::new(exchange), RegionId::new(region)))
    }
}
