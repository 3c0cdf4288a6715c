//! Settings loaded from an optional TOML file and `LATWATCH_*` environment variables.
//!
//! ```toml
//! [feed]
//! interval = "7s"
//! history_capacity = 500
//!
//! [trend]
//! range = "24h"
//!
//! [[exchanges]]
//! id = "okx_eu_w"
//! name = "OKX"
//! location = "London, UK"
//! provider = "GCP"
//! lat = 51.5072
//! lon = 0.1276
//! ```
//!
//! Nested keys map to environment variables with a double underscore,
//! e.g. `LATWATCH_FEED__INTERVAL=2s`.

use std::path::Path;

use config::{Config, Environment, File};
use latwatch_types::{Exchange, Region};
use serde::Deserialize;
use tracing::{debug, info};

use crate::data::duration::parse_duration;
use crate::data::{TimeRange, DEFAULT_HISTORY_CAPACITY};
use crate::error::ConfigError;
use crate::feed::FeedConfig;
use crate::topology::Topology;

const ENV_PREFIX: &str = "LATWATCH";

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feed: FeedSettings,
    pub trend: TrendSettings,
    /// Exchanges to monitor. Empty together with `regions` means the built-in set.
    pub exchanges: Vec<Exchange>,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Time between cycles, e.g. "7s" or "500ms".
    pub interval: String,
    pub history_capacity: usize,
    /// Fixed seed for reproducible readings.
    pub seed: Option<u64>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            interval: "7s".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// Initial trend window: 1h, 24h, 7d or 30d.
    pub range: String,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            range: TimeRange::default().label().to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) layered under the environment.
    ///
    /// A missing file is an error when a path is given explicitly.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        debug!(
            exchanges = settings.exchanges.len(),
            regions = settings.regions.len(),
            interval = %settings.feed.interval,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Build the topology, falling back to the built-in set when no sites
    /// are configured.
    pub fn topology(&self) -> Result<Topology, ConfigError> {
        if self.exchanges.is_empty() && self.regions.is_empty() {
            return Ok(Topology::builtin());
        }
        Topology::new(self.exchanges.clone(), self.regions.clone())
    }

    pub fn feed_config(&self) -> Result<FeedConfig, ConfigError> {
        let interval = parse_duration(&self.feed.interval).map_err(|_| ConfigError::Duration {
            field: "feed.interval",
            value: self.feed.interval.clone(),
        })?;

        let config = FeedConfig {
            interval,
            history_capacity: self.feed.history_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn time_range(&self) -> Result<TimeRange, ConfigError> {
        self.trend.range.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    use latwatch_types::Provider;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn defaults_use_builtin_topology() {
        let settings = Settings::default();
        let topology = settings.topology().unwrap();
        assert_eq!(topology.pair_count(), 30);

        let feed = settings.feed_config().unwrap();
        assert_eq!(feed, FeedConfig::default());
        assert_eq!(settings.time_range().unwrap(), TimeRange::Hour);
    }

    #[test]
    fn loads_file() {
        let file = write_config(
            r#"
[feed]
interval = "2s"
history_capacity = 120
seed = 7

[trend]
range = "7d"

[[exchanges]]
id = "okx_eu_w"
name = "OKX"
location = "London, UK"
provider = "GCP"
lat = 51.5072
lon = 0.1276

[[regions]]
id = "gcp_eu_w"
name = "GCP London"
code = "europe-west2"
provider = "GCP"
lat = 51.5074
lon = 0.1278
"#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.feed.seed, Some(7));
        assert_eq!(settings.time_range().unwrap(), TimeRange::Week);

        let feed = settings.feed_config().unwrap();
        assert_eq!(feed.interval, Duration::from_secs(2));
        assert_eq!(feed.history_capacity, 120);

        let topology = settings.topology().unwrap();
        assert_eq!(topology.pair_count(), 1);
        assert_eq!(topology.exchange("okx_eu_w").unwrap().provider, Provider::Gcp);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Settings::load(Some(&path)), Err(ConfigError::Load(_))));
    }

    #[test]
    fn rejects_duplicate_sites() {
        let file = write_config(
            r#"
[[exchanges]]
id = "dup"
name = "A"
location = "X"
provider = "AWS"
lat = 1.0
lon = 1.0

[[exchanges]]
id = "dup"
name = "B"
location = "Y"
provider = "AWS"
lat = 2.0
lon = 2.0

[[regions]]
id = "r"
name = "R"
code = "r-1"
provider = "AWS"
lat = 0.0
lon = 0.0
"#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert!(matches!(settings.topology(), Err(ConfigError::DuplicateId { .. })));
    }

    #[test]
    fn rejects_bad_values() {
        let mut settings = Settings::default();
        settings.feed.interval = "soon".to_string();
        assert!(matches!(
            settings.feed_config(),
            Err(ConfigError::Duration { field: "feed.interval", .. })
        ));

        let mut settings = Settings::default();
        settings.feed.history_capacity = 0;
        assert!(matches!(settings.feed_config(), Err(ConfigError::ZeroCapacity)));

        let mut settings = Settings::default();
        settings.trend.range = "1y".to_string();
        assert!(matches!(settings.time_range(), Err(ConfigError::TimeRange(_))));
    }

    #[test]
    fn sites_without_the_other_kind_are_rejected() {
        let topology = Topology::builtin();
        let settings = Settings {
            exchanges: topology.exchanges().to_vec(),
            ..Settings::default()
        };
        assert!(matches!(settings.topology(), Err(ConfigError::EmptyTopology)));
    }
}
