//! Statically configured sites: exchanges and cloud regions.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Cloud provider owning a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provider {
    #[cfg_attr(feature = "serde", serde(rename = "AWS", alias = "aws"))]
    Aws,
    #[cfg_attr(feature = "serde", serde(rename = "GCP", alias = "gcp"))]
    Gcp,
    #[cfg_attr(feature = "serde", serde(rename = "Azure", alias = "azure", alias = "AZURE"))]
    Azure,
}

impl Provider {
    /// Every provider, in display order.
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Gcp, Provider::Azure];

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Aws => "AWS",
            Provider::Gcp => "GCP",
            Provider::Azure => "Azure",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a provider name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProviderError(pub String);

impl fmt::Display for ParseProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: {}", self.0)
    }
}

impl std::error::Error for ParseProviderError {}

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "gcp" => Ok(Provider::Gcp),
            "azure" => Ok(Provider::Azure),
            _ => Err(ParseProviderError(s.to_string())),
        }
    }
}

macro_rules! site_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

site_id!(
    /// Identifier of an exchange co-location site.
    ExchangeId
);

site_id!(
    /// Identifier of a cloud-provider region.
    RegionId
);

/// Shape shared by exchanges and regions.
pub trait Site {
    fn name(&self) -> &str;
    fn provider(&self) -> Provider;
    /// Latitude in degrees, [-90, 90].
    fn lat(&self) -> f64;
    /// Longitude in degrees, [-180, 180].
    fn lon(&self) -> f64;
}

/// An exchange co-location site.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exchange {
    pub id: ExchangeId,
    pub name: String,
    /// Human-readable location, e.g. "Tokyo, Japan".
    pub location: String,
    pub provider: Provider,
    pub lat: f64,
    pub lon: f64,
}

/// A cloud-provider region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    /// Provider region code, e.g. "us-east-1".
    pub code: String,
    pub provider: Provider,
    pub lat: f64,
    pub lon: f64,
}

impl Site for Exchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Provider {
        self.provider
    }

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl Site for Region {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Provider {
        self.provider
    }

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}
