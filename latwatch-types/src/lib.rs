//! # latwatch-types
//!
//! Core types for latency observability between exchange co-location sites
//! and cloud-provider regions. These types are the shared schema between the
//! sample generator, the live feed, and any consumer rendering the readings.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON export
//! - **Disjoint site kinds**: [`ExchangeId`] and [`RegionId`] are distinct types, so an
//!   exchange identifier can never be used where a region is expected
//! - **Derived status**: a reading's [`Status`] is always computed from its latency
//!
//! ## Example
//!
//! ```rust
//! use latwatch_types::{ExchangeId, RegionId, Snapshot, Status};
//!
//! let mut snapshot = Snapshot::with_timestamp(1_703_160_000_000);
//! snapshot.push(ExchangeId::new("okx_eu_w"), RegionId::new("gcp_eu_w"), 12);
//! snapshot.push(ExchangeId::new("okx_eu_w"), RegionId::new("aws_us_e"), 95);
//!
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.readings()[0].status(), Status::Low);
//! assert_eq!(snapshot.readings()[1].status(), Status::High);
//! ```

mod reading;
mod site;
mod snapshot;

pub use reading::*;
pub use site::*;
pub use snapshot::*;
