//! promkit core: an in-process metrics registry and text exposition engine.
//!
//! Producers update counters, gauges and histograms through cheap handles;
//! a scrape calls [`Registry::bridge`] and gets back the whole metric set in
//! the Prometheus text format (0.0.4). The crate has no runtime or transport
//! dependencies; serving the text is left to the caller.
//!
//! Panics, `unwrap` and `expect` are compile-denied here. Every fallible
//! path returns [`MetricsError`].

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod buckets;
pub mod buffer;
pub mod collector;
pub mod error;
pub mod formatter;
pub mod list;
pub mod map;
pub mod metric;
pub mod naming;
pub mod registry;
pub mod sample;

pub use buckets::BucketSet;
pub use collector::{Collector, Refresh, RefreshingCollector, StaticCollector};
pub use error::{ErrorCode, MetricsError, Result};
pub use metric::{Counter, Gauge, Histogram, Metric, MetricType};
pub use registry::{
    default_registry, init_default, install_default, teardown_default, Features, Registry,
    RegistryOptions,
};
