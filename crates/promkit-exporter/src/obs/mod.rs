//! Exporter self-observability.
//!
//! The exporter measures its own HTTP traffic and probe failures with the
//! same registry it serves, under the `exporter` collector.

pub mod metrics;
