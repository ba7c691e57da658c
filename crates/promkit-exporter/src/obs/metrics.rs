//! Self-metrics of the exporter.

use std::sync::Arc;
use std::time::Duration;

use promkit_core::error::Result;
use promkit_core::{BucketSet, Collector, Counter, Histogram, Registry, StaticCollector};

pub const EXPORTER_COLLECTOR: &str = "exporter";

/// Request latency bounds in seconds: 100us up to 1s.
const LATENCY_BOUNDS: [f64; 9] = [
    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

#[derive(Debug, Clone)]
pub struct ExporterMetrics {
    pub http_requests: Counter,
    pub http_duration: Histogram,
    pub probe_errors: Counter,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http_requests: Counter::new(
                "promkit_http_requests_total",
                "HTTP requests served",
                &["path"],
            )?,
            http_duration: Histogram::new(
                "promkit_http_request_duration_seconds",
                "HTTP request latency",
                &["path"],
                Some(BucketSet::new(LATENCY_BOUNDS.to_vec())?),
            )?,
            probe_errors: Counter::new(
                "promkit_probe_errors_total",
                "Failed host probe runs",
                &["probe"],
            )?,
        })
    }

    /// Attach everything to a new `exporter` collector in `registry`.
    pub fn register(&self, registry: &Registry) -> Result<()> {
        let collector = Arc::new(StaticCollector::new(EXPORTER_COLLECTOR));
        collector.add_metric(self.http_requests.metric())?;
        collector.add_metric(self.http_duration.metric())?;
        collector.add_metric(self.probe_errors.metric())?;
        registry.register_collector(collector)
    }

    /// Count one request to `path` and record its latency. Failures are
    /// logged only; they never fail the request.
    pub fn observe_request(&self, path: &str, elapsed: Duration) {
        if let Err(e) = self.http_requests.inc(&[path]) {
            tracing::warn!(path, error = %e, "request not counted");
        }
        if let Err(e) = self.http_duration.observe(elapsed.as_secs_f64(), &[path]) {
            tracing::warn!(path, error = %e, "request latency not recorded");
        }
    }
}
