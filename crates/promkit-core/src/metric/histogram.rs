use std::sync::Arc;

use crate::buckets::BucketSet;
use crate::error::Result;
use crate::metric::Metric;
use crate::sample::HistogramSample;

/// Distribution of observations over fixed upper bounds.
#[derive(Debug, Clone)]
pub struct Histogram {
    metric: Arc<Metric>,
}

impl Histogram {
    /// `buckets: None` uses [`crate::buckets::DEFAULT_BOUNDS`].
    pub fn new(
        name: &str,
        help: &str,
        label_keys: &[&str],
        buckets: Option<BucketSet>,
    ) -> Result<Self> {
        Ok(Self {
            metric: Arc::new(Metric::histogram(name, help, label_keys, buckets)?),
        })
    }

    pub fn observe(&self, value: f64, labels: &[&str]) -> Result<()> {
        self.metric.histogram_for(labels)?.observe(value)
    }

    /// The compound sample for one label combination.
    pub fn sample(&self, labels: &[&str]) -> Result<Arc<HistogramSample>> {
        self.metric.histogram_for(labels)
    }

    pub fn metric(&self) -> Arc<Metric> {
        Arc::clone(&self.metric)
    }
}
