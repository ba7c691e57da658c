use std::sync::Arc;

use crate::error::Result;
use crate::metric::{Metric, MetricType};

/// Monotonically increasing family.
#[derive(Debug, Clone)]
pub struct Counter {
    metric: Arc<Metric>,
}

impl Counter {
    pub fn new(name: &str, help: &str, label_keys: &[&str]) -> Result<Self> {
        Ok(Self {
            metric: Arc::new(Metric::new(MetricType::Counter, name, help, label_keys)?),
        })
    }

    pub fn inc(&self, labels: &[&str]) -> Result<()> {
        self.add(1.0, labels)
    }

    /// Add `delta`; negative or NaN deltas are rejected.
    pub fn add(&self, delta: f64, labels: &[&str]) -> Result<()> {
        self.metric.sample_for(labels)?.add(delta)
    }

    /// Reset to an absolute non-negative value.
    pub fn set(&self, value: f64, labels: &[&str]) -> Result<()> {
        self.metric.sample_for(labels)?.set(value)
    }

    pub fn get(&self, labels: &[&str]) -> Result<f64> {
        Ok(self.metric.sample_for(labels)?.value())
    }

    pub fn metric(&self) -> Arc<Metric> {
        Arc::clone(&self.metric)
    }
}
