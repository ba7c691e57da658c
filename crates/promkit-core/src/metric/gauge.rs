use std::sync::Arc;

use crate::error::Result;
use crate::metric::{Metric, MetricType};

/// Family whose samples can go up and down.
#[derive(Debug, Clone)]
pub struct Gauge {
    metric: Arc<Metric>,
}

impl Gauge {
    pub fn new(name: &str, help: &str, label_keys: &[&str]) -> Result<Self> {
        Ok(Self {
            metric: Arc::new(Metric::new(MetricType::Gauge, name, help, label_keys)?),
        })
    }

    pub fn inc(&self, labels: &[&str]) -> Result<()> {
        self.add(1.0, labels)
    }

    pub fn dec(&self, labels: &[&str]) -> Result<()> {
        self.sub(1.0, labels)
    }

    /// Add a non-negative delta.
    pub fn add(&self, delta: f64, labels: &[&str]) -> Result<()> {
        self.metric.sample_for(labels)?.add(delta)
    }

    pub fn sub(&self, delta: f64, labels: &[&str]) -> Result<()> {
        self.metric.sample_for(labels)?.sub(delta)
    }

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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn goes_both_ways() {
        let g = Gauge::new("in_flight", "", &["path"]).unwrap();
        g.inc(&["/a"]).unwrap();
        g.inc(&["/a"]).unwrap();
        g.dec(&["/a"]).unwrap();
        g.sub(3.0, &["/a"]).unwrap();
        assert_eq!(g.get(&["/a"]).unwrap(), -2.0);
        g.set(7.5, &["/a"]).unwrap();
        assert_eq!(g.get(&["/a"]).unwrap(), 7.5);
        assert_eq!(g.get(&["/b"]).unwrap(), 0.0);
    }
}
