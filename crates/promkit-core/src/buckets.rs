//! Histogram bucket definitions.

use std::sync::{Arc, OnceLock};

use crate::error::{MetricsError, Result};
use crate::formatter::format_value;

/// Upper bounds used when a histogram is built without explicit buckets.
pub const DEFAULT_BOUNDS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static DEFAULT_BUCKETS: OnceLock<Arc<BucketSet>> = OnceLock::new();

/// Strictly ascending finite upper bounds, each with its rendered `le` key.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSet {
    bounds: Vec<f64>,
    keys: Vec<String>,
}

impl BucketSet {
    /// Explicit bounds.
    pub fn new(bounds: Vec<f64>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(MetricsError::InvalidBuckets("no bounds given".into()));
        }
        if let Some(bad) = bounds.iter().find(|b| !b.is_finite()) {
            return Err(MetricsError::InvalidBuckets(format!(
                "bound {bad} is not finite"
            )));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MetricsError::InvalidBuckets(
                "bounds must be strictly ascending".into(),
            ));
        }
        let keys = bounds.iter().map(|b| format_value(*b)).collect();
        Ok(Self { bounds, keys })
    }

    /// `count` bounds: `start, start + width, ..., start + (count - 1) * width`.
    pub fn linear(start: f64, width: f64, count: usize) -> Result<Self> {
        if count < 1 {
            return Err(MetricsError::InvalidBuckets("count must be at least 1".into()));
        }
        if width <= 0.0 || width.is_nan() {
            return Err(MetricsError::InvalidBuckets("width must be positive".into()));
        }
        Self::new((0..count).map(|i| start + width * i as f64).collect())
    }

    /// `count` bounds: `start, start * factor, start * factor^2, ...`.
    pub fn exponential(start: f64, factor: f64, count: usize) -> Result<Self> {
        if count < 1 {
            return Err(MetricsError::InvalidBuckets("count must be at least 1".into()));
        }
        if start <= 0.0 || start.is_nan() {
            return Err(MetricsError::InvalidBuckets("start must be greater than 0".into()));
        }
        if factor <= 1.0 || factor.is_nan() {
            return Err(MetricsError::InvalidBuckets("factor must be greater than 1".into()));
        }
        let mut bounds = Vec::with_capacity(count);
        let mut bound = start;
        for _ in 0..count {
            bounds.push(bound);
            bound *= factor;
        }
        Self::new(bounds)
    }

    /// Shared default set, built once.
    pub fn default_set() -> Arc<BucketSet> {
        Arc::clone(DEFAULT_BUCKETS.get_or_init(|| {
            let keys = DEFAULT_BOUNDS.iter().map(|b| format_value(*b)).collect();
            Arc::new(BucketSet {
                bounds: DEFAULT_BOUNDS.to_vec(),
                keys,
            })
        }))
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// `(bound, key)` pairs, ascending.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (f64, &str)> + '_ {
        self.bounds
            .iter()
            .copied()
            .zip(self.keys.iter().map(String::as_str))
    }
}
