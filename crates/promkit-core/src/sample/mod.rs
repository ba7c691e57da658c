//! Numeric cells addressed by their rendered l-value.
//!
//! A [`Sample`] stores an `f64` as its bit pattern in an `AtomicU64`.
//! Increments run a compare-and-retry loop, so concurrent writers never lose
//! an update and never block each other.

pub mod histogram;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{MetricsError, Result};
use crate::metric::MetricType;

pub use histogram::HistogramSample;

#[derive(Debug)]
pub struct Sample {
    kind: MetricType,
    l_value: String,
    bits: AtomicU64,
}

impl Sample {
    pub fn new(kind: MetricType, l_value: impl Into<String>, value: f64) -> Self {
        Self {
            kind,
            l_value: l_value.into(),
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn kind(&self) -> MetricType {
        self.kind
    }

    pub fn l_value(&self) -> &str {
        &self.l_value
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Add a non-negative delta.
    pub fn add(&self, delta: f64) -> Result<()> {
        if delta < 0.0 || delta.is_nan() {
            return Err(MetricsError::InvalidValue {
                l_value: self.l_value.clone(),
                value: delta,
            });
        }
        self.accumulate(delta);
        Ok(())
    }

    /// Subtract `delta`; gauges only.
    pub fn sub(&self, delta: f64) -> Result<()> {
        if self.kind != MetricType::Gauge {
            tracing::warn!(l_value = %self.l_value, kind = self.kind.as_str(), "sub on non-gauge sample");
            return Err(self.wrong_type("sub"));
        }
        self.accumulate(-delta);
        Ok(())
    }

    /// Store `value`. Gauges accept anything; counters only `value >= 0`.
    pub fn set(&self, value: f64) -> Result<()> {
        match self.kind {
            MetricType::Gauge => {}
            MetricType::Counter if value >= 0.0 => {}
            MetricType::Counter => {
                return Err(MetricsError::InvalidValue {
                    l_value: self.l_value.clone(),
                    value,
                })
            }
            _ => {
                tracing::warn!(l_value = %self.l_value, kind = self.kind.as_str(), "set on non-settable sample");
                return Err(self.wrong_type("set"));
            }
        }
        self.bits.store(value.to_bits(), Ordering::Release);
        Ok(())
    }

    /// Unchecked signed add used by `sub` and histogram sums.
    pub(crate) fn accumulate(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    fn wrong_type(&self, op: &'static str) -> MetricsError {
        MetricsError::WrongType {
            op,
            kind: self.kind.as_str(),
            l_value: self.l_value.clone(),
        }
    }
}
