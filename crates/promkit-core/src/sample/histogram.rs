//! Compound histogram sample: one cumulative counter per bucket plus
//! `+Inf`, `sum` and `count`, all updated as one transaction.

use std::sync::{Arc, RwLock};

use crate::buckets::BucketSet;
use crate::buffer::TextBuffer;
use crate::error::{poisoned, MetricsError, Result};
use crate::formatter::render_l_value;
use crate::map::Map;
use crate::metric::MetricType;
use crate::sample::Sample;

const KEY_INF: &str = "+Inf";
const KEY_SUM: &str = "sum";
const KEY_COUNT: &str = "count";

#[derive(Debug)]
pub struct HistogramSample {
    /// Render order: buckets ascending, `+Inf`, `sum`, `count`.
    l_values: Vec<String>,
    /// Bucket key (`"0.5"`, `"+Inf"`, `"sum"`, `"count"`) to l-value.
    l_value_by_key: Map<Arc<str>>,
    samples: Map<Arc<Sample>>,
    buckets: Arc<BucketSet>,
    lock: RwLock<()>,
}

impl HistogramSample {
    /// Build every sub-sample for one label combination.
    pub fn new(
        name: &str,
        buckets: Arc<BucketSet>,
        label_keys: &[String],
        label_values: &[&str],
    ) -> Result<Self> {
        let this = Self {
            l_values: Vec::with_capacity(buckets.len() + 3),
            l_value_by_key: Map::new(),
            samples: Map::new(),
            buckets,
            lock: RwLock::new(()),
        };
        this.init(name, label_keys, label_values)
    }

    fn init(mut self, name: &str, label_keys: &[String], label_values: &[&str]) -> Result<Self> {
        let mut keys: Vec<&str> = label_keys.iter().map(String::as_str).collect();
        keys.push("le");
        let mut values: Vec<&str> = label_values.to_vec();
        let mut buf = TextBuffer::new();

        let buckets = Arc::clone(&self.buckets);
        for (_, key) in buckets.iter().chain(std::iter::once((f64::INFINITY, KEY_INF))) {
            values.push(key);
            render_l_value(&mut buf, name, Some("bucket"), &keys, &values);
            values.pop();
            self.add_sub_sample(key, buf.dump())?;
        }

        for suffix in [KEY_SUM, KEY_COUNT] {
            render_l_value(&mut buf, name, Some(suffix), label_keys, label_values);
            self.add_sub_sample(suffix, buf.dump())?;
        }
        Ok(self)
    }

    fn add_sub_sample(&mut self, key: &str, l_value: String) -> Result<()> {
        self.l_value_by_key.set(key, Arc::from(l_value.as_str()))?;
        self.samples.set(
            &l_value,
            Arc::new(Sample::new(MetricType::Histogram, l_value.as_str(), 0.0)),
        )?;
        self.l_values.push(l_value);
        Ok(())
    }

    fn sub_sample(&self, key: &str) -> Result<Arc<Sample>> {
        let l_value = self
            .l_value_by_key
            .get(key)?
            .ok_or_else(|| MetricsError::Corrupt(format!("histogram has no l-value for {key}")))?;
        self.samples
            .get(&l_value)?
            .ok_or_else(|| MetricsError::Corrupt(format!("histogram has no sample {l_value}")))
    }

    /// Record one observation.
    ///
    /// Walks the bounds from the top down and bumps every bucket whose upper
    /// bound is `>= value`; stops at the first smaller bound. NaN lands in
    /// `+Inf` only.
    pub fn observe(&self, value: f64) -> Result<()> {
        let _guard = self.lock.write().map_err(|_| poisoned("histogram"))?;

        for (bound, key) in self.buckets.iter().rev() {
            if value.is_nan() || value > bound {
                break;
            }
            self.sub_sample(key)?.accumulate(1.0);
        }
        self.sub_sample(KEY_INF)?.accumulate(1.0);
        self.sub_sample(KEY_COUNT)?.accumulate(1.0);
        self.sub_sample(KEY_SUM)?.accumulate(value);
        Ok(())
    }

    /// Consistent snapshot of all sub-samples in render order.
    pub fn samples(&self) -> Result<Vec<Arc<Sample>>> {
        let _guard = self.lock.read().map_err(|_| poisoned("histogram"))?;
        self.l_values
            .iter()
            .map(|l| {
                self.samples
                    .get(l)?
                    .ok_or_else(|| MetricsError::Corrupt(format!("histogram has no sample {l}")))
            })
            .collect()
    }

    /// Rendered `(l_value, value)` pairs captured under the read lock.
    pub fn snapshot(&self) -> Result<Vec<(String, f64)>> {
        let _guard = self.lock.read().map_err(|_| poisoned("histogram"))?;
        self.l_values
            .iter()
            .map(|l| match self.samples.get(l)? {
                Some(s) => Ok((l.clone(), s.value())),
                None => Err(MetricsError::Corrupt(format!("histogram has no sample {l}"))),
            })
            .collect()
    }

    /// Current cumulative count of the bucket rendered as `le="{key}"`.
    pub fn bucket_value(&self, key: &str) -> Result<f64> {
        Ok(self.sub_sample(key)?.value())
    }

    pub fn count(&self) -> Result<f64> {
        self.bucket_value(KEY_COUNT)
    }

    pub fn sum(&self) -> Result<f64> {
        self.bucket_value(KEY_SUM)
    }

    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }
}
