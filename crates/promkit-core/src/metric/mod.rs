//! Metric families.
//!
//! A [`Metric`] owns a name, help text, label keys and one sample (or one
//! histogram sample) per distinct combination of label values. Samples are
//! created lazily on first access under the metric's creation lock, so two
//! racing callers for the same labels end up sharing one sample.

pub mod counter;
pub mod gauge;
pub mod histogram;

use std::sync::{Arc, Mutex};

use crate::buckets::BucketSet;
use crate::buffer::TextBuffer;
use crate::error::{poisoned, MetricsError, Result};
use crate::formatter::render_l_value;
use crate::map::Map;
use crate::naming::{check_label_key, check_metric_name};
use crate::sample::{HistogramSample, Sample};

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::Histogram;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    Untyped,
}

impl MetricType {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
            MetricType::Untyped => "untyped",
        }
    }
}

/// One entry of a metric's sample table.
#[derive(Debug, Clone)]
pub enum SampleSet {
    Scalar(Arc<Sample>),
    Histogram(Arc<HistogramSample>),
}

#[derive(Debug)]
pub struct Metric {
    kind: MetricType,
    name: String,
    help: String,
    label_keys: Vec<String>,
    buckets: Option<Arc<BucketSet>>,
    /// Keyed by [`series_key`] of the label values.
    samples: Map<SampleSet>,
    /// Serializes sample creation; holds the l-value scratch buffer.
    create: Mutex<TextBuffer>,
}

impl Metric {
    /// Counter or gauge family.
    pub fn new(kind: MetricType, name: &str, help: &str, label_keys: &[&str]) -> Result<Self> {
        match kind {
            MetricType::Counter | MetricType::Gauge => Self::build(kind, name, help, label_keys, None),
            MetricType::Histogram => Self::histogram(name, help, label_keys, None),
            MetricType::Summary | MetricType::Untyped => Err(MetricsError::WrongType {
                op: "create",
                kind: kind.as_str(),
                l_value: name.to_string(),
            }),
        }
    }

    /// Histogram family; `None` selects the shared default buckets.
    pub fn histogram(
        name: &str,
        help: &str,
        label_keys: &[&str],
        buckets: Option<BucketSet>,
    ) -> Result<Self> {
        let buckets = match buckets {
            Some(b) => Arc::new(b),
            None => BucketSet::default_set(),
        };
        Self::build(MetricType::Histogram, name, help, label_keys, Some(buckets))
    }

    fn build(
        kind: MetricType,
        name: &str,
        help: &str,
        label_keys: &[&str],
        buckets: Option<Arc<BucketSet>>,
    ) -> Result<Self> {
        check_metric_name(name)?;
        for key in label_keys {
            check_label_key(key)?;
        }
        Ok(Self {
            kind,
            name: name.to_string(),
            help: help.to_string(),
            label_keys: label_keys.iter().map(|k| k.to_string()).collect(),
            buckets,
            samples: Map::new(),
            create: Mutex::new(TextBuffer::new()),
        })
    }

    pub fn kind(&self) -> MetricType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_keys(&self) -> &[String] {
        &self.label_keys
    }

    pub fn buckets(&self) -> Option<&BucketSet> {
        self.buckets.as_deref()
    }

    /// Number of label combinations seen so far.
    pub fn series_count(&self) -> Result<usize> {
        self.samples.size()
    }

    /// Scalar sample for `values`, created at zero on first use.
    pub fn sample_for(&self, values: &[&str]) -> Result<Arc<Sample>> {
        match self.entry_for(values)? {
            SampleSet::Scalar(s) => Ok(s),
            SampleSet::Histogram(_) => Err(MetricsError::WrongType {
                op: "sample",
                kind: self.kind.as_str(),
                l_value: self.name.clone(),
            }),
        }
    }

    /// Histogram sample for `values`, created on first use.
    pub fn histogram_for(&self, values: &[&str]) -> Result<Arc<HistogramSample>> {
        match self.entry_for(values)? {
            SampleSet::Histogram(h) => Ok(h),
            SampleSet::Scalar(_) => Err(MetricsError::WrongType {
                op: "observe",
                kind: self.kind.as_str(),
                l_value: self.name.clone(),
            }),
        }
    }

    /// Snapshot of every sample set in creation order.
    pub fn sample_sets(&self) -> Result<Vec<SampleSet>> {
        self.samples.values()
    }

    fn entry_for(&self, values: &[&str]) -> Result<SampleSet> {
        if values.len() != self.label_keys.len() {
            return Err(MetricsError::LabelArity {
                expected: self.label_keys.len(),
                got: values.len(),
            });
        }
        let key = series_key(values);
        if let Some(found) = self.samples.get(&key)? {
            return Ok(found);
        }

        let mut buf = self.create.lock().map_err(|_| poisoned("metric"))?;
        // Another caller may have won the race while we waited.
        if let Some(found) = self.samples.get(&key)? {
            return Ok(found);
        }
        let created = match &self.buckets {
            Some(buckets) => SampleSet::Histogram(Arc::new(HistogramSample::new(
                &self.name,
                Arc::clone(buckets),
                &self.label_keys,
                values,
            )?)),
            None => {
                render_l_value(&mut buf, &self.name, None, &self.label_keys, values);
                SampleSet::Scalar(Arc::new(Sample::new(self.kind, buf.dump(), 0.0)))
            }
        };
        self.samples.set(&key, created.clone())?;
        Ok(created)
    }
}

/// Length-prefixed encoding of a label value tuple. Distinct tuples never
/// share a key, whatever bytes the values contain.
fn series_key(values: &[&str]) -> String {
    let mut key = String::with_capacity(values.iter().map(|v| v.len() + 4).sum());
    for v in values {
        key.push_str(&v.len().to_string());
        key.push(':');
        key.push_str(v);
    }
    key
}
