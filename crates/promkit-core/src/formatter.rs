//! Text exposition rendering (format 0.0.4).
//!
//! ```text
//! # HELP <prefix><name> <help>
//! # TYPE <prefix><name> <type>
//! <prefix><l_value> <value>
//! <blank line>
//! ```
//!
//! `# HELP` is skipped when the help text is empty; both comment lines are
//! skipped in compact mode. Every metric block ends with a blank line.

use std::sync::Arc;
use std::time::Instant;

use crate::buffer::TextBuffer;
use crate::collector::Collector;
use crate::error::Result;
use crate::metric::{Gauge, Metric, SampleSet};

/// Render a value the way the exposition format expects.
///
/// Shortest round-trip decimal, switching to exponent notation for very
/// small or very large magnitudes. Non-finite values use the Prometheus
/// spellings `NaN`, `+Inf` and `-Inf`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e21).contains(&abs) {
        format!("{v:e}")
    } else {
        format!("{v}")
    }
}

/// Append `name[_suffix]{k1="v1",k2="v2"}` to `out`. Values are copied
/// verbatim; keys and values are paired positionally.
pub fn render_l_value<K: AsRef<str>, V: AsRef<str>>(
    out: &mut TextBuffer,
    name: &str,
    suffix: Option<&str>,
    keys: &[K],
    values: &[V],
) {
    out.push_str(name);
    if let Some(suffix) = suffix {
        out.push('_');
        out.push_str(suffix);
    }
    if keys.is_empty() {
        return;
    }
    out.push('{');
    for (i, (key, value)) in keys.iter().zip(values).enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(key.as_ref());
        out.push_str("=\"");
        out.push_str(value.as_ref());
        out.push('"');
    }
    out.push('}');
}

/// Accumulates an exposition document.
#[derive(Debug, Default)]
pub struct Formatter {
    out: TextBuffer,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.out.clear();
    }

    pub fn as_str(&self) -> &str {
        self.out.as_str()
    }

    /// Hand back the rendered text and start over.
    pub fn dump(&mut self) -> String {
        self.out.dump()
    }

    fn push_name(&mut self, prefix: Option<&str>, name: &str) {
        if let Some(prefix) = prefix {
            self.out.push_str(prefix);
        }
        self.out.push_str(name);
    }

    pub fn load_help(&mut self, prefix: Option<&str>, name: &str, help: &str) {
        if help.is_empty() {
            return;
        }
        self.out.push_str("# HELP ");
        self.push_name(prefix, name);
        self.out.push(' ');
        self.out.push_str(help);
        self.out.push('\n');
    }

    pub fn load_type(&mut self, prefix: Option<&str>, name: &str, kind: &str) {
        self.out.push_str("# TYPE ");
        self.push_name(prefix, name);
        self.out.push(' ');
        self.out.push_str(kind);
        self.out.push('\n');
    }

    pub fn load_sample(&mut self, prefix: Option<&str>, l_value: &str, value: f64) {
        self.push_name(prefix, l_value);
        self.out.push(' ');
        self.out.push_str(&format_value(value));
        self.out.push('\n');
    }

    /// Render one metric block. On failure nothing from this metric remains
    /// in the output.
    pub fn load_metric(&mut self, metric: &Metric, prefix: Option<&str>, compact: bool) -> Result<()> {
        let mark = self.out.len();
        let rendered = self.render_metric(metric, prefix.filter(|p| !p.is_empty()), compact);
        if rendered.is_err() {
            self.out.truncate(mark);
        }
        rendered
    }

    fn render_metric(&mut self, metric: &Metric, prefix: Option<&str>, compact: bool) -> Result<()> {
        if !compact {
            self.load_help(prefix, metric.name(), metric.help());
            self.load_type(prefix, metric.name(), metric.kind().as_str());
        }
        for set in metric.sample_sets()? {
            match set {
                SampleSet::Scalar(sample) => {
                    self.load_sample(prefix, sample.l_value(), sample.value());
                }
                SampleSet::Histogram(hist) => {
                    for (l_value, value) in hist.snapshot()? {
                        self.load_sample(prefix, &l_value, value);
                    }
                }
            }
        }
        self.out.push('\n');
        Ok(())
    }

    /// Render every metric of every collector in order.
    ///
    /// When `scrape_timer` is given, the wall time of each collector's
    /// collect-and-render pass is stored in it under the collector's name.
    /// Failures are logged and skipped; the number of failures is returned.
    pub fn load_metrics(
        &mut self,
        collectors: &[(Arc<str>, Arc<dyn Collector>)],
        scrape_timer: Option<&Gauge>,
        prefix: Option<&str>,
        compact: bool,
    ) -> usize {
        let mut failures = 0;
        for (name, collector) in collectors {
            let started = Instant::now();
            let metrics = match collector.collect() {
                Ok(metrics) => metrics,
                Err(e) => {
                    tracing::warn!(collector = %name, error = %e, "collect failed");
                    failures += 1;
                    continue;
                }
            };
            for metric in metrics {
                if let Err(e) = self.load_metric(&metric, prefix, compact) {
                    tracing::warn!(
                        collector = %name,
                        metric = metric.name(),
                        error = %e,
                        "metric skipped"
                    );
                    failures += 1;
                }
            }
            if let Some(gauge) = scrape_timer {
                let elapsed = started.elapsed().as_secs_f64();
                if let Err(e) = gauge.set(elapsed, &[&**name]) {
                    tracing::warn!(collector = %name, error = %e, "scrape timing not recorded");
                    failures += 1;
                }
            }
        }
        failures
    }
}
