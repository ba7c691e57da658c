//! Named groups of metrics.
//!
//! A collector owns a set of metrics and hands them to the formatter on
//! every scrape through [`Collector::collect`]. [`StaticCollector`] returns
//! what it holds; [`RefreshingCollector`] first runs a [`Refresh`] hook that
//! pulls fresh values from somewhere else.

use std::sync::Arc;

use crate::error::{MetricsError, Result};
use crate::map::Map;
use crate::metric::Metric;

/// Collector every registry creates for unqualified registrations.
pub const DEFAULT_COLLECTOR: &str = "default";
/// Collector name reserved for process-derived metrics.
pub const PROCESS_COLLECTOR: &str = "process";

pub trait Collector: Send + Sync {
    fn name(&self) -> &str;

    /// Metrics owned by this collector, keyed by metric name.
    fn metrics(&self) -> &Map<Arc<Metric>>;

    /// Metrics to render for this scrape, in registration order.
    fn collect(&self) -> Result<Vec<Arc<Metric>>> {
        self.metrics().values()
    }

    /// Attach `metric`; fails if the name is taken in this collector.
    fn add_metric(&self, metric: Arc<Metric>) -> Result<()> {
        let name = metric.name().to_string();
        if !self.metrics().insert_new(&name, metric)? {
            tracing::warn!(collector = self.name(), metric = %name, "metric already registered");
            return Err(MetricsError::AlreadyRegistered(name));
        }
        Ok(())
    }

    fn metric(&self, name: &str) -> Result<Option<Arc<Metric>>> {
        self.metrics().get(name)
    }
}

#[derive(Debug)]
pub struct StaticCollector {
    name: String,
    metrics: Map<Arc<Metric>>,
}

impl StaticCollector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: Map::new(),
        }
    }
}

impl Collector for StaticCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn metrics(&self) -> &Map<Arc<Metric>> {
        &self.metrics
    }
}

/// Updates metric values right before they are rendered.
pub trait Refresh: Send + Sync {
    fn refresh(&self) -> Result<()>;
}

impl<F> Refresh for F
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn refresh(&self) -> Result<()> {
        self()
    }
}

pub struct RefreshingCollector {
    inner: StaticCollector,
    source: Box<dyn Refresh>,
}

impl RefreshingCollector {
    pub fn new(name: impl Into<String>, source: impl Refresh + 'static) -> Self {
        Self {
            inner: StaticCollector::new(name),
            source: Box::new(source),
        }
    }
}

impl std::fmt::Debug for RefreshingCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshingCollector")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl Collector for RefreshingCollector {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn metrics(&self) -> &Map<Arc<Metric>> {
        self.inner.metrics()
    }

    /// A failed refresh is logged and the previous values are served.
    fn collect(&self) -> Result<Vec<Arc<Metric>>> {
        if let Err(e) = self.source.refresh() {
            tracing::warn!(collector = self.name(), error = %e, "refresh failed; serving stale values");
        }
        self.inner.metrics().values()
    }
}
