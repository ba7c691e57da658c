//! Top-level container of collectors and the render entry point.
//!
//! A [`Registry`] is an explicit handle: create one, register metrics and
//! collectors against it, call [`Registry::bridge`] from whatever serves
//! scrapes. An optional process-wide default is kept for callers that
//! prefer a global, with an explicit init/teardown lifecycle.

use std::ops::{BitOr, BitOrAssign};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use crate::collector::{Collector, StaticCollector, DEFAULT_COLLECTOR, PROCESS_COLLECTOR};
use crate::error::{poisoned, MetricsError, Result};
use crate::formatter::Formatter;
use crate::map::Map;
use crate::metric::{Gauge, Metric};
use crate::naming::check_prefix;

/// Name of the self-measuring scrape gauge.
pub const SCRAPE_DURATION_NAME: &str = "scrape_duration_seconds";
const SCRAPE_DURATION_HELP: &str = "Duration of a collector scrape";
const SCRAPE_DURATION_LABEL: &str = "collector";
/// `collector` label value of the aggregate scrape measurement.
pub const AGGREGATE_SCRAPE_LABEL: &str = "promkit";
/// Name given to the registry built by [`init_default`].
pub const DEFAULT_REGISTRY_NAME: &str = "default";

/// Registry-wide feature bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features(u32);

impl Features {
    pub const NONE: Features = Features(0);
    /// Process metrics are attached. Set by [`Registry::enable_process_metrics`].
    pub const PROCESS: Features = Features(1);
    /// One aggregate scrape-duration sample per render.
    pub const SCRAPE_TIME: Features = Features(1 << 1);
    /// One scrape-duration sample per collector; implies `SCRAPE_TIME`.
    pub const SCRAPE_TIME_ALL: Features = Features(1 << 2);
    /// Omit `# HELP` and `# TYPE` lines.
    pub const COMPACT: Features = Features(1 << 3);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

impl BitOrAssign for Features {
    fn bitor_assign(&mut self, rhs: Features) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    pub features: Features,
    /// Prepended to every rendered metric name.
    pub prefix: Option<String>,
}

pub struct Registry {
    name: String,
    collectors: Map<Arc<dyn Collector>>,
    features: AtomicU32,
    prefix: Option<String>,
    scrape_duration: Option<Gauge>,
    /// Guards collector registration and lookup only.
    lock: RwLock<()>,
    formatter: Mutex<Formatter>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("features", &self.features())
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_options(name, RegistryOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: RegistryOptions) -> Result<Self> {
        let mut features = options.features;
        if features.contains(Features::SCRAPE_TIME_ALL) {
            features |= Features::SCRAPE_TIME;
        }
        // Only enable_process_metrics may claim the process flag.
        features = Features(features.0 & !Features::PROCESS.0);

        let prefix = options.prefix.filter(|p| !p.is_empty());
        if let Some(p) = &prefix {
            check_prefix(p)?;
        }

        let scrape_duration = if features.contains(Features::SCRAPE_TIME) {
            Some(Gauge::new(
                SCRAPE_DURATION_NAME,
                SCRAPE_DURATION_HELP,
                &[SCRAPE_DURATION_LABEL],
            )?)
        } else {
            None
        };

        let collectors: Map<Arc<dyn Collector>> = Map::new();
        collectors.set(
            DEFAULT_COLLECTOR,
            Arc::new(StaticCollector::new(DEFAULT_COLLECTOR)),
        )?;

        let name = name.into();
        tracing::debug!(registry = %name, features = features.bits(), "registry created");
        Ok(Self {
            name,
            collectors,
            features: AtomicU32::new(features.0),
            prefix,
            scrape_duration,
            lock: RwLock::new(()),
            formatter: Mutex::new(Formatter::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> Features {
        Features(self.features.load(Ordering::Acquire))
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The self-measuring gauge, when scrape timing is enabled.
    pub fn scrape_duration(&self) -> Option<&Gauge> {
        self.scrape_duration.as_ref()
    }

    /// Add a collector. Names are unique, `process` is reserved for
    /// [`Registry::enable_process_metrics`] and `promkit` for the aggregate
    /// scrape-duration sample.
    pub fn register_collector(&self, collector: Arc<dyn Collector>) -> Result<()> {
        if collector.name() == PROCESS_COLLECTOR {
            tracing::warn!(registry = %self.name, "process collector must be enabled explicitly");
            return Err(MetricsError::AlreadyRegistered(PROCESS_COLLECTOR.to_string()));
        }
        if collector.name() == AGGREGATE_SCRAPE_LABEL {
            tracing::warn!(registry = %self.name, "collector name is reserved for scrape timing");
            return Err(MetricsError::AlreadyRegistered(AGGREGATE_SCRAPE_LABEL.to_string()));
        }
        self.insert_collector(collector)
    }

    fn insert_collector(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let _guard = self.lock.write().map_err(|_| poisoned("registry"))?;
        let name = collector.name().to_string();
        if !self.collectors.insert_new(&name, collector)? {
            tracing::warn!(registry = %self.name, collector = %name, "collector already registered");
            return Err(MetricsError::AlreadyRegistered(name));
        }
        Ok(())
    }

    pub fn collector(&self, name: &str) -> Result<Option<Arc<dyn Collector>>> {
        let _guard = self.lock.read().map_err(|_| poisoned("registry"))?;
        self.collectors.get(name)
    }

    pub fn default_collector(&self) -> Result<Arc<dyn Collector>> {
        self.collector(DEFAULT_COLLECTOR)?
            .ok_or_else(|| MetricsError::Corrupt("registry lost its default collector".into()))
    }

    /// Attach `collector` (which must be named `process`) and turn on the
    /// process feature.
    pub fn enable_process_metrics(&self, collector: Arc<dyn Collector>) -> Result<()> {
        if collector.name() != PROCESS_COLLECTOR {
            return Err(MetricsError::Config(format!(
                "process collector must be named {PROCESS_COLLECTOR:?}, got {:?}",
                collector.name()
            )));
        }
        self.insert_collector(collector)?;
        self.features.fetch_or(Features::PROCESS.0, Ordering::AcqRel);
        Ok(())
    }

    /// Attach `metric` to the default collector.
    pub fn register_metric(&self, metric: Arc<Metric>) -> Result<()> {
        self.default_collector()?.add_metric(metric)
    }

    /// Like [`Registry::register_metric`], but a failure terminates the
    /// process. Meant for startup code that cannot continue without the
    /// metric.
    pub fn must_register_metric(&self, metric: Arc<Metric>) {
        let name = metric.name().to_string();
        if let Err(e) = self.register_metric(metric) {
            tracing::error!(registry = %self.name, metric = %name, error = %e, "metric registration failed");
            std::process::exit(1);
        }
    }

    /// Render every collector's metrics into one exposition document.
    ///
    /// Reads sample values only; safe to call while producers keep updating.
    /// Metrics that fail to render are logged and left out.
    pub fn bridge(&self) -> Result<String> {
        let features = self.features();
        let compact = features.contains(Features::COMPACT);
        let timer = self
            .scrape_duration
            .as_ref()
            .filter(|_| features.contains(Features::SCRAPE_TIME));
        let per_collector = timer.filter(|_| features.contains(Features::SCRAPE_TIME_ALL));
        let started = Instant::now();

        let collectors = {
            let _guard = self.lock.read().map_err(|_| poisoned("registry"))?;
            self.collectors.entries()?
        };

        let mut formatter = self.formatter.lock().map_err(|_| poisoned("formatter"))?;
        formatter.clear();
        let failures = formatter.load_metrics(&collectors, per_collector, self.prefix(), compact);
        if failures > 0 {
            tracing::warn!(registry = %self.name, failures, "scrape rendered with failures");
        }

        if let Some(gauge) = timer {
            gauge.set(started.elapsed().as_secs_f64(), &[AGGREGATE_SCRAPE_LABEL])?;
            formatter.load_metric(&gauge.metric(), self.prefix(), compact)?;
        }
        Ok(formatter.dump())
    }
}

static DEFAULT_REGISTRY: RwLock<Option<Arc<Registry>>> = RwLock::new(None);

/// Create the process-wide default registry named `default`.
///
/// Fails with [`MetricsError::AlreadyInitialized`] while one is installed.
pub fn init_default(options: RegistryOptions) -> Result<Arc<Registry>> {
    let registry = Arc::new(Registry::with_options(DEFAULT_REGISTRY_NAME, options)?);
    install_default(Arc::clone(&registry))?;
    Ok(registry)
}

/// Install an existing registry as the process-wide default.
pub fn install_default(registry: Arc<Registry>) -> Result<()> {
    let mut slot = DEFAULT_REGISTRY
        .write()
        .map_err(|_| poisoned("default registry"))?;
    if slot.is_some() {
        tracing::error!(registry = registry.name(), "default registry already initialized");
        return Err(MetricsError::AlreadyInitialized);
    }
    *slot = Some(registry);
    Ok(())
}

pub fn default_registry() -> Option<Arc<Registry>> {
    DEFAULT_REGISTRY.read().ok().and_then(|slot| slot.clone())
}

/// Uninstall the default registry and hand it back. It is destroyed once
/// the last handle is dropped.
pub fn teardown_default() -> Option<Arc<Registry>> {
    DEFAULT_REGISTRY.write().ok().and_then(|mut slot| slot.take())
}
