//! Shared application state for the exporter.
//!
//! Owns the registry handle, the exporter's own metrics and the probe status
//! table. Construction returns `Result` so startup errors reach `main`
//! instead of panicking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use promkit_core::error::Result;
use promkit_core::Registry;

use crate::config::ExporterConfig;
use crate::host::{self, process};
use crate::obs::metrics::ExporterMetrics;
use crate::sampler::{Sampler, StatusTable};

const REGISTRY_NAME: &str = "promkit-exporter";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    registry: Arc<Registry>,
    metrics: ExporterMetrics,
    status: Arc<StatusTable>,
    draining: AtomicBool,
}

impl AppState {
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let registry = Arc::new(Registry::with_options(REGISTRY_NAME, cfg.registry.options())?);
        Self::with_registry(cfg, registry)
    }

    /// Build around an existing registry (shared with application code).
    pub fn with_registry(cfg: ExporterConfig, registry: Arc<Registry>) -> Result<Self> {
        if cfg.registry.process_metrics {
            registry.enable_process_metrics(process::process_collector(&cfg.host.proc_root)?)?;
        }
        let metrics = ExporterMetrics::new()?;
        metrics.register(&registry)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                metrics,
                status: Arc::new(StatusTable::new()),
                draining: AtomicBool::new(false),
            }),
        })
    }

    /// Register the configured host probes and wrap them in a sampler.
    pub fn build_sampler(&self) -> Result<Sampler> {
        let probes = host::build_probes(&self.inner.cfg.host, &self.inner.registry)?;
        Ok(Sampler::new(
            probes,
            Arc::clone(&self.inner.status),
            self.inner.metrics.probe_errors.clone(),
            Duration::from_secs(self.inner.cfg.exporter.update_interval_secs),
        ))
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.inner.metrics
    }

    pub fn status(&self) -> &StatusTable {
        &self.inner.status
    }

    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
