//! Host probes.
//!
//! Each probe reads one procfs source, parses it with a pure function and
//! stores the result in gauges owned by the `host` collector. Probes run on
//! the sampler's schedule, not at scrape time.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod procs;
pub mod process;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use promkit_core::error::{MetricsError, Result};
use promkit_core::{Collector, Registry, StaticCollector};

use crate::config::HostSection;

/// Collector holding every host gauge.
pub const HOST_COLLECTOR: &str = "host";

#[async_trait]
pub trait Probe: Send + Sync {
    /// Stable name used in status reports and the probe error counter.
    fn name(&self) -> &'static str;

    /// Read the source once and update the gauges.
    async fn sample(&self) -> Result<()>;
}

pub(crate) async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MetricsError::Unavailable(format!("{}: {e}", path.display())))
}

pub(crate) fn parse_u64(field: Option<&str>, what: &str) -> Result<u64> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| MetricsError::Unavailable(format!("malformed {what}")))
}

/// Build the enabled probes and register their gauges under the `host`
/// collector of `registry`.
pub fn build_probes(cfg: &HostSection, registry: &Registry) -> Result<Vec<Arc<dyn Probe>>> {
    let collector = Arc::new(StaticCollector::new(HOST_COLLECTOR));
    let root = cfg.proc_root.as_path();
    let mut probes: Vec<Arc<dyn Probe>> = Vec::new();

    if cfg.cpu {
        let p = cpu::CpuProbe::new(root)?;
        p.register(&*collector)?;
        probes.push(Arc::new(p));
    }
    if cfg.memory {
        let p = memory::MemoryProbe::new(root)?;
        p.register(&*collector)?;
        probes.push(Arc::new(p));
    }
    if cfg.disk {
        let p = disk::DiskProbe::new(root, &cfg.disk_device)?;
        p.register(&*collector)?;
        probes.push(Arc::new(p));
    }
    if cfg.network {
        let p = network::NetworkProbe::new(root, &cfg.net_interface_prefix)?;
        p.register(&*collector)?;
        probes.push(Arc::new(p));
    }
    if cfg.procs {
        let p = procs::ProcsProbe::new(root)?;
        p.register(&*collector)?;
        probes.push(Arc::new(p));
    }

    registry.register_collector(collector)?;
    tracing::info!(probes = probes.len(), "host probes ready");
    Ok(probes)
}

/// Attach every handle's metric to `collector`.
pub(crate) fn register_all(collector: &dyn Collector, metrics: &[Arc<promkit_core::Metric>]) -> Result<()> {
    for m in metrics {
        collector.add_metric(Arc::clone(m))?;
    }
    Ok(())
}
