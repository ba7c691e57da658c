//! Memory totals from `/proc/meminfo`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use promkit_core::error::{MetricsError, Result};
use promkit_core::{Collector, Gauge};

use super::{parse_u64, read_source, register_all, Probe};

/// Values in kB, as the kernel reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemInfo {
    pub total_kb: u64,
    pub available_kb: u64,
}

impl MemInfo {
    pub fn used_kb(&self) -> u64 {
        self.total_kb.saturating_sub(self.available_kb)
    }

    pub fn usage_percent(&self) -> f64 {
        self.used_kb() as f64 / self.total_kb as f64 * 100.0
    }
}

pub fn parse_meminfo(meminfo: &str) -> Result<MemInfo> {
    let mut total = None;
    let mut available = None;
    for line in meminfo.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        match key {
            "MemTotal" => total = Some(parse_u64(rest.split_whitespace().next(), "MemTotal")?),
            "MemAvailable" => {
                available = Some(parse_u64(rest.split_whitespace().next(), "MemAvailable")?)
            }
            _ => {}
        }
        if total.is_some() && available.is_some() {
            break;
        }
    }
    match (total, available) {
        (Some(total_kb), Some(available_kb)) if total_kb > 0 => Ok(MemInfo {
            total_kb,
            available_kb,
        }),
        _ => Err(MetricsError::Unavailable(
            "meminfo lacks MemTotal or MemAvailable".into(),
        )),
    }
}

pub struct MemoryProbe {
    path: PathBuf,
    total: Gauge,
    used: Gauge,
    available: Gauge,
    usage: Gauge,
}

impl MemoryProbe {
    pub fn new(proc_root: &Path) -> Result<Self> {
        Ok(Self {
            path: proc_root.join("meminfo"),
            total: Gauge::new("memory_total_kb", "Total memory in kB", &[])?,
            used: Gauge::new("memory_used_kb", "Memory in use in kB", &[])?,
            available: Gauge::new("memory_available_kb", "Available memory in kB", &[])?,
            usage: Gauge::new("memory_usage_percentage", "Memory in use in percent", &[])?,
        })
    }

    pub fn register(&self, collector: &dyn Collector) -> Result<()> {
        register_all(
            collector,
            &[
                self.total.metric(),
                self.used.metric(),
                self.available.metric(),
                self.usage.metric(),
            ],
        )
    }

    pub fn apply(&self, info: MemInfo) -> Result<()> {
        self.total.set(info.total_kb as f64, &[])?;
        self.used.set(info.used_kb() as f64, &[])?;
        self.available.set(info.available_kb as f64, &[])?;
        self.usage.set(info.usage_percent(), &[])
    }
}

#[async_trait]
impl Probe for MemoryProbe {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn sample(&self) -> Result<()> {
        let info = parse_meminfo(&read_source(&self.path).await?)?;
        self.apply(info)
    }
}
