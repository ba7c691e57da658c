//! Whole-machine CPU utilisation from the aggregate `cpu` line of
//! `/proc/stat`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use promkit_core::error::{MetricsError, Result};
use promkit_core::{Collector, Gauge};

use super::{parse_u64, read_source, register_all, Probe};

/// Busy and idle jiffies since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

/// Parse `cpu  user nice system idle iowait irq softirq steal ...`.
pub fn parse_cpu_times(stat: &str) -> Result<CpuTimes> {
    let line = stat
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| MetricsError::Unavailable("no aggregate cpu line".into()))?;
    let mut fields = line.split_whitespace().skip(1);
    let mut next = |what| parse_u64(fields.next(), what);
    let user = next("cpu user")?;
    let nice = next("cpu nice")?;
    let system = next("cpu system")?;
    let idle = next("cpu idle")?;
    let iowait = next("cpu iowait")?;
    let irq = next("cpu irq")?;
    let softirq = next("cpu softirq")?;
    let steal = next("cpu steal")?;

    let idle_total = idle + iowait;
    let busy = user + nice + system + irq + softirq + steal;
    Ok(CpuTimes {
        idle: idle_total,
        total: idle_total + busy,
    })
}

/// Busy share of the interval between two readings, in percent. `None`
/// when no time has passed.
pub fn usage_percent(prev: CpuTimes, now: CpuTimes) -> Option<f64> {
    let total = now.total.checked_sub(prev.total)?;
    let idle = now.idle.checked_sub(prev.idle)?;
    if total == 0 {
        return None;
    }
    Some(total.saturating_sub(idle) as f64 / total as f64 * 100.0)
}

pub struct CpuProbe {
    path: PathBuf,
    usage: Gauge,
    /// Previous reading; zero before the first sample, so the first value
    /// is the average since boot.
    prev: Mutex<CpuTimes>,
}

impl CpuProbe {
    pub fn new(proc_root: &Path) -> Result<Self> {
        Ok(Self {
            path: proc_root.join("stat"),
            usage: Gauge::new("cpu_usage_percentage", "CPU utilisation in percent", &[])?,
            prev: Mutex::new(CpuTimes::default()),
        })
    }

    pub fn register(&self, collector: &dyn Collector) -> Result<()> {
        register_all(collector, &[self.usage.metric()])
    }

    pub fn usage(&self) -> &Gauge {
        &self.usage
    }
}

#[async_trait]
impl Probe for CpuProbe {
    fn name(&self) -> &'static str {
        "cpu"
    }

    async fn sample(&self) -> Result<()> {
        let now = parse_cpu_times(&read_source(&self.path).await?)?;
        let usage = {
            let mut prev = self
                .prev
                .lock()
                .map_err(|_| MetricsError::LockPoisoned("cpu probe"))?;
            let usage = usage_percent(*prev, now);
            *prev = now;
            usage
        };
        match usage {
            Some(pct) => self.usage.set(pct, &[]),
            None => Err(MetricsError::Unavailable("cpu counters did not advance".into())),
        }
    }
}
