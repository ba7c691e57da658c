//! Throughput of one block device from `/proc/diskstats`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use promkit_core::error::{MetricsError, Result};
use promkit_core::{Collector, Gauge};

use super::{parse_u64, read_source, register_all, Probe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskStats {
    pub sectors_read: u64,
    pub read_ms: u64,
    pub sectors_written: u64,
    pub write_ms: u64,
}

impl DiskStats {
    pub fn read_rate(&self) -> f64 {
        rate(self.sectors_read, self.read_ms)
    }

    pub fn write_rate(&self) -> f64 {
        rate(self.sectors_written, self.write_ms)
    }
}

/// Sectors per millisecond of busy time; zero for an idle device.
fn rate(sectors: u64, ms: u64) -> f64 {
    if ms == 0 {
        0.0
    } else {
        sectors as f64 / ms as f64
    }
}

/// Find `device` and pick fields 6, 7, 10 and 11 (1-based) of its line.
pub fn parse_diskstats(diskstats: &str, device: &str) -> Result<DiskStats> {
    for line in diskstats.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.get(2) != Some(&device) {
            continue;
        }
        return Ok(DiskStats {
            sectors_read: parse_u64(fields.get(5).copied(), "sectors read")?,
            read_ms: parse_u64(fields.get(6).copied(), "read time")?,
            sectors_written: parse_u64(fields.get(9).copied(), "sectors written")?,
            write_ms: parse_u64(fields.get(10).copied(), "write time")?,
        });
    }
    Err(MetricsError::Unavailable(format!("device {device} not in diskstats")))
}

pub struct DiskProbe {
    path: PathBuf,
    device: String,
    read: Gauge,
    write: Gauge,
}

impl DiskProbe {
    pub fn new(proc_root: &Path, device: &str) -> Result<Self> {
        Ok(Self {
            path: proc_root.join("diskstats"),
            device: device.to_string(),
            read: Gauge::new(
                "disk_read_sectors_per_ms",
                "Sectors read per millisecond spent reading",
                &["device"],
            )?,
            write: Gauge::new(
                "disk_write_sectors_per_ms",
                "Sectors written per millisecond spent writing",
                &["device"],
            )?,
        })
    }

    pub fn register(&self, collector: &dyn Collector) -> Result<()> {
        register_all(collector, &[self.read.metric(), self.write.metric()])
    }
}

#[async_trait]
impl Probe for DiskProbe {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn sample(&self) -> Result<()> {
        let stats = parse_diskstats(&read_source(&self.path).await?, &self.device)?;
        self.read.set(stats.read_rate(), &[self.device.as_str()])?;
        self.write.set(stats.write_rate(), &[self.device.as_str()])
    }
}
