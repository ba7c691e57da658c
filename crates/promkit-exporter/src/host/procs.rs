//! Process counts: entries under `/proc` and `procs_running` from
//! `/proc/stat`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use promkit_core::error::{MetricsError, Result};
use promkit_core::{Collector, Gauge};

use super::{parse_u64, read_source, register_all, Probe};

pub fn parse_procs_running(stat: &str) -> Result<u64> {
    let line = stat
        .lines()
        .find(|l| l.starts_with("procs_running "))
        .ok_or_else(|| MetricsError::Unavailable("no procs_running line".into()))?;
    parse_u64(line.split_whitespace().nth(1), "procs_running")
}

/// Process directories are the all-digit names.
pub fn is_pid_dir(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

pub struct ProcsProbe {
    root: PathBuf,
    total: Gauge,
    running: Gauge,
}

impl ProcsProbe {
    pub fn new(proc_root: &Path) -> Result<Self> {
        Ok(Self {
            root: proc_root.to_path_buf(),
            total: Gauge::new("processes_total", "Processes on the host", &[])?,
            running: Gauge::new("processes_running", "Processes in runnable state", &[])?,
        })
    }

    pub fn register(&self, collector: &dyn Collector) -> Result<()> {
        register_all(collector, &[self.total.metric(), self.running.metric()])
    }

    async fn count_pids(&self) -> Result<u64> {
        let unavailable = |e: std::io::Error| {
            MetricsError::Unavailable(format!("{}: {e}", self.root.display()))
        };
        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(unavailable)?;
        let mut count = 0;
        while let Some(entry) = dir.next_entry().await.map_err(unavailable)? {
            if entry.file_name().to_str().is_some_and(is_pid_dir) {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl Probe for ProcsProbe {
    fn name(&self) -> &'static str {
        "procs"
    }

    async fn sample(&self) -> Result<()> {
        let total = self.count_pids().await?;
        let running = parse_procs_running(&read_source(&self.root.join("stat")).await?)?;
        self.total.set(total as f64, &[])?;
        self.running.set(running as f64, &[])
    }
}
