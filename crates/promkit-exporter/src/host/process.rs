//! Metrics about the exporter process itself, read from `/proc/self` each
//! time the registry is scraped.
//!
//! Gauges whose source cannot be read are set to NaN; counters keep their
//! last value.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use promkit_core::collector::PROCESS_COLLECTOR;
use promkit_core::error::{MetricsError, Result};
use promkit_core::{Collector, Counter, Gauge, Metric, RefreshingCollector};

use super::parse_u64;

/// `sysconf(_SC_CLK_TCK)` on every mainstream Linux target.
pub const CLOCK_TICKS_PER_SEC: f64 = 100.0;
pub const PAGE_SIZE: f64 = 4096.0;

/// Selected fields of `/proc/<pid>/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStat {
    pub minflt: u64,
    pub majflt: u64,
    pub utime: u64,
    pub stime: u64,
    pub num_threads: u64,
    pub starttime: u64,
    pub vsize: u64,
    pub rss: u64,
}

/// Fields are numbered from 1 as in proc(5). The command name (field 2)
/// may contain spaces and parentheses, so parsing starts after the last `)`.
pub fn parse_process_stat(stat: &str) -> Result<ProcessStat> {
    let (_, rest) = stat
        .rsplit_once(')')
        .ok_or_else(|| MetricsError::Unavailable("stat has no command field".into()))?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let field = |n: usize, what: &str| parse_u64(fields.get(n - 3).copied(), what);
    Ok(ProcessStat {
        minflt: field(10, "minflt")?,
        majflt: field(12, "majflt")?,
        utime: field(14, "utime")?,
        stime: field(15, "stime")?,
        num_threads: field(20, "num_threads")?,
        starttime: field(22, "starttime")?,
        vsize: field(23, "vsize")?,
        rss: field(24, "rss")?,
    })
}

/// Soft limit of `Max open files`; `unlimited` maps to +Inf.
pub fn parse_max_fds(limits: &str) -> Result<f64> {
    let rest = limits
        .lines()
        .find_map(|l| l.strip_prefix("Max open files"))
        .ok_or_else(|| MetricsError::Unavailable("no open files limit".into()))?;
    match rest.split_whitespace().next() {
        Some("unlimited") => Ok(f64::INFINITY),
        soft => parse_u64(soft, "open files limit").map(|v| v as f64),
    }
}

/// Seconds since boot, first field of `/proc/uptime`.
pub fn parse_uptime(uptime: &str) -> Result<f64> {
    uptime
        .split_whitespace()
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| MetricsError::Unavailable("malformed uptime".into()))
}

struct ProcessMetrics {
    open_fds: Gauge,
    max_fds: Gauge,
    minflt: Counter,
    majflt: Counter,
    utime: Counter,
    stime: Counter,
    cpu_total: Counter,
    threads: Gauge,
    start_time: Gauge,
    vsize: Gauge,
    rss: Gauge,
}

impl ProcessMetrics {
    fn new() -> Result<Self> {
        Ok(Self {
            open_fds: Gauge::new("process_open_fds", "Number of open file descriptors", &[])?,
            max_fds: Gauge::new("process_max_fds", "Maximum number of open file descriptors", &[])?,
            minflt: Counter::new(
                "process_minor_pagefaults",
                "Minor faults which did not require loading a page from disk",
                &[],
            )?,
            majflt: Counter::new(
                "process_major_pagefaults",
                "Major faults which required loading a page from disk",
                &[],
            )?,
            utime: Counter::new("process_user_cpu_seconds", "CPU time spent in user mode", &[])?,
            stime: Counter::new("process_system_cpu_seconds", "CPU time spent in kernel mode", &[])?,
            cpu_total: Counter::new("process_total_cpu_seconds", "Total user and system CPU time", &[])?,
            threads: Gauge::new("process_threads_total", "Number of threads", &[])?,
            start_time: Gauge::new(
                "process_start_time_seconds",
                "Start time since the Unix epoch in seconds",
                &[],
            )?,
            vsize: Gauge::new("process_virtual_memory_bytes", "Virtual memory size in bytes", &[])?,
            rss: Gauge::new("process_resident_memory_bytes", "Resident set size in bytes", &[])?,
        })
    }

    fn all(&self) -> Vec<Arc<Metric>> {
        vec![
            self.open_fds.metric(),
            self.max_fds.metric(),
            self.minflt.metric(),
            self.majflt.metric(),
            self.utime.metric(),
            self.stime.metric(),
            self.cpu_total.metric(),
            self.threads.metric(),
            self.start_time.metric(),
            self.vsize.metric(),
            self.rss.metric(),
        ]
    }

    fn refresh(&self, proc_root: &Path, pid_dir: &Path) -> Result<()> {
        let mut failed = Vec::new();

        match std::fs::read_dir(pid_dir.join("fd")) {
            Ok(entries) => self.open_fds.set(entries.count() as f64, &[])?,
            Err(e) => {
                self.open_fds.set(f64::NAN, &[])?;
                failed.push(format!("fd: {e}"));
            }
        }

        match read(&pid_dir.join("limits")).and_then(|s| parse_max_fds(&s)) {
            Ok(max) => self.max_fds.set(max, &[])?,
            Err(e) => {
                self.max_fds.set(f64::NAN, &[])?;
                failed.push(format!("limits: {e}"));
            }
        }

        match self.apply_stat(proc_root, pid_dir) {
            Ok(()) => {}
            Err(e) => {
                for g in [&self.threads, &self.start_time, &self.vsize, &self.rss] {
                    g.set(f64::NAN, &[])?;
                }
                failed.push(format!("stat: {e}"));
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(MetricsError::Unavailable(failed.join("; ")))
        }
    }

    fn apply_stat(&self, proc_root: &Path, pid_dir: &Path) -> Result<()> {
        let stat = parse_process_stat(&read(&pid_dir.join("stat"))?)?;
        let uptime = parse_uptime(&read(&proc_root.join("uptime"))?)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| MetricsError::Unavailable(format!("clock: {e}")))?
            .as_secs_f64();

        let utime = stat.utime as f64 / CLOCK_TICKS_PER_SEC;
        let stime = stat.stime as f64 / CLOCK_TICKS_PER_SEC;
        self.minflt.set(stat.minflt as f64, &[])?;
        self.majflt.set(stat.majflt as f64, &[])?;
        self.utime.set(utime, &[])?;
        self.stime.set(stime, &[])?;
        self.cpu_total.set(utime + stime, &[])?;
        self.threads.set(stat.num_threads as f64, &[])?;
        self.start_time
            .set(now - uptime + stat.starttime as f64 / CLOCK_TICKS_PER_SEC, &[])?;
        self.vsize.set(stat.vsize as f64, &[])?;
        self.rss.set(stat.rss as f64 * PAGE_SIZE, &[])
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| MetricsError::Unavailable(format!("{}: {e}", path.display())))
}

/// The `process` collector for the current process. Pass it to
/// `Registry::enable_process_metrics`.
pub fn process_collector(proc_root: &Path) -> Result<Arc<RefreshingCollector>> {
    let metrics = Arc::new(ProcessMetrics::new()?);
    let root: PathBuf = proc_root.to_path_buf();
    let pid_dir = root.join("self");

    let source = Arc::clone(&metrics);
    let collector = RefreshingCollector::new(PROCESS_COLLECTOR, move || {
        source.refresh(&root, &pid_dir)
    });
    for metric in metrics.all() {
        collector.add_metric(metric)?;
    }
    Ok(Arc::new(collector))
}
