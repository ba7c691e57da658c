//! Per-interface traffic counters from `/proc/net/dev`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use promkit_core::error::{MetricsError, Result};
use promkit_core::{Collector, Gauge};

use super::{parse_u64, read_source, register_all, Probe};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceStats {
    pub interface: String,
    pub rx_bytes: u64,
    pub rx_errors: u64,
    pub rx_drops: u64,
    pub tx_bytes: u64,
    pub tx_errors: u64,
    pub tx_drops: u64,
}

/// Every interface whose name starts with `prefix`, in file order. Header
/// lines carry no `:` and are skipped.
pub fn parse_net_dev(net_dev: &str, prefix: &str) -> Result<Vec<InterfaceStats>> {
    let mut out = Vec::new();
    for line in net_dev.lines() {
        let Some((name, counters)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if !name.starts_with(prefix) {
            continue;
        }
        let f: Vec<&str> = counters.split_whitespace().collect();
        let at = |i: usize, what: &str| parse_u64(f.get(i).copied(), what);
        out.push(InterfaceStats {
            interface: name.to_string(),
            rx_bytes: at(0, "rx bytes")?,
            rx_errors: at(2, "rx errors")?,
            rx_drops: at(3, "rx drops")?,
            tx_bytes: at(8, "tx bytes")?,
            tx_errors: at(10, "tx errors")?,
            tx_drops: at(11, "tx drops")?,
        });
    }
    if out.is_empty() {
        return Err(MetricsError::Unavailable(format!(
            "no interface matching {prefix:?} in net/dev"
        )));
    }
    Ok(out)
}

pub struct NetworkProbe {
    path: PathBuf,
    prefix: String,
    rx_bytes: Gauge,
    rx_errors: Gauge,
    rx_drops: Gauge,
    tx_bytes: Gauge,
    tx_errors: Gauge,
    tx_drops: Gauge,
}

impl NetworkProbe {
    pub fn new(proc_root: &Path, prefix: &str) -> Result<Self> {
        let gauge = |name, help| Gauge::new(name, help, &["interface"]);
        Ok(Self {
            path: proc_root.join("net").join("dev"),
            prefix: prefix.to_string(),
            rx_bytes: gauge("network_receive_bytes", "Bytes received")?,
            rx_errors: gauge("network_receive_errors", "Receive errors")?,
            rx_drops: gauge("network_receive_drops", "Received packets dropped")?,
            tx_bytes: gauge("network_transmit_bytes", "Bytes transmitted")?,
            tx_errors: gauge("network_transmit_errors", "Transmit errors")?,
            tx_drops: gauge("network_transmit_drops", "Transmitted packets dropped")?,
        })
    }

    pub fn register(&self, collector: &dyn Collector) -> Result<()> {
        register_all(
            collector,
            &[
                self.rx_bytes.metric(),
                self.rx_errors.metric(),
                self.rx_drops.metric(),
                self.tx_bytes.metric(),
                self.tx_errors.metric(),
                self.tx_drops.metric(),
            ],
        )
    }

    pub fn apply(&self, stats: &InterfaceStats) -> Result<()> {
        let labels = [stats.interface.as_str()];
        self.rx_bytes.set(stats.rx_bytes as f64, &labels)?;
        self.rx_errors.set(stats.rx_errors as f64, &labels)?;
        self.rx_drops.set(stats.rx_drops as f64, &labels)?;
        self.tx_bytes.set(stats.tx_bytes as f64, &labels)?;
        self.tx_errors.set(stats.tx_errors as f64, &labels)?;
        self.tx_drops.set(stats.tx_drops as f64, &labels)
    }
}

#[async_trait]
impl Probe for NetworkProbe {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn sample(&self) -> Result<()> {
        let text = read_source(&self.path).await?;
        for stats in parse_net_dev(&text, &self.prefix)? {
            self.apply(&stats)?;
        }
        Ok(())
    }
}
