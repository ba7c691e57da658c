//! Periodic probe runner.
//!
//! Every tick runs each enabled probe once, records the outcome in the
//! shared status table and bumps the probe error counter on failure. The
//! loop ends when the shutdown channel flips.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;

use promkit_core::Counter;

use crate::host::Probe;

/// Outcome of the most recent runs of one probe.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProbeStatus {
    pub ok: bool,
    pub last_success_unix: Option<u64>,
    pub last_error: Option<String>,
    pub failures: u64,
}

pub type StatusTable = DashMap<&'static str, ProbeStatus>;

pub struct Sampler {
    probes: Vec<Arc<dyn Probe>>,
    status: Arc<StatusTable>,
    errors: Counter,
    interval: Duration,
}

impl Sampler {
    pub fn new(
        probes: Vec<Arc<dyn Probe>>,
        status: Arc<StatusTable>,
        errors: Counter,
        interval: Duration,
    ) -> Self {
        for p in &probes {
            status.entry(p.name()).or_default();
        }
        Self {
            probes,
            status,
            errors,
            interval,
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Run every probe once, in order.
    pub async fn run_once(&self) {
        for probe in &self.probes {
            let name = probe.name();
            let outcome = probe.sample().await;
            let mut status = self.status.entry(name).or_default();
            match outcome {
                Ok(()) => {
                    status.ok = true;
                    status.last_success_unix = unix_now();
                    status.last_error = None;
                }
                Err(e) => {
                    tracing::warn!(probe = name, error = %e, "probe failed");
                    status.ok = false;
                    status.last_error = Some(e.to_string());
                    status.failures += 1;
                    drop(status);
                    if let Err(e) = self.errors.inc(&[name]) {
                        tracing::warn!(probe = name, error = %e, "probe error not counted");
                    }
                }
            }
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(probes = self.probes.len(), interval = ?self.interval, "sampler started");
        loop {
            tokio::select! {
                _ = tick.tick() => self.run_once().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("sampler stopped");
    }
}

fn unix_now() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}
