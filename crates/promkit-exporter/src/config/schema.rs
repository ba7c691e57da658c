use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use promkit_core::error::{MetricsError, Result};
use promkit_core::naming::check_prefix;
use promkit_core::{Features, RegistryOptions};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub host: HostSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            registry: RegistrySection::default(),
            host: HostSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.exporter.validate()?;
        self.registry.validate()?;
        self.host.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            update_interval_secs: default_update_interval_secs(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1..=3600).contains(&self.update_interval_secs) {
            return Err(MetricsError::Config(
                "exporter.update_interval_secs must be between 1 and 3600".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            MetricsError::Config(format!(
                "exporter.listen must be a socket address, got {:?}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_update_interval_secs() -> u64 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeDuration {
    #[default]
    Off,
    Aggregate,
    PerCollector,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub process_metrics: bool,

    #[serde(default)]
    pub scrape_duration: ScrapeDuration,

    #[serde(default)]
    pub compact: bool,
}

impl RegistrySection {
    pub fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.prefix {
            check_prefix(prefix)
                .map_err(|_| MetricsError::Config(format!("registry.prefix {prefix:?} is not a valid name prefix")))?;
        }
        Ok(())
    }

    /// Registry construction options. The process flag is applied separately
    /// once the process collector exists.
    pub fn options(&self) -> RegistryOptions {
        let mut features = Features::NONE;
        match self.scrape_duration {
            ScrapeDuration::Off => {}
            ScrapeDuration::Aggregate => features |= Features::SCRAPE_TIME,
            ScrapeDuration::PerCollector => features |= Features::SCRAPE_TIME_ALL,
        }
        if self.compact {
            features |= Features::COMPACT;
        }
        RegistryOptions {
            features,
            prefix: self.prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    #[serde(default = "enabled")]
    pub cpu: bool,
    #[serde(default = "enabled")]
    pub memory: bool,
    #[serde(default = "enabled")]
    pub disk: bool,
    #[serde(default = "enabled")]
    pub network: bool,
    #[serde(default = "enabled")]
    pub procs: bool,

    #[serde(default = "default_disk_device")]
    pub disk_device: String,

    #[serde(default = "default_net_interface_prefix")]
    pub net_interface_prefix: String,

    /// Mount point of procfs.
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            cpu: true,
            memory: true,
            disk: true,
            network: true,
            procs: true,
            disk_device: default_disk_device(),
            net_interface_prefix: default_net_interface_prefix(),
            proc_root: default_proc_root(),
        }
    }
}

impl HostSection {
    pub fn validate(&self) -> Result<()> {
        if self.disk && self.disk_device.trim().is_empty() {
            return Err(MetricsError::Config(
                "host.disk_device must not be empty while host.disk is on".into(),
            ));
        }
        Ok(())
    }
}

fn enabled() -> bool {
    true
}
fn default_disk_device() -> String {
    "sda".into()
}
fn default_net_interface_prefix() -> String {
    "en".into()
}
fn default_proc_root() -> PathBuf {
    PathBuf::from("/proc")
}
