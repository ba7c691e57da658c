//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use promkit_core::error::{MetricsError, Result};

pub use schema::{ExporterConfig, ExporterSection, HostSection, RegistrySection, ScrapeDuration};

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Config from the first CLI argument, or built-in defaults without one.
pub fn load_from_args(mut args: impl Iterator<Item = String>) -> Result<ExporterConfig> {
    match args.nth(1) {
        Some(path) => load_from_file(&path),
        None => {
            let cfg = ExporterConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
