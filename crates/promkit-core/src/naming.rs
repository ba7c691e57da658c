//! Metric and label naming grammar.
//!
//! - metric name: `^[a-zA-Z_:][a-zA-Z0-9_:]*$`
//! - label name:  `^[a-zA-Z_][a-zA-Z0-9_]*$`

use crate::error::{MetricsError, Result};

/// Label keys reserved for histogram and summary series.
pub const RESERVED_LABELS: [&str; 2] = ["le", "quantile"];

pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn check_metric_name(name: &str) -> Result<()> {
    if is_valid_metric_name(name) {
        Ok(())
    } else {
        Err(MetricsError::InvalidMetricName(name.to_string()))
    }
}

/// Validate a user-supplied label key, including the reserved set.
pub fn check_label_key(key: &str) -> Result<()> {
    if RESERVED_LABELS.contains(&key) {
        tracing::warn!(label = key, "reserved label name");
        return Err(MetricsError::ReservedLabel(key.to_string()));
    }
    if !is_valid_label_name(key) {
        return Err(MetricsError::InvalidLabelName(key.to_string()));
    }
    Ok(())
}

/// A prefix must keep every prefixed name valid: empty, or a valid metric
/// name on its own.
pub fn check_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || is_valid_metric_name(prefix) {
        Ok(())
    } else {
        Err(MetricsError::InvalidMetricName(prefix.to_string()))
    }
}
