//! Shared error type across promkit crates.

use thiserror::Error;

/// Stable error codes (one per failure class).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric or label name violates the naming grammar.
    InvalidName,
    /// Label key `le` or `quantile` used by a caller.
    ReservedLabel,
    /// Name already taken in the target container.
    Duplicate,
    /// Bucket bounds empty, unordered, or built from bad parameters.
    InvalidBuckets,
    /// Value or label arity rejected for this metric.
    InvalidValue,
    /// Operation not permitted for the metric type.
    WrongType,
    /// A lock could not be acquired.
    Lock,
    /// Internal bookkeeping lost a sample that must exist.
    Corrupt,
    /// Process-wide default registry lifecycle misuse.
    Lifecycle,
    /// An external value source could not be read or parsed.
    Unavailable,
    /// Configuration or startup failure outside the core.
    Config,
}

impl ErrorCode {
    /// String representation used in logs and HTTP responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::ReservedLabel => "RESERVED_LABEL",
            ErrorCode::Duplicate => "DUPLICATE",
            ErrorCode::InvalidBuckets => "INVALID_BUCKETS",
            ErrorCode::InvalidValue => "INVALID_VALUE",
            ErrorCode::WrongType => "WRONG_TYPE",
            ErrorCode::Lock => "LOCK",
            ErrorCode::Corrupt => "CORRUPT",
            ErrorCode::Lifecycle => "LIFECYCLE",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::Config => "CONFIG",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid metric name: {0:?}")]
    InvalidMetricName(String),
    #[error("invalid label name: {0:?}")]
    InvalidLabelName(String),
    #[error("reserved label name: {0}")]
    ReservedLabel(String),
    #[error("already registered: {0}")]
    AlreadyRegistered(String),
    #[error("invalid buckets: {0}")]
    InvalidBuckets(String),
    #[error("label values: expected {expected}, got {got}")]
    LabelArity { expected: usize, got: usize },
    #[error("invalid value {value} for {l_value}")]
    InvalidValue { l_value: String, value: f64 },
    #[error("{op} not permitted on {kind} {l_value}")]
    WrongType {
        op: &'static str,
        kind: &'static str,
        l_value: String,
    },
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
    #[error("corrupt state: {0}")]
    Corrupt(String),
    #[error("default registry already initialized")]
    AlreadyInitialized,
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("config: {0}")]
    Config(String),
}

impl MetricsError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::InvalidMetricName(_) | MetricsError::InvalidLabelName(_) => {
                ErrorCode::InvalidName
            }
            MetricsError::ReservedLabel(_) => ErrorCode::ReservedLabel,
            MetricsError::AlreadyRegistered(_) => ErrorCode::Duplicate,
            MetricsError::InvalidBuckets(_) => ErrorCode::InvalidBuckets,
            MetricsError::LabelArity { .. } | MetricsError::InvalidValue { .. } => {
                ErrorCode::InvalidValue
            }
            MetricsError::WrongType { .. } => ErrorCode::WrongType,
            MetricsError::LockPoisoned(_) => ErrorCode::Lock,
            MetricsError::Corrupt(_) => ErrorCode::Corrupt,
            MetricsError::AlreadyInitialized => ErrorCode::Lifecycle,
            MetricsError::Unavailable(_) => ErrorCode::Unavailable,
            MetricsError::Config(_) => ErrorCode::Config,
        }
    }
}

/// Lock acquisition failed: warn and hand back the error for the caller.
pub(crate) fn poisoned(what: &'static str) -> MetricsError {
    tracing::warn!(lock = what, "lock acquisition failed (poisoned)");
    MetricsError::LockPoisoned(what)
}
