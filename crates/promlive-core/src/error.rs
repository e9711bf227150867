//! Core error types.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by configuration loading and selection changes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("metric not in latest snapshot: {0}")]
    UnknownMetric(String),

    #[error("unknown time range: {0} (expected 1m, 5m, 10m, 15m or all)")]
    InvalidRange(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
