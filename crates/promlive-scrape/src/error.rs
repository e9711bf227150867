//! Scrape and monitor error types.

use std::time::Duration;

use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

/// Why a scrape produced no body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("http handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(#[source] http::Error),

    #[error("request failed: {0}")]
    Send(#[source] hyper::Error),

    #[error("unexpected status: {0}")]
    Status(http::StatusCode),

    #[error("failed to read body: {0}")]
    Body(#[source] hyper::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors returned to callers of a [`crate::MonitorHandle`].
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Core(#[from] promlive_core::CoreError),

    #[error("monitor is not running")]
    Stopped,
}
