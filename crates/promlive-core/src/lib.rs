//! promlive-core — the scrape-to-chart pipeline without any I/O.
//!
//! Turns a Prometheus text exposition body into a [`MetricsSnapshot`],
//! fills parent series from their labelled children, picks a metric to
//! follow, and keeps a bounded rolling window of points for it.
//!
//! # Architecture
//!
//! ```text
//! parse_exposition() → MetricsSnapshot
//!   └── aggregate_series()     parent = Σ <parent>{…}
//!
//! Session
//!   ├── select_default()       first run only
//!   ├── TimeSeriesBuffer       monotonic, block eviction at 20·B
//!   ├── MinMaxTracker          extrema since last reset
//!   └── apply() → Projection   handed to the chart collaborator
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extrema;
pub mod parser;
pub mod projection;
pub mod record;
pub mod selection;
pub mod series;
pub mod session;

pub use aggregate::aggregate_series;
pub use config::{PromliveConfig, ScanConfig, ScanConfigPatch, ServerConfig};
pub use error::{CoreError, CoreResult};
pub use extrema::MinMaxTracker;
pub use parser::{parse_exposition, scrape_snapshot};
pub use projection::{Projection, TimeRange};
pub use record::{MetricRecord, MetricsSnapshot};
pub use selection::select_default;
pub use series::{TimeSeriesBuffer, TimeSeriesPoint};
pub use session::Session;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
