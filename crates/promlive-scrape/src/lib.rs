//! promlive-scrape — scraping a metrics endpoint on a timer.
//!
//! Fetches the exposition body over HTTP, feeds it through the
//! `promlive-core` pipeline, and publishes the resulting projection.
//!
//! # Architecture
//!
//! ```text
//! Monitor (one background task)
//!   ├── RefreshScheduler      fast first tick, no overlap, generations
//!   ├── Fetcher → fetch_text() → body
//!   ├── Session::apply()      parse, aggregate, select, append
//!   └── watch::Sender<MonitorStatus>
//!
//! MonitorHandle (cloneable)
//!   ├── configure / select / clear   over mpsc, acknowledged via oneshot
//!   └── status / subscribe           latest MonitorStatus
//! ```
//!
//! A failed scrape is logged and applied as an empty snapshot: no point is
//! appended and the chart keeps its previous state.

pub mod error;
pub mod fetch;
pub mod monitor;
pub mod scheduler;

pub use error::{FetchError, FetchResult, MonitorError, MonitorResult};
pub use fetch::{FetchFuture, Fetcher, fetch_text, http_fetcher};
pub use monitor::{Monitor, MonitorHandle, MonitorStatus};
pub use scheduler::{RefreshScheduler, SchedulerState, TickTicket};
