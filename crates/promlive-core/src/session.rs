//! Per-source charting session.
//!
//! A `Session` owns everything that survives between scrapes: the rolling
//! buffer, the extrema tracker and the current selection. Each scrape's
//! snapshot is applied once and then dropped.

use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::extrema::MinMaxTracker;
use crate::projection::Projection;
use crate::record::{MetricRecord, MetricsSnapshot};
use crate::selection::select_default;
use crate::series::{DEFAULT_BASELINE, TimeSeriesBuffer};

#[derive(Debug, Clone)]
pub struct Session {
    buffer: TimeSeriesBuffer,
    extrema: MinMaxTracker,
    selected: Option<String>,
    /// Configured metric to follow once it shows up in a snapshot.
    preferred: Option<String>,
    /// Names from the latest non-empty snapshot, in first-seen order.
    known: Vec<String>,
    /// Latest record seen for the selected metric.
    last_record: Option<MetricRecord>,
    current_value: Option<f64>,
    updated_at: Option<u64>,
}

impl Session {
    /// A session with a zero-filled buffer ending at `now`.
    pub fn new(now: u64) -> Self {
        Self::with_baseline(DEFAULT_BASELINE, now)
    }

    pub fn with_baseline(baseline: usize, now: u64) -> Self {
        Self {
            buffer: TimeSeriesBuffer::zero_filled(baseline, now),
            extrema: MinMaxTracker::new(),
            selected: None,
            preferred: None,
            known: Vec::new(),
            last_record: None,
            current_value: None,
            updated_at: None,
        }
    }

    /// Follow `metric` as soon as a snapshot contains it.
    pub fn with_preferred(mut self, metric: Option<String>) -> Self {
        self.preferred = metric;
        self
    }

    /// Apply one scrape and return the resulting projection.
    ///
    /// An empty snapshot (failed scrape) leaves the buffer, extrema and
    /// known names untouched.
    pub fn apply(&mut self, snapshot: &MetricsSnapshot) -> Projection {
        self.current_value = None;

        if !snapshot.is_empty() {
            self.known = snapshot.names();
        }

        if self.selected.is_none() && !snapshot.is_empty() {
            let preferred = self
                .preferred
                .as_ref()
                .filter(|name| snapshot.contains(name))
                .cloned();
            self.selected = preferred.or_else(|| select_default(&self.known));
            debug!(metric = ?self.selected, "selected metric");
        }

        if let Some(name) = &self.selected {
            match snapshot.get(name) {
                Some(record) => {
                    self.current_value = record.value.filter(|v| v.is_finite());
                    self.last_record = Some(record.clone());
                    if let Some(value) = record.value.filter(|v| v.is_finite()) {
                        if self.buffer.append(snapshot.captured_at, value) {
                            self.extrema.observe(value);
                            self.updated_at = Some(snapshot.captured_at);
                        } else {
                            trace!(metric = %name, captured_at = snapshot.captured_at, "stale point rejected");
                        }
                    }
                }
                None => trace!(metric = %name, "selected metric absent from snapshot"),
            }
        }

        self.projection()
    }

    /// Switch to `metric`, which must appear in the latest snapshot.
    ///
    /// Resets the buffer and extrema on success.
    pub fn select(&mut self, metric: &str, now: u64) -> CoreResult<()> {
        if !self.known.iter().any(|n| n == metric) {
            return Err(CoreError::UnknownMetric(metric.to_string()));
        }
        self.selected = Some(metric.to_string());
        self.last_record = None;
        self.reset(now);
        Ok(())
    }

    /// Zero-fill the buffer and clear extrema, keeping the selection.
    pub fn reset(&mut self, now: u64) {
        self.buffer.reset(now);
        self.extrema.reset();
        self.current_value = None;
        self.updated_at = None;
    }

    /// Reset and forget the selection and known names, e.g. after the
    /// source URL changed.
    pub fn clear_selection(&mut self, now: u64) {
        self.selected = None;
        self.last_record = None;
        self.known.clear();
        self.reset(now);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn metric_names(&self) -> &[String] {
        &self.known
    }

    pub fn buffer(&self) -> &TimeSeriesBuffer {
        &self.buffer
    }

    pub fn extrema(&self) -> &MinMaxTracker {
        &self.extrema
    }

    pub fn projection(&self) -> Projection {
        let record = self.last_record.as_ref();
        Projection {
            title: self
                .selected
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_default(),
            metric: self.selected.clone(),
            description: record.and_then(|r| r.description.clone()),
            metric_type: record.and_then(|r| r.metric_type.clone()),
            current_value: self.current_value,
            updated_at: self.updated_at,
            min: self.extrema.min(),
            max: self.extrema.max(),
            points: self.buffer.to_vec(),
        }
    }
}
