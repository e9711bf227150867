//! Rolling time-series buffer.
//!
//! Holds the points charted for the selected metric. The buffer is sized in
//! multiples of a baseline width `B`: a reset fills it with `B + 1` zero
//! points one second apart, and once it reaches `20 · B` points the oldest
//! `B` are dropped in one block before the next append.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default baseline width, one minute of points at a 1 s cadence.
pub const DEFAULT_BASELINE: usize = 60;

/// Hard ceiling as a multiple of the baseline.
pub const CEILING_FACTOR: usize = 20;

/// Spacing of the zero points written by a reset.
const ZERO_FILL_STEP_MS: u64 = 1000;

/// A single charted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub value: f64,
}

/// Bounded, strictly time-ordered point buffer.
#[derive(Debug, Clone)]
pub struct TimeSeriesBuffer {
    points: VecDeque<TimeSeriesPoint>,
    baseline: usize,
    last_appended_at: u64,
}

impl TimeSeriesBuffer {
    /// An empty buffer with the given baseline width.
    pub fn new(baseline: usize) -> Self {
        let baseline = baseline.max(1);
        Self {
            points: VecDeque::with_capacity(baseline * CEILING_FACTOR),
            baseline,
            last_appended_at: 0,
        }
    }

    /// A buffer already reset to zeros ending at `now`.
    pub fn zero_filled(baseline: usize, now: u64) -> Self {
        let mut buffer = Self::new(baseline);
        buffer.reset(now);
        buffer
    }

    /// Replace the contents with `B + 1` zero points ending at `now`.
    pub fn reset(&mut self, now: u64) {
        self.points.clear();
        for back in (0..=self.baseline as u64).rev() {
            self.points.push_back(TimeSeriesPoint {
                timestamp: now.saturating_sub(back * ZERO_FILL_STEP_MS),
                value: 0.0,
            });
        }
        self.last_appended_at = now;
    }

    /// Append a point if it is newer than the last one.
    ///
    /// Returns `false` when the point was rejected as stale or duplicate.
    pub fn append(&mut self, timestamp: u64, value: f64) -> bool {
        if timestamp <= self.last_appended_at {
            return false;
        }
        if self.points.len() >= self.ceiling() {
            self.points.drain(..self.baseline);
        }
        self.points.push_back(TimeSeriesPoint { timestamp, value });
        self.last_appended_at = timestamp;
        true
    }

    pub fn baseline(&self) -> usize {
        self.baseline
    }

    /// Length at which the next append evicts a baseline-sized block.
    pub fn ceiling(&self) -> usize {
        self.baseline * CEILING_FACTOR
    }

    pub fn last_appended_at(&self) -> u64 {
        self.last_appended_at
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeriesPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<TimeSeriesPoint> {
        self.points.iter().copied().collect()
    }
}

impl Default for TimeSeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE)
    }
}
