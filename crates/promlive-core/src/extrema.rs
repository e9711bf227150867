//! Running minimum and maximum since the last reset.

use serde::Serialize;

/// Extrema of every value observed since the last reset.
///
/// Zero is a real observation. Only non-finite values are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MinMaxTracker {
    min: Option<f64>,
    max: Option<f64>,
}

impl MinMaxTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if self.min.is_none_or(|min| value < min) {
            self.min = Some(value);
        }
        if self.max.is_none_or(|max| value > max) {
            self.max = Some(value);
        }
    }

    pub fn reset(&mut self) {
        self.min = None;
        self.max = None;
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        let tracker = MinMaxTracker::new();
        assert_eq!(tracker.min(), None);
        assert_eq!(tracker.max(), None);
    }

    #[test]
    fn tracks_extrema() {
        let mut tracker = MinMaxTracker::new();
        for v in [5.0, 3.0, 8.0, 4.0] {
            tracker.observe(v);
        }
        assert_eq!(tracker.min(), Some(3.0));
        assert_eq!(tracker.max(), Some(8.0));
    }

    #[test]
    fn single_observation_sets_both() {
        let mut tracker = MinMaxTracker::new();
        tracker.observe(-2.5);
        assert_eq!(tracker.min(), Some(-2.5));
        assert_eq!(tracker.max(), Some(-2.5));
    }

    #[test]
    fn zero_counts_as_observation() {
        let mut tracker = MinMaxTracker::new();
        tracker.observe(4.0);
        tracker.observe(0.0);
        assert_eq!(tracker.min(), Some(0.0));
        assert_eq!(tracker.max(), Some(4.0));
    }

    #[test]
    fn non_finite_ignored() {
        let mut tracker = MinMaxTracker::new();
        tracker.observe(f64::NAN);
        tracker.observe(f64::INFINITY);
        assert_eq!(tracker.min(), None);

        tracker.observe(1.0);
        tracker.observe(f64::NEG_INFINITY);
        assert_eq!(tracker.min(), Some(1.0));
    }

    #[test]
    fn reset_clears_both() {
        let mut tracker = MinMaxTracker::new();
        tracker.observe(1.0);
        tracker.observe(2.0);
        tracker.reset();
        assert_eq!(tracker.min(), None);
        assert_eq!(tracker.max(), None);
    }
}
