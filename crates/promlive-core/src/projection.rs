//! The view handed to chart renderers after every tick.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::series::TimeSeriesPoint;

/// Everything a chart needs to draw the selected series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Upper-cased metric name, empty until a metric is selected.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    /// Value from the latest snapshot, if the metric was present in it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    /// Timestamp (ms) of the newest appended point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub points: Vec<TimeSeriesPoint>,
}

impl Projection {
    /// One-line status: `[type: gauge, time: 12:00:05, value: 42] (min: 1, max: 50)`.
    ///
    /// Empty when the latest snapshot carried no value for the metric.
    pub fn summary(&self) -> String {
        let Some(value) = self.current_value else {
            return String::new();
        };

        let metric_type = self.metric_type.as_deref().unwrap_or("untyped");
        let time = self
            .updated_at
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut out = format!("[type: {metric_type}, time: {time}, value: {value}]");
        if let (Some(min), Some(max)) = (self.min, self.max) {
            out.push_str(&format!(" (min: {min}, max: {max})"));
        }
        out
    }

    /// Points no older than `range` relative to the newest point.
    pub fn points_within(&self, range: TimeRange) -> Vec<TimeSeriesPoint> {
        let (Some(span), Some(newest)) = (range.as_millis(), self.points.last()) else {
            return self.points.clone();
        };
        let cutoff = newest.timestamp.saturating_sub(span);
        self.points
            .iter()
            .filter(|p| p.timestamp >= cutoff)
            .copied()
            .collect()
    }
}

/// Zoom levels offered by the chart's range selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    OneMinute,
    FiveMinutes,
    TenMinutes,
    FifteenMinutes,
    #[default]
    All,
}

impl TimeRange {
    pub fn as_millis(self) -> Option<u64> {
        let minutes = match self {
            TimeRange::OneMinute => 1,
            TimeRange::FiveMinutes => 5,
            TimeRange::TenMinutes => 10,
            TimeRange::FifteenMinutes => 15,
            TimeRange::All => return None,
        };
        Some(minutes * 60 * 1000)
    }
}

impl FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" => Ok(TimeRange::OneMinute),
            "5m" => Ok(TimeRange::FiveMinutes),
            "10m" => Ok(TimeRange::TenMinutes),
            "15m" => Ok(TimeRange::FifteenMinutes),
            "all" => Ok(TimeRange::All),
            other => Err(CoreError::InvalidRange(other.to_string())),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::OneMinute => "1m",
            TimeRange::FiveMinutes => "5m",
            TimeRange::TenMinutes => "10m",
            TimeRange::FifteenMinutes => "15m",
            TimeRange::All => "all",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: u64, value: f64) -> TimeSeriesPoint {
        TimeSeriesPoint { timestamp, value }
    }

    #[test]
    fn summary_includes_min_max_when_both_known() {
        let projection = Projection {
            title: "UP".to_string(),
            metric_type: Some("gauge".to_string()),
            current_value: Some(1.0),
            updated_at: Some(1_700_000_000_000),
            min: Some(0.0),
            max: Some(1.0),
            ..Projection::default()
        };
        let summary = projection.summary();

        assert!(summary.starts_with("[type: gauge, time: "), "{summary}");
        assert!(summary.contains("value: 1]"), "{summary}");
        assert!(summary.ends_with("(min: 0, max: 1)"), "{summary}");
    }

    #[test]
    fn summary_empty_without_current_value() {
        let projection = Projection {
            title: "UP".to_string(),
            min: Some(0.0),
            max: Some(1.0),
            ..Projection::default()
        };
        assert_eq!(projection.summary(), "");
    }

    #[test]
    fn points_within_range_are_relative_to_newest() {
        let projection = Projection {
            points: vec![
                point(0, 1.0),
                point(200_000, 2.0),
                point(290_000, 3.0),
                point(300_000, 4.0),
            ],
            ..Projection::default()
        };

        let last_minute = projection.points_within(TimeRange::OneMinute);
        assert_eq!(last_minute, vec![point(290_000, 3.0), point(300_000, 4.0)]);

        let five = projection.points_within(TimeRange::FiveMinutes);
        assert_eq!(five.len(), 4);

        assert_eq!(projection.points_within(TimeRange::All).len(), 4);
    }

    #[test]
    fn time_range_parses_selector_labels() {
        assert_eq!("1m".parse::<TimeRange>().unwrap(), TimeRange::OneMinute);
        assert_eq!("15M".parse::<TimeRange>().unwrap(), TimeRange::FifteenMinutes);
        assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert!("2h".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::TenMinutes.to_string(), "10m");
    }
}
