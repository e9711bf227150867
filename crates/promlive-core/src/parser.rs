//! Prometheus text exposition parsing.
//!
//! Handles the subset of the format that metrics endpoints actually emit
//! for live charting: `# HELP` and `# TYPE` metadata lines plus
//! `name{labels} value` samples. Label sets are kept as part of the
//! record name; see [`crate::aggregate`] for how parents are derived.

use tracing::trace;

use crate::aggregate::aggregate_series;
use crate::record::MetricsSnapshot;

const HELP_MARKER: &str = "# HELP";
const TYPE_MARKER: &str = "# TYPE";

/// Parse an exposition body into a snapshot.
///
/// Lines are processed in document order. Metadata and samples for the
/// same name may arrive in any order and are merged field by field.
/// Samples whose trailing token is not a finite number are dropped.
pub fn parse_exposition(body: &str, captured_at: u64) -> MetricsSnapshot {
    let mut snapshot = MetricsSnapshot::empty(captured_at);

    // Metadata from the most recent HELP/TYPE lines. Samples inherit it for
    // any field they don't have yet, which covers labelled children.
    let mut pending_description: Option<String> = None;
    let mut pending_type: Option<String> = None;
    let mut dropped = 0usize;

    for line in body.lines() {
        let line = line.trim_end();
        if line.trim_start().is_empty() {
            continue;
        }

        if let Some(rest) = strip_marker(line, HELP_MARKER) {
            let (name, description) = split_metadata(rest);
            if name.is_empty() {
                continue;
            }
            pending_description = non_empty(description);
            if let Some(description) = pending_description.clone() {
                snapshot.entry(name).description = Some(description);
            } else {
                snapshot.entry(name);
            }
        } else if let Some(rest) = strip_marker(line, TYPE_MARKER) {
            let (name, metric_type) = split_metadata(rest);
            if name.is_empty() {
                continue;
            }
            pending_type = non_empty(metric_type);
            if let Some(metric_type) = pending_type.clone() {
                snapshot.entry(name).metric_type = Some(metric_type);
            } else {
                snapshot.entry(name);
            }
        } else if let Some((name, value)) = parse_sample(line) {
            let record = snapshot.entry(name);
            record.value = Some(value);
            if record.description.is_none() {
                record.description = pending_description.clone();
            }
            if record.metric_type.is_none() {
                record.metric_type = pending_type.clone();
            }
        } else {
            dropped += 1;
        }
    }

    trace!(records = snapshot.len(), dropped, "parsed exposition body");
    snapshot
}

/// Parse a body and fill in aggregated parent values.
pub fn scrape_snapshot(body: &str, captured_at: u64) -> MetricsSnapshot {
    let mut snapshot = parse_exposition(body, captured_at);
    aggregate_series(&mut snapshot);
    snapshot
}

/// Strip a metadata marker and the single space that follows it.
///
/// `# HELPER` is not a HELP line, so the marker must be followed by a
/// space or end the line.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(marker)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

/// Split `name rest…` at the first space.
fn split_metadata(rest: &str) -> (&str, &str) {
    match rest.split_once(' ') {
        Some((name, text)) => (name.trim(), text.trim()),
        None => (rest.trim(), ""),
    }
}

/// Split `name{labels} value` at the last space.
fn parse_sample(line: &str) -> Option<(&str, f64)> {
    let (name, token) = line.rsplit_once(' ')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value: f64 = token.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((name, value))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricRecord;

    fn expected_a() -> MetricRecord {
        MetricRecord {
            name: "a".to_string(),
            description: Some("desc".to_string()),
            metric_type: Some("counter".to_string()),
            value: Some(5.0),
        }
    }

    #[test]
    fn metadata_and_sample_in_any_order() {
        let lines = ["# TYPE a counter", "# HELP a desc", "a 5"];
        let orders = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for order in orders {
            let body = order.iter().map(|&i| lines[i]).collect::<Vec<_>>().join("\n");
            let snapshot = parse_exposition(&body, 0);
            assert_eq!(snapshot.len(), 1, "order {order:?}");
            assert_eq!(snapshot.get("a"), Some(&expected_a()), "order {order:?}");
        }
    }

    #[test]
    fn malformed_sample_is_dropped() {
        let body = "bad_metric not_a_number\ngood_metric 3\n";
        let snapshot = parse_exposition(body, 0);

        assert!(!snapshot.contains("bad_metric"));
        assert_eq!(snapshot.get("good_metric").unwrap().value, Some(3.0));
    }

    #[test]
    fn labelled_samples_keep_label_suffix_and_inherit_metadata() {
        let body = "\
# HELP http_requests_total Total requests.
# TYPE http_requests_total counter
http_requests_total{method=\"get\",code=\"200\"} 1027
http_requests_total{method=\"post\",code=\"200\"} 3
";
        let snapshot = parse_exposition(body, 42);

        assert_eq!(snapshot.captured_at, 42);
        assert_eq!(
            snapshot.names(),
            vec![
                "http_requests_total",
                "http_requests_total{method=\"get\",code=\"200\"}",
                "http_requests_total{method=\"post\",code=\"200\"}",
            ]
        );
        let child = snapshot
            .get("http_requests_total{method=\"get\",code=\"200\"}")
            .unwrap();
        assert_eq!(child.value, Some(1027.0));
        assert_eq!(child.metric_type.as_deref(), Some("counter"));
        assert_eq!(child.description.as_deref(), Some("Total requests."));
        // Parent has metadata only until aggregation runs.
        assert_eq!(snapshot.get("http_requests_total").unwrap().value, None);
    }

    #[test]
    fn label_values_with_spaces_split_at_last_space() {
        let body = "build_info{version=\"1.0 beta\"} 1";
        let snapshot = parse_exposition(body, 0);

        let record = snapshot.get("build_info{version=\"1.0 beta\"}").unwrap();
        assert_eq!(record.value, Some(1.0));
    }

    #[test]
    fn help_description_keeps_inner_spaces() {
        let body = "# HELP process_cpu_seconds_total Total user and system CPU time spent in seconds.";
        let snapshot = parse_exposition(body, 0);

        assert_eq!(
            snapshot.get("process_cpu_seconds_total").unwrap().description.as_deref(),
            Some("Total user and system CPU time spent in seconds.")
        );
    }

    #[test]
    fn later_value_overwrites_earlier() {
        let snapshot = parse_exposition("a 1\na 2\n", 0);
        assert_eq!(snapshot.get("a").unwrap().value, Some(2.0));
    }

    #[test]
    fn pending_metadata_does_not_overwrite_own_help() {
        let body = "# HELP a first\n# HELP b second\na 1\n";
        let snapshot = parse_exposition(body, 0);

        assert_eq!(snapshot.get("a").unwrap().description.as_deref(), Some("first"));
        assert_eq!(snapshot.get("b").unwrap().description.as_deref(), Some("second"));
    }

    #[test]
    fn blank_lines_and_crlf_are_ignored() {
        let body = "\r\n# TYPE up gauge\r\n\r\n   \r\nup 1\r\n";
        let snapshot = parse_exposition(body, 0);

        assert_eq!(snapshot.len(), 1);
        let record = snapshot.get("up").unwrap();
        assert_eq!(record.value, Some(1.0));
        assert_eq!(record.metric_type.as_deref(), Some("gauge"));
    }

    #[test]
    fn non_finite_and_missing_values_are_dropped() {
        let body = "a NaN\nb +Inf\nlonely\nc 1e3\n";
        let snapshot = parse_exposition(body, 0);

        assert_eq!(snapshot.names(), vec!["c"]);
        assert_eq!(snapshot.get("c").unwrap().value, Some(1000.0));
    }

    #[test]
    fn marker_must_be_a_whole_token() {
        let snapshot = parse_exposition("# HELPER x 1\n", 0);
        // Not metadata, so it falls through to sample parsing.
        assert_eq!(snapshot.get("# HELPER x").unwrap().value, Some(1.0));
    }

    #[test]
    fn scrape_snapshot_aggregates_parents() {
        let body = "# TYPE a gauge\na{x=\"1\"} 3\na{x=\"2\"} 4\n";
        let snapshot = scrape_snapshot(body, 0);
        assert_eq!(snapshot.get("a").unwrap().value, Some(7.0));
    }
}
