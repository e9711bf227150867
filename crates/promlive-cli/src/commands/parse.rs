use std::io::Read;

use promlive_core::{MetricsSnapshot, now_millis, scrape_snapshot, select_default};

pub fn parse(path: &str, format: &str) -> anyhow::Result<()> {
    let body = if path == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        body
    } else {
        std::fs::read_to_string(path)?
    };

    let snapshot = scrape_snapshot(&body, now_millis());

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        _ => {
            println!("{}", format_snapshot(&snapshot));
        }
    }

    Ok(())
}

/// One line per record, then the metric that would be followed.
pub fn format_snapshot(snapshot: &MetricsSnapshot) -> String {
    let width = snapshot
        .records()
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for record in snapshot.records() {
        let value = record
            .value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let metric_type = record.metric_type.as_deref().unwrap_or("");
        let line = format!("{:width$}  {value:>14}  {metric_type}", record.name);
        out.push_str(line.trim_end());
        out.push('\n');
    }

    match select_default(&snapshot.names()) {
        Some(name) => out.push_str(&format!(
            "\n{} records, default selection: {name}",
            snapshot.len()
        )),
        None => out.push_str(&format!("\n{} records, no default selection", snapshot.len())),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_records_with_aggregated_parent() {
        let body = "\
# TYPE http_requests_total counter
http_requests_total{code=\"200\"} 3
http_requests_total{code=\"500\"} 1
";
        let snapshot = scrape_snapshot(body, 1_000);
        let text = format_snapshot(&snapshot);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("http_requests_total "));
        assert!(lines[0].ends_with("4  counter"));
        assert!(lines[1].starts_with("http_requests_total{code=\"200\"}"));
        assert!(lines[1].ends_with('3'));
        assert_eq!(
            lines.last().copied(),
            Some("3 records, default selection: http_requests_total")
        );
    }

    #[test]
    fn empty_body() {
        let snapshot = scrape_snapshot("", 1_000);
        assert_eq!(format_snapshot(&snapshot), "\n0 records, no default selection");
    }
}
