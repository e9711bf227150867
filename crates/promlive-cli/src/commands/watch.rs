use promlive_scrape::MonitorStatus;
use tracing::info;

use super::{RunningMonitor, ScanArgs};

pub async fn watch(args: &ScanArgs, format: &str) -> anyhow::Result<()> {
    let config = args.load()?;
    let monitor = RunningMonitor::start(&config)?;
    let mut status = monitor.handle.subscribe();
    let mut printed = 0;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                if current.ticks == printed {
                    continue;
                }
                printed = current.ticks;
                match format {
                    "json" => println!("{}", serde_json::to_string(&current.projection)?),
                    _ => println!("{}", format_status(&current)),
                }
            }
            _ = &mut ctrl_c => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    monitor.stop().await;
    Ok(())
}

/// One tick as text: title, description, summary and window size.
pub fn format_status(status: &MonitorStatus) -> String {
    let projection = &status.projection;
    if projection.metric.is_none() {
        return format!("waiting for metrics from {}", status.config.url);
    }

    let mut out = projection.title.clone();
    if let Some(description) = &projection.description {
        out.push_str("\n  ");
        out.push_str(description);
    }

    let summary = projection.summary();
    out.push_str("\n  ");
    if summary.is_empty() {
        out.push_str("[no value in latest scrape]");
    } else {
        out.push_str(&summary);
    }
    out.push_str(&format!("  ({} points)", projection.points.len()));
    out
}
