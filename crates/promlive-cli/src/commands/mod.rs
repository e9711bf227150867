pub mod parse;
pub mod serve;
pub mod watch;

use std::path::PathBuf;

use clap::Args;
use promlive_core::PromliveConfig;
use promlive_scrape::{Monitor, MonitorHandle, http_fetcher};
use tokio::sync::watch as signal;
use tokio::task::JoinHandle;
use tracing::info;

/// Scrape settings shared by `watch` and `serve`. Flags override the file.
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Path to promlive.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Metrics endpoint (http:// only)
    #[arg(short, long)]
    pub url: Option<String>,
    /// Seconds between scrapes
    #[arg(short, long)]
    pub interval: Option<u64>,
    /// Seconds before a scrape is abandoned
    #[arg(short, long)]
    pub timeout: Option<u64>,
    /// Metric to follow instead of the automatic choice
    #[arg(short, long)]
    pub metric: Option<String>,
}

impl ScanArgs {
    pub fn load(&self) -> anyhow::Result<PromliveConfig> {
        let mut config = match &self.config {
            Some(path) => PromliveConfig::from_file(path)?,
            None => PromliveConfig::default(),
        };

        if let Some(url) = &self.url {
            config.scan.url = url.trim().to_string();
        }
        if let Some(interval) = self.interval {
            config.scan.interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            config.scan.timeout_secs = timeout;
        }
        if let Some(metric) = &self.metric {
            config.scan.metric = Some(metric.clone());
        }

        config.scan.validate()?;
        Ok(config)
    }
}

/// A monitor running in the background.
pub struct RunningMonitor {
    pub handle: MonitorHandle,
    shutdown: signal::Sender<bool>,
    task: JoinHandle<()>,
}

impl RunningMonitor {
    pub fn start(config: &PromliveConfig) -> anyhow::Result<Self> {
        let (monitor, handle) = Monitor::new(config.scan.clone(), http_fetcher())?;
        let (shutdown, shutdown_rx) = signal::channel(false);
        let task = tokio::spawn(monitor.run(shutdown_rx));
        Ok(Self {
            handle,
            shutdown,
            task,
        })
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
        info!("monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file_or_flags() {
        let config = ScanArgs::default().load().unwrap();
        assert_eq!(config, PromliveConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"[scan]\nurl = \"http://10.0.0.1:9100/metrics\"\ninterval_secs = 30\nmetric = \"up\"\n",
        )
        .unwrap();

        let args = ScanArgs {
            config: Some(file.path().to_path_buf()),
            interval: Some(2),
            ..ScanArgs::default()
        };
        let config = args.load().unwrap();
        assert_eq!(config.scan.url, "http://10.0.0.1:9100/metrics");
        assert_eq!(config.scan.interval_secs, 2);
        assert_eq!(config.scan.metric.as_deref(), Some("up"));
    }

    #[test]
    fn invalid_override_rejected() {
        let args = ScanArgs {
            timeout: Some(0),
            ..ScanArgs::default()
        };
        assert!(args.load().is_err());
    }
}
