//! promlive.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_URL: &str = "http://127.0.0.1:9090/metrics";
pub const DEFAULT_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8480";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromliveConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// What to scrape and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Metric to follow once it appears; otherwise picked automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            metric: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings the refresh loop cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CoreError::InvalidConfig("url must not be empty".to_string()));
        }
        if !url.starts_with("http://") {
            return Err(CoreError::InvalidConfig(format!(
                "only http:// sources are supported: {url}"
            )));
        }
        if self.interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial scan config update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ScanConfigPatch {
    /// `base` with the set fields replaced. Not validated.
    pub fn apply_to(&self, base: &ScanConfig) -> ScanConfig {
        let mut config = base.clone();
        if let Some(url) = &self.url {
            config.url = url.trim().to_string();
        }
        if let Some(interval_secs) = self.interval_secs {
            config.interval_secs = interval_secs;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        config
    }
}

impl PromliveConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: PromliveConfig = toml::from_str(content)?;
        config.scan.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_minimal() {
        let config = PromliveConfig::from_toml_str("").unwrap();
        assert_eq!(config.scan.url, DEFAULT_URL);
        assert_eq!(config.scan.interval(), Duration::from_secs(5));
        assert_eq!(config.scan.timeout(), Duration::from_secs(10));
        assert_eq!(config.server.listen, DEFAULT_LISTEN);
    }

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
[scan]
url = "http://10.0.0.5:9100/metrics"
interval_secs = 15
timeout_secs = 3
metric = "node_load1"

[server]
listen = "0.0.0.0:9000"
"#;
        let config = PromliveConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.scan.url, "http://10.0.0.5:9100/metrics");
        assert_eq!(config.scan.interval_secs, 15);
        assert_eq!(config.scan.timeout_secs, 3);
        assert_eq!(config.scan.metric.as_deref(), Some("node_load1"));
        assert_eq!(config.server.listen, "0.0.0.0:9000");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = PromliveConfig::from_toml_str("[scan]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_https_rejected() {
        let scan = ScanConfig {
            url: "https://example.com/metrics".to_string(),
            ..ScanConfig::default()
        };
        assert!(scan.validate().is_err());
    }

    #[test]
    fn test_bad_toml() {
        let err = PromliveConfig::from_toml_str("[scan\nurl = ").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
    }

    #[test]
    fn test_round_trip_through_file() {
        let config = PromliveConfig {
            scan: ScanConfig {
                metric: Some("up".to_string()),
                ..ScanConfig::default()
            },
            server: ServerConfig::default(),
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = PromliveConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = PromliveConfig::from_file(Path::new("/nonexistent/promlive.toml")).unwrap_err();
        assert!(matches!(err, CoreError::ConfigRead(_)));
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let base = ScanConfig {
            metric: Some("up".to_string()),
            ..ScanConfig::default()
        };
        let patch = ScanConfigPatch {
            url: Some("  http://10.0.0.9/metrics ".to_string()),
            ..ScanConfigPatch::default()
        };
        let merged = patch.apply_to(&base);
        assert_eq!(merged.url, "http://10.0.0.9/metrics");
        assert_eq!(merged.interval_secs, DEFAULT_INTERVAL_SECS);
        assert_eq!(merged.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(merged.metric.as_deref(), Some("up"));
    }
}
