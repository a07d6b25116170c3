// =============================================================================
// Server Configuration: JSON file with environment overrides
// =============================================================================
//
// Every field carries `#[serde(default)]` so a partial (or empty) file loads.
// A missing file is an error the caller turns into a warning plus defaults.
// Environment variables win over the file.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::validator::RangeCheck;

pub const DEFAULT_CONFIG_PATH: &str = "stock_signals.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_upstream_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_range() -> String {
    "30d".to_string()
}

fn default_interval() -> String {
    "1h".to_string()
}

// =============================================================================
// ServerConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the chart/options provider.
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Upper bound on a single upstream call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Range used when the query string omits `range`.
    #[serde(default = "default_range")]
    pub default_range: String,

    /// Interval used when the query string omits `interval`.
    #[serde(default = "default_interval")]
    pub default_interval: String,

    /// Also pull the options chain and attach it to `/api/stock` responses.
    #[serde(default)]
    pub fetch_options: bool,

    /// Seconds a fetched series may be served from memory. 0 disables caching.
    #[serde(default)]
    pub cache_ttl_secs: u64,

    /// Size intraday ranges by calendar days instead of their numeric prefix.
    #[serde(default)]
    pub strict_range_check: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            upstream_base_url: default_upstream_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_range: default_range(),
            default_interval: default_interval(),
            fetch_options: false,
            cache_ttl_secs: 0,
            strict_range_check: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(path = %path.display(), port = config.port, "config loaded");
        Ok(config)
    }

    /// Apply `STOCK_SIGNALS_BIND_ADDR`, `PORT` and `STOCK_SIGNALS_UPSTREAM_URL`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(addr) = read("STOCK_SIGNALS_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(port) = read("PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => warn!(value = %port, "ignoring unparseable PORT"),
            }
        }
        if let Some(url) = read("STOCK_SIGNALS_UPSTREAM_URL") {
            self.upstream_base_url = url;
        }
        self
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn range_check(&self) -> RangeCheck {
        if self.strict_range_check {
            RangeCheck::Calendar
        } else {
            RangeCheck::NumericPrefix
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:3001");
        assert_eq!(cfg.default_range, "30d");
        assert_eq!(cfg.default_interval, "1h");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert!(!cfg.fetch_options);
        assert!(cfg.cache_ttl().is_none());
        assert_eq!(cfg.range_check(), RangeCheck::NumericPrefix);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ServerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.upstream_base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "port": 8080, "cache_ttl_secs": 30, "strict_range_check": true }"#;
        let cfg: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.cache_ttl(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.range_check(), RangeCheck::Calendar);
        assert_eq!(cfg.default_range, "30d");
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(ServerConfig::load("/nonexistent/stock_signals.json").is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("STOCK_SIGNALS_BIND_ADDR", "127.0.0.1"),
            ("STOCK_SIGNALS_UPSTREAM_URL", "  "),
        ]
        .into_iter()
        .collect();
        let cfg = ServerConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.listen_addr(), "127.0.0.1:9000");
        // Blank values are ignored.
        assert_eq!(cfg.upstream_base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn bad_port_override_is_ignored() {
        let cfg = ServerConfig::default()
            .with_overrides(|k| (k == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(cfg.port, 3001);
    }
}
