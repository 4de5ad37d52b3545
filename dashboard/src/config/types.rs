//! Configuration structures for the dashboard host.
//!
//! Everything here deserializes from `default.toml`; every field has a
//! default so a missing file or a partial file still yields a runnable
//! configuration. Polling cadences are deliberately configuration, not
//! constants baked into the pollers.

use serde::Deserialize;
use std::time::Duration;

/// `[agent]`: how to reach the detection agent's gRPC endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Endpoint URI, scheme included.
    pub endpoint: String,
    pub connect_timeout_secs: u64,
    /// Per-call deadline; also bounds a stream-open stuck in connecting.
    pub request_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:50051".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

/// `[bridge]`: where display surfaces connect.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Loopback listen address for the display channel.
    pub listen: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:7801".to_string(),
        }
    }
}

/// `[polling]`: per-domain refresh cadence and view limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub health_interval_secs: u64,
    pub risk_interval_secs: u64,
    pub quarantine_interval_secs: u64,
    pub logs_interval_secs: u64,
    /// Max processes requested per risk-overview fetch.
    pub risk_limit: u32,
    /// Max entries requested per detector-log fetch.
    pub log_limit: u32,
    /// Cap on the accumulated in-memory log history.
    pub log_history_limit: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            health_interval_secs: 2,
            risk_interval_secs: 3,
            quarantine_interval_secs: 4,
            logs_interval_secs: 5,
            risk_limit: 100,
            log_limit: 128,
            log_history_limit: 512,
        }
    }
}

impl PollingConfig {
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
    pub fn risk_interval(&self) -> Duration {
        Duration::from_secs(self.risk_interval_secs)
    }
    pub fn quarantine_interval(&self) -> Duration {
        Duration::from_secs(self.quarantine_interval_secs)
    }
    pub fn logs_interval(&self) -> Duration {
        Duration::from_secs(self.logs_interval_secs)
    }
}

/// `[logging]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of: off, error, warn, info, debug, trace.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level config as deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub bridge: BridgeConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}
