//! Agent configuration

use anyhow::Result;
use podmon_lib::classify::ClassifierMode;
use podmon_lib::snapshot::LogFetchPolicy;
use serde::Deserialize;

/// Agent configuration, read from `PODMON_`-prefixed environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Namespace to monitor
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// API server port for probes, metrics, and read projections
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Central backend endpoint. Unset runs the embedded reconciler.
    #[serde(default)]
    pub backend_endpoint: Option<String>,

    /// Seconds between collection cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Status classification granularity (`reason` or `coarse`)
    #[serde(default)]
    pub classifier_mode: ClassifierMode,

    /// When to fetch pod logs (`always` or `on_error`)
    #[serde(default)]
    pub log_fetch: LogFetchPolicy,

    /// Log lines requested per pod
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: i64,

    /// Log age bound per pod, in seconds
    #[serde(default = "default_log_since_seconds")]
    pub log_since_seconds: i64,

    /// Lookback suppressing re-insertion of an identical error, in seconds
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,

    /// Errors persisted per pod per cycle
    #[serde(default = "default_max_errors_per_pod")]
    pub max_errors_per_pod: usize,

    /// Request timeout towards the backend, in seconds
    #[serde(default = "default_relay_timeout_secs")]
    pub relay_timeout_secs: u64,
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_poll_interval() -> u64 {
    30
}

fn default_log_tail_lines() -> i64 {
    100
}

fn default_log_since_seconds() -> i64 {
    60
}

fn default_dedup_window_secs() -> u64 {
    60
}

fn default_max_errors_per_pod() -> usize {
    1
}

fn default_relay_timeout_secs() -> u64 {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            api_port: default_api_port(),
            backend_endpoint: None,
            poll_interval_secs: default_poll_interval(),
            classifier_mode: ClassifierMode::default(),
            log_fetch: LogFetchPolicy::default(),
            log_tail_lines: default_log_tail_lines(),
            log_since_seconds: default_log_since_seconds(),
            dedup_window_secs: default_dedup_window_secs(),
            max_errors_per_pod: default_max_errors_per_pod(),
            relay_timeout_secs: default_relay_timeout_secs(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PODMON"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
