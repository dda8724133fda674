//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dispatcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for a dispatch run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Batch parameters (target, worker count, deadline).
    pub dispatch: DispatchConfig,

    /// Simulated endpoint used when no target is configured.
    pub endpoint: EndpointConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Batch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Target URL. `None` spawns the simulated endpoint and targets it.
    pub endpoint: Option<String>,

    /// Number of concurrent executions per batch.
    pub worker_count: usize,

    /// Shared deadline for the whole batch, in milliseconds.
    pub timeout_ms: u64,
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            worker_count: 10,
            timeout_ms: 50_000,
        }
    }
}

/// Simulated endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Bind address; port 0 picks a free port.
    pub bind_address: String,

    /// Delay before every response, in milliseconds.
    pub latency_ms: u64,

    /// Plaintext response body.
    pub body: String,
}

impl EndpointConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            latency_ms: 10_000,
            body: "Hello, world\n".to_string(),
        }
    }
}

/// Outbound client configuration.
///
/// The client is built once per dispatcher and shared by every execution.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection establishment timeout in milliseconds (none by default).
    pub connect_timeout_ms: Option<u64>,

    /// Maximum idle pooled connections per host.
    pub pool_max_idle_per_host: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Honour HTTP_PROXY/HTTPS_PROXY from the environment.
    pub use_env_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: None,
            pool_max_idle_per_host: 32,
            user_agent: concat!("fanout-dispatcher/", env!("CARGO_PKG_VERSION")).to_string(),
            use_env_proxy: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_parameters() {
        let config = DispatcherConfig::default();
        assert_eq!(config.dispatch.worker_count, 10);
        assert_eq!(config.dispatch.timeout(), Duration::from_secs(50));
        assert_eq!(config.endpoint.latency(), Duration::from_secs(10));
        assert!(config.dispatch.endpoint.is_none());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: DispatcherConfig = toml::from_str(
            r#"
            [dispatch]
            timeout_ms = 5

            [endpoint]
            latency_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch.timeout_ms, 5);
        assert_eq!(config.dispatch.worker_count, 10);
        assert_eq!(config.endpoint.latency_ms, 10);
        assert_eq!(config.endpoint.body, "Hello, world\n");
        assert_eq!(config.client.pool_max_idle_per_host, 32);
    }
}
