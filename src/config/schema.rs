//! Configuration schema definitions.
//!
//! This module defines the static configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! Upstream settings come from the environment instead (see `upstream.rs`).

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Where the proxy endpoint is mounted.
    pub gateway: GatewayConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Proxy endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Path prefix the proxy is mounted under. Everything after it is
    /// appended to the upstream base address.
    pub mount_prefix: String,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` for upstream connections.
    pub use_system_proxy: bool,
}

impl GatewayConfig {
    /// Mount prefix without trailing slashes. Empty means the root.
    pub fn normalized_prefix(&self) -> &str {
        self.mount_prefix.trim_end_matches('/')
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/api/llm-proxy".to_string(),
            use_system_proxy: true,
        }
    }
}

/// Timeout configuration for upstream and inbound I/O.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time to wait for upstream response headers, and for a buffered
    /// upstream body, in seconds.
    pub response_secs: u64,

    /// Maximum silence between two chunks of a streamed response in seconds.
    pub idle_secs: u64,

    /// Time allowed for reading the inbound request body in seconds.
    pub request_body_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            response_secs: 120,
            idle_secs: 300,
            request_body_secs: 30,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB, room for image inputs
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
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
