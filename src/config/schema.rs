//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::upstream::peer::PeerParams;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DynamicConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Dynamic upstream endpoint settings.
    pub admin: AdminConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Upstream groups exposed to the dynamic API.
    pub upstreams: Vec<UpstreamConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8081").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Dynamic upstream endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Location serving list/add/remove/update requests.
    pub path: String,

    /// Bearer token required on every request when set.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            path: "/dynamic".to_string(),
            api_key: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
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
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One upstream group and the zone backing it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Group name used by the `upstream` request parameter.
    pub name: String,

    /// Zone capacity in bytes; bounds how many peers can be added.
    #[serde(default = "default_zone_size")]
    pub zone_size: usize,

    /// Initial servers, in order.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

fn default_zone_size() -> usize {
    64 * 1024
}

/// Initial server of an upstream group.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server address (e.g., "127.0.0.1:3000"); also the peer's name.
    pub address: String,

    #[serde(default = "default_weight")]
    pub weight: i64,

    #[serde(default = "default_max_fails")]
    pub max_fails: i64,

    /// Seconds.
    #[serde(default = "default_fail_timeout")]
    pub fail_timeout: i64,

    #[serde(default)]
    pub down: bool,
}

fn default_weight() -> i64 {
    1
}

fn default_max_fails() -> i64 {
    1
}

fn default_fail_timeout() -> i64 {
    10
}

impl ServerConfig {
    /// A server with default policy.
    pub fn new(address: impl Into<String>) -> Self {
        let params = PeerParams::default();
        Self {
            address: address.into(),
            weight: params.weight,
            max_fails: params.max_fails,
            fail_timeout: params.fail_timeout,
            down: params.down,
        }
    }

    pub fn params(&self) -> PeerParams {
        PeerParams {
            weight: self.weight,
            max_fails: self.max_fails,
            fail_timeout: self.fail_timeout,
            down: self.down,
        }
    }
}
