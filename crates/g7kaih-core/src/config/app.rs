//! Server configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Service name echoed in `X-Service-Name`.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Service version echoed in `X-Service-Version`.
    #[serde(default = "default_service_version")]
    pub service_version: String,
    /// Reverse proxies whose `X-Forwarded-For` header is trusted.
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
    /// Graceful shutdown timeout for background tasks, in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
            service_version: default_service_version(),
            trusted_proxies: Vec::new(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_service_name() -> String {
    "g7kaih-api".to_string()
}

fn default_service_version() -> String {
    "1.0.0".to_string()
}

fn default_shutdown_grace() -> u64 {
    10
}
