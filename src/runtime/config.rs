//! Bridge configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the bridge and its local invocation server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Host address the local server binds to.
    pub host: String,
    /// Port the local server listens on.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Default invocation time budget in seconds, used when the envelope
    /// context carries no remaining-time figure.
    pub invocation_timeout: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024, // 10MB
            invocation_timeout: 30,
        }
    }
}

impl BridgeConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum request body size.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Set the default invocation time budget in seconds.
    pub fn invocation_timeout(mut self, seconds: u64) -> Self {
        self.invocation_timeout = seconds;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The default time budget as a duration.
    pub fn default_budget(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout)
    }
}
