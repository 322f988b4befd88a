//! Configuration types for the Tether SDK.

use std::time::Duration;
use url::Url;

/// Configuration for the Tether client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Tether server.
    pub base_url: Url,
    /// Timeout for establishing the WebSocket connection.
    pub connect_timeout: Duration,
    /// Timeout for the capability handshake after connecting.
    pub handshake_timeout: Duration,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
        }
    }
}
