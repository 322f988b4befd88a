//! Main client for the Tether SDK.

use crate::config::ClientConfig;
use crate::error::{TetherError, TetherResult};
use crate::session::ToolSession;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for a Tether server.
#[derive(Debug, Clone)]
pub struct TetherClient {
    config: Arc<ClientConfig>,
}

impl TetherClient {
    /// Create a new client builder.
    pub fn builder() -> TetherClientBuilder {
        TetherClientBuilder::new()
    }

    /// Create a client from configuration.
    fn from_config(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open an invocation channel: connect, complete the capability
    /// handshake, and return the live session.
    pub async fn connect(&self) -> TetherResult<ToolSession> {
        ToolSession::connect(self.config.clone()).await
    }
}

/// Builder for creating a TetherClient.
pub struct TetherClientBuilder {
    base_url: Option<String>,
    connect_timeout: Duration,
    handshake_timeout: Duration,
}

impl TetherClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
        }
    }

    /// Set the base URL of the Tether server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the capability handshake timeout.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> TetherResult<TetherClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| TetherError::Config("base_url is required".to_string()))?;

        let base_url = Url::parse(&base_url_str)?;

        let config = ClientConfig {
            base_url,
            connect_timeout: self.connect_timeout,
            handshake_timeout: self.handshake_timeout,
        };

        Ok(TetherClient::from_config(config))
    }
}

impl Default for TetherClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
