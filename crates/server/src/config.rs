use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tether_core::{Executor, OperationRegistry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Tunables for the invocation channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Seconds between server keepalive pings.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,

    /// Buffer size of the per-session completion queue.
    #[serde(default = "default_completion_buffer")]
    pub completion_buffer: usize,
}

fn default_heartbeat_secs() -> u64 {
    30
}

fn default_completion_buffer() -> usize {
    64
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
            completion_buffer: default_completion_buffer(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Ok(Self::default())
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub executor: Executor,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(registry: OperationRegistry, config: ServerConfig) -> Self {
        Self {
            executor: Executor::new(Arc::new(registry)),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.heartbeat_secs, 30);
        assert_eq!(config.completion_buffer, 64);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [stream]
            heartbeat_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.stream.heartbeat_secs, 5);
        assert_eq!(config.stream.completion_buffer, 64);
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.stream.heartbeat_secs, 30);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = ServerConfig::load(Path::new("/nonexistent/tether.toml")).unwrap();
        assert_eq!(config.stream.heartbeat_secs, 30);
    }
}
