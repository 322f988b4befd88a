//! Error types for the Tether SDK.

/// Result type for SDK operations.
pub type TetherResult<T> = Result<T, TetherError>;

/// Error types that can occur when using the Tether SDK.
///
/// These cover the client's own failures (transport, configuration). A
/// failed invocation is not an error at this level: it comes back as an
/// error envelope, like every other invocation outcome.
#[derive(Debug, thiserror::Error)]
pub enum TetherError {
    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server did not complete the capability handshake.
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Connect or handshake took too long.
    #[error("Request timed out")]
    Timeout,

    /// The session is closed; no further requests accepted.
    #[error("Session closed")]
    Closed,
}
