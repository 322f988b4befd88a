// Wire frames for the invocation channel (JSON text frames over the stream)

use crate::schema::{ArgumentMap, OperationDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status tag of a result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Success,
    Error,
}

/// The uniform success/error wrapper returned for every invocation.
///
/// Exactly one of `result` (on success) or `error` (on error) is populated;
/// the constructors are the only way these are built, so the pairing can't
/// drift. Both fields serialize as explicit `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub status: InvocationStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl ResultEnvelope {
    pub fn success(result: impl Into<Value>) -> Self {
        Self {
            status: InvocationStatus::Success,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Error,
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Success
    }
}

/// Frames sent by the client over the invocation channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Invoke a named operation; the result arrives as a `ServerFrame::Result`
    /// tagged with the same request id.
    Invoke {
        request_id: String,
        operation: String,
        arguments: ArgumentMap,
    },
    /// Abort an in-flight invocation; its result is discarded.
    Cancel { request_id: String },
    /// Keepalive.
    Ping,
    Pong,
}

/// Frames sent by the server over the invocation channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Capability handshake, sent once immediately after connect.
    Capabilities {
        operations: Vec<OperationDescriptor>,
    },
    /// Result of one invocation, correlated by request id. Delivery order is
    /// unrelated to submission order.
    Result {
        request_id: String,
        #[serde(flatten)]
        envelope: ResultEnvelope,
    },
    /// Keepalive.
    Ping,
    Pong,
}
