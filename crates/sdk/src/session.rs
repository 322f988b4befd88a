//! The invocation channel: connect, correlate by request id, await results.

use crate::config::ClientConfig;
use crate::error::{TetherError, TetherResult};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tether_core::{
    ArgumentMap, ClientFrame, InvokeError, OperationDescriptor, ResultEnvelope, ServerFrame,
};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type WsRead = SplitStream<WsStream>;
type WsWrite = SplitSink<WsStream, Message>;
type Pending = HashMap<String, oneshot::Sender<ResultEnvelope>>;
type PendingMap = Arc<Mutex<Pending>>;

fn lock_pending(pending: &PendingMap) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One live invocation channel.
///
/// Requests are correlated by id, never by arrival order: each `invoke`
/// returns a handle the caller awaits on its own, and concurrently in-flight
/// requests resolve whenever their result frame arrives.
pub struct ToolSession {
    operations: Vec<OperationDescriptor>,
    out_tx: mpsc::Sender<ClientFrame>,
    pending: PendingMap,
}

impl ToolSession {
    /// Connect and perform the capability handshake.
    pub(crate) async fn connect(config: Arc<ClientConfig>) -> TetherResult<Self> {
        let ws_url = invocation_url(&config)?;
        debug!(url = %ws_url, "Connecting to invocation channel");

        let (ws_stream, _) = tokio::time::timeout(config.connect_timeout, connect_async(&ws_url))
            .await
            .map_err(|_| TetherError::Timeout)?
            .map_err(|e| TetherError::WebSocket(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        // The server speaks first: exactly one capability frame.
        let operations =
            tokio::time::timeout(config.handshake_timeout, await_capabilities(&mut read))
                .await
                .map_err(|_| TetherError::Timeout)??;

        let (out_tx, mut out_rx) = mpsc::channel::<ClientFrame>(32);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        // Outgoing frames; ends (and closes the socket) when the session and
        // all its senders are dropped.
        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let json = match serde_json::to_string(&frame) {
                    Ok(j) => j,
                    Err(e) => {
                        error!(error = %e, "failed to serialize client frame");
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json)).await {
                    error!(error = %e, "failed to send client frame");
                    break;
                }
            }
            let _ = write.send(Message::Close(None)).await;
        });

        // Incoming frames: resolve pending requests by id; when the stream
        // ends, whatever is still pending resolves as connection lost.
        let reader_pending = pending.clone();
        let pong_tx = out_tx.clone();
        tokio::spawn(async move {
            reader_loop(&mut read, &reader_pending, &pong_tx).await;
            drain_pending(&reader_pending);
        });

        info!(operations = operations.len(), "session established");
        Ok(Self {
            operations,
            out_tx,
            pending,
        })
    }

    /// Operation descriptors announced by the server at handshake.
    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Submit one invocation and return a handle awaiting its envelope.
    ///
    /// Submission and delivery are decoupled: this returns as soon as the
    /// frame is queued, and other invocations may be submitted before this
    /// one's result arrives.
    pub async fn invoke(
        &self,
        operation: &str,
        arguments: ArgumentMap,
    ) -> TetherResult<InvocationHandle> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        lock_pending(&self.pending).insert(request_id.clone(), tx);

        let frame = ClientFrame::Invoke {
            request_id: request_id.clone(),
            operation: operation.to_string(),
            arguments,
        };
        if self.out_tx.send(frame).await.is_err() {
            lock_pending(&self.pending).remove(&request_id);
            return Err(TetherError::Closed);
        }

        Ok(InvocationHandle { request_id, rx })
    }

    /// Invoke and wait for the envelope in one call.
    pub async fn call(
        &self,
        operation: &str,
        arguments: ArgumentMap,
    ) -> TetherResult<ResultEnvelope> {
        Ok(self.invoke(operation, arguments).await?.wait().await)
    }

    /// Cancel an in-flight invocation.
    ///
    /// The local handle resolves immediately with a cancellation error
    /// envelope; the server aborts the handler and discards its result.
    pub async fn cancel(&self, request_id: &str) -> TetherResult<()> {
        if let Some(tx) = lock_pending(&self.pending).remove(request_id) {
            let _ = tx.send(ResultEnvelope::error(format!(
                "request {request_id} was cancelled"
            )));
        }
        self.out_tx
            .send(ClientFrame::Cancel {
                request_id: request_id.to_string(),
            })
            .await
            .map_err(|_| TetherError::Closed)
    }

    /// Close the session. Every request still pending resolves with a
    /// connection-lost error envelope; none is left unresolved.
    pub async fn close(self) {
        drop(self.out_tx);
        drain_pending(&self.pending);
    }
}

/// Awaitable handle for one in-flight invocation, keyed by request id.
pub struct InvocationHandle {
    request_id: String,
    rx: oneshot::Receiver<ResultEnvelope>,
}

impl InvocationHandle {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Suspend until this request's envelope arrives.
    ///
    /// Total: a lost connection resolves as a connection-lost error
    /// envelope rather than an error of its own.
    pub async fn wait(self) -> ResultEnvelope {
        self.rx
            .await
            .unwrap_or_else(|_| ResultEnvelope::error(InvokeError::ConnectionLost.to_string()))
    }
}

async fn reader_loop(read: &mut WsRead, pending: &PendingMap, pong_tx: &mpsc::Sender<ClientFrame>) {
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                Ok(ServerFrame::Result {
                    request_id,
                    envelope,
                }) => {
                    let tx = lock_pending(pending).remove(&request_id);
                    match tx {
                        Some(tx) => {
                            let _ = tx.send(envelope);
                        }
                        None => {
                            debug!(request_id = %request_id, "result for unknown request id dropped");
                        }
                    }
                }
                Ok(ServerFrame::Ping) => {
                    let _ = pong_tx.send(ClientFrame::Pong).await;
                }
                Ok(ServerFrame::Pong) | Ok(ServerFrame::Capabilities { .. }) => {}
                Err(e) => {
                    warn!(error = %e, "unparseable server frame dropped");
                }
            },
            Ok(Message::Close(_)) => {
                info!("invocation channel closed by server");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "transport error");
                break;
            }
        }
    }
}

async fn await_capabilities(read: &mut WsRead) -> TetherResult<Vec<OperationDescriptor>> {
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let ServerFrame::Capabilities { operations } = serde_json::from_str(&text)? {
                    return Ok(operations);
                }
            }
            Ok(_) => {}
            Err(e) => return Err(TetherError::WebSocket(e.to_string())),
        }
    }
    Err(TetherError::Handshake(
        "stream ended before capabilities".to_string(),
    ))
}

/// Resolve every pending request with a connection-lost error envelope.
fn drain_pending(pending: &PendingMap) {
    let mut map = lock_pending(pending);
    if !map.is_empty() {
        warn!(
            pending = map.len(),
            "resolving pending requests as connection lost"
        );
    }
    for (_, tx) in map.drain() {
        let _ = tx.send(ResultEnvelope::error(
            InvokeError::ConnectionLost.to_string(),
        ));
    }
}

/// Build the channel URL from the base URL.
fn invocation_url(config: &ClientConfig) -> TetherResult<String> {
    let mut url = config.base_url.clone();

    // Change scheme to ws/wss
    let new_scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => "ws",
    };

    url.set_scheme(new_scheme)
        .map_err(|_| TetherError::Config("Failed to set WebSocket scheme".to_string()))?;

    url.set_path("/api/ws");

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn config(base: &str) -> ClientConfig {
        ClientConfig::new(Url::parse(base).unwrap())
    }

    #[test]
    fn test_invocation_url_swaps_scheme() {
        assert_eq!(
            invocation_url(&config("http://localhost:8080")).unwrap(),
            "ws://localhost:8080/api/ws"
        );
        assert_eq!(
            invocation_url(&config("https://tether.example.com")).unwrap(),
            "wss://tether.example.com/api/ws"
        );
    }

    #[test]
    fn test_invocation_url_replaces_path() {
        assert_eq!(
            invocation_url(&config("http://localhost:8080/some/other/path")).unwrap(),
            "ws://localhost:8080/api/ws"
        );
    }

    #[tokio::test]
    async fn test_drain_resolves_pending_as_connection_lost() {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = oneshot::channel();
        lock_pending(&pending).insert("r1".to_string(), tx);

        drain_pending(&pending);

        let envelope = rx.await.unwrap();
        assert!(!envelope.is_success());
        assert_eq!(
            envelope.error.as_deref(),
            Some("connection lost before a result was delivered")
        );
        assert!(lock_pending(&pending).is_empty());
    }

    #[tokio::test]
    async fn test_handle_resolves_when_sender_dropped() {
        let (tx, rx) = oneshot::channel();
        let handle = InvocationHandle {
            request_id: "r1".to_string(),
            rx,
        };
        drop(tx);

        let envelope = handle.wait().await;
        assert!(!envelope.is_success());
    }
}
