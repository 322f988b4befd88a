use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use axum::body::Bytes;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::AppState;
use crate::session::Session;
use tether_core::{ClientFrame, ResultEnvelope, ServerFrame};

/// WebSocket handler for the invocation channel
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one client connection: capability handshake, then the
/// request/response loop until the peer goes away.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let mut session = Session::new();
    let (mut sender, mut receiver) = socket.split();

    // Capability handshake, sent exactly once before any invocation
    let capabilities = ServerFrame::Capabilities {
        operations: state.executor.registry().describe_all(),
    };
    if send_frame(&mut sender, &capabilities).await.is_err() {
        tracing::warn!(session_id = %session.id(), "client went away during handshake");
        return;
    }
    session.open();
    tracing::info!(session_id = %session.id(), "session open");

    // Completed invocations funnel back through this queue so the session
    // table has a single writer: this loop.
    let (done_tx, mut done_rx) =
        mpsc::channel::<(String, ResultEnvelope)>(state.config.stream.completion_buffer.max(1));

    let mut heartbeat =
        tokio::time::interval(Duration::from_secs(state.config.stream.heartbeat_secs.max(1)));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    heartbeat.tick().await; // the first tick fires immediately

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(frame) => {
                                if !handle_frame(frame, &mut session, &state, &done_tx, &mut sender).await {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(session_id = %session.id(), error = %e, "unparseable frame dropped");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) => {
                        let _ = sender.send(Message::Pong(Bytes::new())).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(session_id = %session.id(), error = %e, "transport error");
                        break;
                    }
                }
            }
            Some((request_id, envelope)) = done_rx.recv() => {
                // finish() returning false means the request was cancelled or
                // torn down; the envelope is discarded, never re-delivered.
                if session.finish(&request_id) {
                    let frame = ServerFrame::Result { request_id, envelope };
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
            }
            _ = heartbeat.tick() => {
                if send_frame(&mut sender, &ServerFrame::Ping).await.is_err() {
                    break;
                }
            }
        }
    }

    let aborted = session.close();
    if aborted > 0 {
        tracing::info!(session_id = %session.id(), aborted, "aborted in-flight invocations on disconnect");
    }
    tracing::info!(session_id = %session.id(), "session closed");
}

/// Dispatch one parsed client frame. Returns false when the connection
/// should be torn down.
async fn handle_frame(
    frame: ClientFrame,
    session: &mut Session,
    state: &Arc<AppState>,
    done_tx: &mpsc::Sender<(String, ResultEnvelope)>,
    sender: &mut SplitSink<WebSocket, Message>,
) -> bool {
    match frame {
        ClientFrame::Invoke {
            request_id,
            operation,
            arguments,
        } => {
            if session.is_in_flight(&request_id) {
                // The original request keeps its single envelope; answering
                // the duplicate would deliver the same id twice.
                tracing::warn!(
                    session_id = %session.id(),
                    request_id = %request_id,
                    "duplicate in-flight request id dropped"
                );
                return true;
            }

            tracing::debug!(
                session_id = %session.id(),
                request_id = %request_id,
                operation = %operation,
                "invocation received"
            );

            // Each invocation runs in its own task; a slow handler never
            // blocks this loop or other requests' results.
            let executor = state.executor.clone();
            let done = done_tx.clone();
            let id = request_id.clone();
            let handle = tokio::spawn(async move {
                let envelope = executor.invoke(&operation, arguments).await;
                let _ = done.send((id, envelope)).await;
            });

            if !session.begin(request_id, handle) {
                tracing::warn!(session_id = %session.id(), "invocation rejected by session");
            }
            true
        }
        ClientFrame::Cancel { request_id } => {
            if session.cancel(&request_id) {
                tracing::debug!(
                    session_id = %session.id(),
                    request_id = %request_id,
                    "invocation cancelled by client"
                );
            }
            true
        }
        ClientFrame::Ping => send_frame(sender, &ServerFrame::Pong).await.is_ok(),
        ClientFrame::Pong => true,
    }
}

/// Serialize and send one server frame.
async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize server frame");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}
