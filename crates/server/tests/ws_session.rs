// End-to-end exercise of the invocation channel: capability handshake,
// request-id correlation, validation failures, cancellation, and teardown.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tether_core::{
    ArgumentMap, Operation, OperationDescriptor, OperationRegistry, ParamSpec, ParamType,
};
use tether_sdk::{TetherClient, ToolSession};
use tether_server::config::{AppState, ServerConfig};
use tether_server::{api, tools};

/// Sleeps for the requested number of milliseconds, then echoes it back.
#[derive(Debug)]
struct SleepTool;

#[async_trait::async_trait]
impl Operation for SleepTool {
    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new("sleep", "Sleep then echo the duration")
            .with_param(ParamSpec::required("millis", ParamType::Number))
    }

    async fn call(&self, arguments: ArgumentMap) -> anyhow::Result<serde_json::Value> {
        let millis = arguments
            .get("millis")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(json!(millis))
    }
}

async fn start_server() -> String {
    let mut registry = OperationRegistry::new();
    tools::register_builtin(&mut registry).unwrap();
    registry.register(Arc::new(SleepTool)).unwrap();

    let state = AppState::new(registry, ServerConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn connect(base_url: &str) -> ToolSession {
    TetherClient::builder()
        .base_url(base_url)
        .build()
        .unwrap()
        .connect()
        .await
        .unwrap()
}

fn values_args(value: serde_json::Value) -> ArgumentMap {
    let mut arguments = ArgumentMap::new();
    arguments.insert("values".to_string(), value);
    arguments
}

#[tokio::test]
async fn test_handshake_announces_operations() {
    let base_url = start_server().await;
    let session = connect(&base_url).await;

    let names: Vec<&str> = session
        .operations()
        .iter()
        .map(|op| op.name.as_str())
        .collect();
    assert_eq!(names, vec!["sum", "analyze-data", "sleep"]);

    let sum = &session.operations()[0];
    assert_eq!(sum.parameters.len(), 1);
    assert_eq!(sum.parameters[0].name, "values");
    assert!(sum.parameters[0].required);

    session.close().await;
}

#[tokio::test]
async fn test_invoke_sum_success() {
    let base_url = start_server().await;
    let session = connect(&base_url).await;

    let envelope = session
        .call("sum", values_args(json!([1, 2, 3, 4, 5])))
        .await
        .unwrap();

    assert!(envelope.is_success());
    assert_eq!(envelope.result, Some(json!(15.0)));
    assert_eq!(envelope.error, None);

    session.close().await;
}

#[tokio::test]
async fn test_validation_error_names_the_field() {
    let base_url = start_server().await;
    let session = connect(&base_url).await;

    let envelope = session
        .call("sum", values_args(json!("not-a-list")))
        .await
        .unwrap();

    assert!(!envelope.is_success());
    assert_eq!(
        envelope.error.as_deref(),
        Some("invalid parameter values: expected array, got string")
    );

    session.close().await;
}

#[tokio::test]
async fn test_unknown_operation_returns_error_envelope() {
    let base_url = start_server().await;
    let session = connect(&base_url).await;

    let envelope = session
        .call("unknown-op", ArgumentMap::new())
        .await
        .unwrap();

    assert!(!envelope.is_success());
    assert_eq!(
        envelope.error.as_deref(),
        Some("unknown operation: unknown-op")
    );

    session.close().await;
}

#[tokio::test]
async fn test_slow_handler_does_not_block_other_requests() {
    let base_url = start_server().await;
    let session = connect(&base_url).await;

    let mut sleep_args = ArgumentMap::new();
    sleep_args.insert("millis".to_string(), json!(500));

    let slow = session.invoke("sleep", sleep_args).await.unwrap();
    let fast = session
        .invoke("sum", values_args(json!([1, 2])))
        .await
        .unwrap();

    // The fast result arrives while the slow handler is still running
    let start = tokio::time::Instant::now();
    let fast_envelope = fast.wait().await;
    assert!(fast_envelope.is_success());
    assert_eq!(fast_envelope.result, Some(json!(3.0)));
    assert!(start.elapsed() < Duration::from_millis(400));

    let slow_envelope = slow.wait().await;
    assert!(slow_envelope.is_success());
    assert_eq!(slow_envelope.result, Some(json!(500)));

    session.close().await;
}

#[tokio::test]
async fn test_cancel_resolves_the_handle() {
    let base_url = start_server().await;
    let session = connect(&base_url).await;

    let mut sleep_args = ArgumentMap::new();
    sleep_args.insert("millis".to_string(), json!(5000));

    let handle = session.invoke("sleep", sleep_args).await.unwrap();
    let request_id = handle.request_id().to_string();

    session.cancel(&request_id).await.unwrap();

    let envelope = handle.wait().await;
    assert!(!envelope.is_success());
    assert_eq!(
        envelope.error.as_deref(),
        Some(format!("request {request_id} was cancelled").as_str())
    );

    session.close().await;
}

#[tokio::test]
async fn test_close_resolves_pending_as_connection_lost() {
    let base_url = start_server().await;
    let session = connect(&base_url).await;

    let mut sleep_args = ArgumentMap::new();
    sleep_args.insert("millis".to_string(), json!(5000));

    let first = session.invoke("sleep", sleep_args.clone()).await.unwrap();
    let second = session.invoke("sleep", sleep_args).await.unwrap();

    session.close().await;

    for handle in [first, second] {
        let envelope = handle.wait().await;
        assert!(!envelope.is_success());
        assert_eq!(
            envelope.error.as_deref(),
            Some("connection lost before a result was delivered")
        );
    }
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let base_url = start_server().await;

    let first = connect(&base_url).await;
    let second = connect(&base_url).await;

    let envelope = first
        .call("sum", values_args(json!([10, 20])))
        .await
        .unwrap();
    assert_eq!(envelope.result, Some(json!(30.0)));

    first.close().await;

    // Closing one session leaves the other fully usable
    let envelope = second
        .call("sum", values_args(json!([1, 2, 3])))
        .await
        .unwrap();
    assert_eq!(envelope.result, Some(json!(6.0)));

    second.close().await;
}
