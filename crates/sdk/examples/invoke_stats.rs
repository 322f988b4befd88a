//! Invocation example.
//!
//! Invokes the built-in statistics operations, including a call that fails
//! validation to show the error envelope.
//!
//! Run with: cargo run --example invoke_stats

use serde_json::json;
use tether_sdk::{ArgumentMap, TetherClient, TetherResult};

#[tokio::main]
async fn main() -> TetherResult<()> {
    tracing_subscriber::fmt::init();

    let client = TetherClient::builder()
        .base_url("http://localhost:8080")
        .build()?;

    let session = client.connect().await?;

    // Sum a list of numbers
    let mut arguments = ArgumentMap::new();
    arguments.insert("values".to_string(), json!([1, 2, 3, 4, 5]));
    let envelope = session.call("sum", arguments).await?;
    println!("sum -> {:?}", envelope.result);

    // Full summary statistics
    let mut arguments = ArgumentMap::new();
    arguments.insert("values".to_string(), json!([12.5, 7, "3", 42]));
    let envelope = session.call("analyze-data", arguments).await?;
    println!("analyze-data -> {:?}", envelope.result);

    // Invalid arguments come back as an error envelope, not a crash
    let mut arguments = ArgumentMap::new();
    arguments.insert("values".to_string(), json!("not-a-list"));
    let envelope = session.call("sum", arguments).await?;
    println!("invalid call -> {:?}", envelope.error);

    session.close().await;
    Ok(())
}
