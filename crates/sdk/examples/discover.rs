//! Capability discovery example.
//!
//! Connects to a Tether server and prints the operations it announces
//! during the capability handshake.
//!
//! Run with: cargo run --example discover

use tether_sdk::{TetherClient, TetherResult};

#[tokio::main]
async fn main() -> TetherResult<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    let client = TetherClient::builder()
        .base_url("http://localhost:8080")
        .build()?;

    println!("Connecting to invocation channel...");
    let session = client.connect().await?;

    println!("Server announced {} operations:\n", session.operations().len());
    for op in session.operations() {
        println!("  {} - {}", op.name, op.description);
        for param in &op.parameters {
            println!(
                "    {} ({}{})",
                param.name,
                param.param_type.name(),
                if param.required { ", required" } else { "" }
            );
        }
    }

    session.close().await;
    Ok(())
}
