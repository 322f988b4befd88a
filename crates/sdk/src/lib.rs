//! # Tether SDK
//!
//! Rust client for Tether - streaming remote tool invocation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tether_sdk::{ArgumentMap, TetherClient, TetherResult};
//!
//! #[tokio::main]
//! async fn main() -> TetherResult<()> {
//!     // Build client
//!     let client = TetherClient::builder()
//!         .base_url("http://localhost:8080")
//!         .build()?;
//!
//!     // Open the invocation channel; the server announces its operations
//!     let session = client.connect().await?;
//!     for op in session.operations() {
//!         println!("{}: {}", op.name, op.description);
//!     }
//!
//!     // Invoke and wait for the correlated result
//!     let mut arguments = ArgumentMap::new();
//!     arguments.insert("values".to_string(), json!([1, 2, 3, 4, 5]));
//!     let envelope = session.call("sum", arguments).await?;
//!     println!("sum = {:?}", envelope.result);
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrent invocations
//!
//! ```rust,no_run
//! # use tether_sdk::{ArgumentMap, TetherClient};
//! # async fn example() -> tether_sdk::TetherResult<()> {
//! # let client = TetherClient::builder().base_url("http://localhost:8080").build()?;
//! let session = client.connect().await?;
//!
//! // Fire two requests; each handle resolves whenever its own result
//! // arrives, in any order.
//! let slow = session.invoke("analyze-data", ArgumentMap::new()).await?;
//! let fast = session.invoke("sum", ArgumentMap::new()).await?;
//!
//! let (slow_result, fast_result) = tokio::join!(slow.wait(), fast.wait());
//! # let _ = (slow_result, fast_result);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;

// Re-export main client
pub use client::{TetherClient, TetherClientBuilder};
pub use config::ClientConfig;
pub use error::{TetherError, TetherResult};
pub use session::{InvocationHandle, ToolSession};

// Re-export core types for convenience
pub use tether_core::{
    ArgumentMap, InvocationStatus, OperationDescriptor, ParamSpec, ParamType, ResultEnvelope,
};
