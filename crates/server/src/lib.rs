// Tether invocation server: WebSocket channel, session management, and the
// built-in operation set.

pub mod api;
pub mod config;
pub mod session;
pub mod tools;
pub mod websocket;

pub use config::{AppState, ServerConfig};
