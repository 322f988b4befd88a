use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tether_core::OperationRegistry;
use tether_server::config::{AppState, ServerConfig};
use tether_server::{api, tools};

#[derive(Parser, Debug)]
#[command(name = "tetherd")]
#[command(about = "Tether - streaming tool-invocation server", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "tether.toml")]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tetherd=info,tether_server=info,tower_http=debug".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    tracing::info!("Starting Tether invocation server");

    // Load configuration
    let config = ServerConfig::load(&args.config)?;

    // Register the built-in operation set; the registry is read-only from
    // here on.
    let mut registry = OperationRegistry::new();
    tools::register_builtin(&mut registry)?;
    tracing::info!("Registered {} operations", registry.len());

    let state = AppState::new(registry, config);

    // Start API server
    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Starting API server on {}", addr);

    api::serve(&addr, state).await?;

    Ok(())
}
