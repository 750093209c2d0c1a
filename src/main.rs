//! Tally - token counting service
//!
//! This is the main entry point for the Tally server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{info, warn};

use tally::{
    routes::{self, tokenize::DEFAULT_MODEL},
    AppState, Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    init_tracing(config.log_json);

    info!("Starting Tally token counting service");
    info!(
        cors = ?config.cors,
        max_upload_bytes = ?config.max_upload_bytes,
        "Configuration loaded successfully"
    );

    // Initialize metrics
    tally::metrics::init_metrics();
    info!("Metrics initialized");

    // Initialize application state
    let state = Arc::new(AppState::new(config.clone()));

    // Warm up the default encoder so the first request doesn't pay for it
    let tokenizers = state.tokenizers.clone();
    let (encoding, _) =
        tokio::task::spawn_blocking(move || tokenizers.encoder_for(DEFAULT_MODEL)).await??;
    info!(model = DEFAULT_MODEL, encoding = %encoding, "Default tokenizer ready");

    // Build the router
    let app = routes::create_router(state);

    // Bind to address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {}", addr);

    // Create listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Tally shutdown complete");
    Ok(())
}

/// Initialize tracing, optionally as JSON lines
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tally=info,tower_http=info".into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown");
        }
    }
}
