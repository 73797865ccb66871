//! CORS relay
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                     CORS RELAY                       │
//!   Browser request    │  ┌──────┐   ┌──────┐   ┌────────┐   ┌────────────┐   │
//!  ────────────────────┼─▶│ auth │──▶│ rate │──▶│ target │──▶│ allowlist  │   │
//!   /proxy?url=...     │  │ gate │   │ gate │   │  URL   │   │  (suffix)  │   │
//!                      │  └──────┘   └──────┘   └────────┘   └─────┬──────┘   │
//!                      │                                           ▼          │
//!                      │  ┌──────────┐   ┌──────────┐   ┌───────────────┐     │
//!                      │  │ forward  │◀──│ sanitize │◀──│ CORS origin   │     │
//!                      │  │ (reqwest)│   │ headers  │   │ (+ preflight) │     │
//!                      │  └────┬─────┘   └──────────┘   └───────────────┘     │
//!   Relayed response   │       ▼                                              │
//!  ◀───────────────────┼── relay (status, headers, streamed body) ◀────────────┼── Upstream
//!                      └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::{loader, CliArgs};
use cors_relay::http::HttpServer;
use cors_relay::lifecycle::{wait_for_signal, Shutdown};
use cors_relay::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Existing environment variables take precedence over .env entries.
    let dotenv = dotenvy::dotenv();

    let cli = CliArgs::parse();
    let config = loader::from_process(&cli)?;

    logging::init(&config.observability);

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    if dotenv.is_err() {
        tracing::debug!("No .env file found, using flags, environment and defaults");
    }
    tracing::debug!(config = ?config, "Configuration loaded");

    if config.observability.metrics_enabled {
        metrics::init_metrics(&config.observability.metrics_address)?;
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Server running");
    tracing::info!("Proxy endpoint: http://{}/proxy?url=TARGET_URL", local_addr);
    if config.auth_key().is_some() {
        tracing::info!(
            header = %config.security.auth_header,
            "Authentication required: pass the shared secret in the auth header"
        );
    }

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
