use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use varbi_client::ReqwestApiClient;
use varbi_core::JobService;
use varbi_mcp::config::ServerArgs;
use varbi_mcp::{McpHandler, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("varbi=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = ServerArgs::parse();

    let client =
        ReqwestApiClient::with_config(args.client_config()).context("Failed to create HTTP client")?;
    tracing::info!(
        base_url = %client.base_url(),
        timeout_secs = args.timeout_secs,
        "Starting Varbi MCP server"
    );

    let server = McpServer::new(McpHandler::new(JobService::new(client)));

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    server
        .serve(tokio::io::stdin(), tokio::io::stdout(), shutdown.clone())
        .await
        .context("stdio transport failed")?;

    // The blocking stdin read cannot be interrupted, so the runtime would
    // wait for one more input line before exiting.
    if shutdown.is_cancelled() {
        std::process::exit(0);
    }

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install CTRL+C handler"),
    }
}
