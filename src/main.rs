use anyhow::Result;
use rmcp::ServiceExt;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_mcp::constants::{LOG_FILE, NWS_API_BASE, USER_AGENT};
use weather_mcp::Weather;

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the MCP transport, so tracing goes to stderr and the
    // append-mode log file.
    let log_file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    tracing::info!("Starting weather MCP server");
    tracing::info!("NWS API base URL: {NWS_API_BASE}");
    tracing::info!("User agent: {USER_AGENT}");

    let weather = Weather::new()?;
    let server = weather.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
