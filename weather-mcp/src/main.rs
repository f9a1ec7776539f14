//! Binary crate for the stdio agent-tool front-end.
//!
//! Speaks JSON-RPC 2.0 over stdin/stdout, one message per line, and exposes
//! a single `get_weather` tool backed by `weather-core`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use weather_core::{Config, OpenWeather};

mod render;
mod rpc;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout belongs to the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    tracing::info!(
        credential_configured = config.credential_configured(),
        "weather MCP server listening on stdio"
    );

    server::Server::new(OpenWeather::new(config)).run().await
}
