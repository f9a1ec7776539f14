//! Binary crate for the HTTP front-end.
//!
//! Exposes `GET /weather`, `GET /health` and `GET /` over hyper, backed by
//! the same lookup pipeline as the stdio front-end.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use weather_core::{Config, OpenWeather};

mod server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let port = config.port;
    tracing::info!(
        port,
        credential_configured = config.credential_configured(),
        "starting weather HTTP API"
    );

    server::serve(OpenWeather::new(config), ("0.0.0.0", port)).await
}
