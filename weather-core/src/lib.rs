//! Core library for the weather lookup service.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The shared domain model and lookup error taxonomy
//! - The OpenWeather lookup pipeline behind a swappable transport
//!
//! It is used by the `weather-mcp` and `weather-web` front-ends, but can be
//! reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::LookupError;
pub use model::WeatherRecord;
pub use provider::{HttpTransport, OpenWeather, RawReply, Transport, TransportError};
