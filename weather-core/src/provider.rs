use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

pub use openweather::OpenWeather;

/// Raw provider reply, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

/// Transport-level failure: the provider never answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    TimedOut,
    ConnectionFailed,
}

/// Seam between the lookup pipeline and the network.
///
/// Production uses [`HttpTransport`]; tests substitute fakes that return
/// canned replies and count outbound calls.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<RawReply, TransportError>;
}

/// Real HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<RawReply, TransportError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(classify)?;

        Ok(RawReply { status, body })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::TimedOut
    } else {
        TransportError::ConnectionFailed
    }
}
