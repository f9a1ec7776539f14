use http::header::{self, HeaderValue};
use http::{Method, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper_util::rt;
use hyper_util::server::conn::auto;
use serde::Serialize;
use serde_json::json;
use tokio::net::{self, TcpListener};
use weather_core::{LookupError, OpenWeather};

use std::convert::Infallible;
use std::sync::Arc;

type Response = hyper::Response<Full<Bytes>>;

/// Accept loop: one task per connection, all sharing one lookup.
pub async fn serve(lookup: OpenWeather, address: impl net::ToSocketAddrs) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address).await?;
    let app = Arc::new(App { lookup });

    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                tracing::error!("accept failed: {error}");
                continue;
            }
        };

        let app = app.clone();

        drop(tokio::task::spawn(async move {
            let service = service_fn(move |request| {
                let app = app.clone();
                async move { Ok::<_, Infallible>(app.respond(request).await) }
            });

            if let Err(error) = auto::Builder::new(rt::TokioExecutor::new())
                .serve_connection(rt::TokioIo::new(stream), service)
                .await
            {
                tracing::debug!(%remote, "connection error: {error}");
            }
        }));
    }
}

struct App {
    lookup: OpenWeather,
}

impl App {
    /// Route a request. Body is never read, so any body type will do.
    async fn respond<B>(&self, request: hyper::Request<B>) -> Response {
        match (request.method(), request.uri().path()) {
            (&Method::GET, "/weather") => self.weather(request.uri().query()).await,
            (&Method::GET, "/health") => self.health(),
            (&Method::GET, "/") => capabilities(),
            (_, "/weather" | "/health" | "/") => error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                "method not allowed",
                "only GET is supported",
            ),
            _ => error_response(
                StatusCode::NOT_FOUND,
                "not found",
                "unknown path, see / for the capability listing",
            ),
        }
    }

    async fn weather(&self, query: Option<&str>) -> Response {
        // Reject before the core ever runs, so a missing parameter never
        // costs a provider call.
        let Some(city) = query.and_then(city_param) else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "missing city parameter",
                "send the city query parameter, e.g. /weather?city=Istanbul",
            );
        };

        match self.lookup.current(&city).await {
            Ok(record) => json_response(StatusCode::OK, &record),
            Err(error) => {
                tracing::warn!(%error, city = %city, "weather lookup failed");
                error_response(status_for(&error), "weather lookup failed", &error.to_string())
            }
        }
    }

    fn health(&self) -> Response {
        json_response(
            StatusCode::OK,
            &json!({
                "status": "ok",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "credential_configured": self.lookup.config().credential_configured(),
            }),
        )
    }
}

fn capabilities() -> Response {
    json_response(
        StatusCode::OK,
        &json!({
            "message": "Weather HTTP API",
            "endpoints": {
                "/weather": "GET, current weather for a city (city parameter required)",
                "/health": "GET, service health",
                "/": "GET, this listing",
            },
            "example": "/weather?city=Istanbul",
        }),
    )
}

/// First non-blank `city` value in the query string.
fn city_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "city")
        .map(|(_, value)| value.trim().to_owned())
        .filter(|city| !city.is_empty())
}

fn status_for(error: &LookupError) -> StatusCode {
    match error {
        LookupError::MissingCredential => StatusCode::BAD_REQUEST,
        LookupError::Unauthorized => StatusCode::UNAUTHORIZED,
        LookupError::NotFound { .. } => StatusCode::NOT_FOUND,
        LookupError::Timeout => StatusCode::REQUEST_TIMEOUT,
        LookupError::ConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,
        LookupError::Upstream { .. } | LookupError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    json_response(status, &json!({ "error": error, "message": message }))
}

fn json_response(status: StatusCode, body: &impl Serialize) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => build(status, bytes),
        Err(error) => {
            tracing::error!("response serialization failed: {error}");
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"internal serialization failure"}"#.to_vec(),
            )
        }
    }
}

fn build(status: StatusCode, bytes: Vec<u8>) -> Response {
    let mut response = hyper::Response::new(Full::new(Bytes::from(bytes)));

    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    response
}
