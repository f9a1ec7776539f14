use serde::Deserialize;
use std::sync::Arc;

use crate::{Config, LookupError, WeatherRecord};

use super::{HttpTransport, RawReply, Transport, TransportError};

/// Current-weather lookup against the OpenWeather API.
///
/// Stateless per request: one outbound call per lookup, no retries and no
/// caching. The caller decides whether a [`LookupError::Timeout`] is worth
/// retrying.
#[derive(Debug, Clone)]
pub struct OpenWeather {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl OpenWeather {
    pub fn new(config: Config) -> Self {
        let transport = Arc::new(HttpTransport::new(config.timeout));
        Self::with_transport(config, transport)
    }

    /// Build a lookup with an explicit transport. Tests use this to swap in
    /// fakes; production code has no reason to.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Look up the current weather for `city`.
    ///
    /// Without a usable credential this fails immediately and no request is
    /// sent at all.
    pub async fn current(&self, city: &str) -> Result<WeatherRecord, LookupError> {
        if !self.config.credential_configured() {
            return Err(LookupError::MissingCredential);
        }

        let query = [
            ("q", city),
            ("appid", self.config.api_key.as_str()),
            ("units", "metric"),
            ("lang", self.config.lang.as_str()),
        ];

        let reply = self
            .transport
            .get(&self.config.base_url, &query)
            .await
            .map_err(|error| match error {
                TransportError::TimedOut => LookupError::Timeout,
                TransportError::ConnectionFailed => LookupError::ConnectionFailed,
            })?;

        interpret(city, &reply)
    }
}

/// Map the provider's status code and payload to a record or a classified
/// error.
fn interpret(city: &str, reply: &RawReply) -> Result<WeatherRecord, LookupError> {
    match reply.status {
        404 => Err(LookupError::NotFound {
            city: city.to_owned(),
        }),
        401 => Err(LookupError::Unauthorized),
        status if !(200..300).contains(&status) => Err(LookupError::Upstream { status }),
        _ => normalize(&reply.body),
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u16,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn normalize(body: &str) -> Result<WeatherRecord, LookupError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|error| LookupError::Unexpected(format!("malformed weather payload: {error}")))?;

    let description = parsed
        .weather
        .first()
        .map(|w| title_case(&w.description))
        .ok_or_else(|| {
            LookupError::Unexpected("weather payload contained no conditions".to_owned())
        })?;

    Ok(WeatherRecord {
        city: parsed.name,
        country: parsed.sys.country,
        temperature: round1(parsed.main.temp),
        feels_like: round1(parsed.main.feels_like),
        description,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        pressure: parsed.main.pressure,
        timestamp: parsed.dt,
    })
}

/// Round to one decimal place, halves away from zero (`f64::round`).
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Uppercase the first letter of every whitespace-separated word.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
