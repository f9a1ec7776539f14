use thiserror::Error;

/// Classified failure of a weather lookup.
///
/// Every failure mode of the pipeline maps onto exactly one variant. Raw
/// transport errors never cross this boundary, and the core never panics
/// on provider data: a malformed payload becomes [`LookupError::Unexpected`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No usable API key was configured; no request was sent.
    #[error("no API key configured, set OPENWEATHER_API_KEY or add api_key to the config file")]
    MissingCredential,

    /// The provider does not know the queried city.
    #[error("city \"{city}\" was not found, check the spelling and try again")]
    NotFound { city: String },

    /// The provider rejected the configured API key.
    #[error("the weather provider rejected the API key, check your credentials")]
    Unauthorized,

    /// The outbound request hit the per-call timeout.
    #[error("the weather request timed out, try again later")]
    Timeout,

    /// The provider could not be reached at all.
    #[error("could not connect to the weather provider, check your network connection")]
    ConnectionFailed,

    /// Any other non-2xx answer from the provider.
    #[error("the weather provider responded with status {status}")]
    Upstream { status: u16 },

    /// A 2xx answer whose payload did not match the expected shape.
    #[error("unexpected weather provider response: {0}")]
    Unexpected(String),
}
