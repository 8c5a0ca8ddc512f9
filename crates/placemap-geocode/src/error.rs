use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder not configured: set PLACEMAP_GEOCODER_API_KEY")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by geocoder (status {status})")]
    RateLimited { status: i64 },

    #[error("geocoder error {status}: {message}")]
    Api { status: i64, message: String },

    #[error("no match for \"{query}\"")]
    NoMatch { query: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
