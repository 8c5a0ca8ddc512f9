//! HTTP client for a Tencent-style geocoder REST endpoint.
//!
//! Wraps `reqwest` with geocoder-specific error handling and typed
//! response deserialization. The API envelope carries its own `status`
//! field; non-zero statuses are surfaced as [`GeocodeError::Api`] (or
//! [`GeocodeError::RateLimited`] for the QPS-limit status), never as a
//! coordinate of `(0, 0)`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::GeocodeError;
use crate::retry::retry_with_backoff;

/// API status code the service returns when the per-second quota is hit.
const STATUS_QUOTA_EXCEEDED: i64 = 120;

/// One resolved coordinate with the service's confidence metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    /// Service-reported reliability, 1 (worst) to 10 (best), when given.
    pub reliability: Option<i64>,
    /// The service's recommended display form of the matched address.
    pub formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: i64,
    #[serde(default)]
    message: String,
    result: Option<EnvelopeResult>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResult {
    location: Location,
    reliability: Option<i64>,
    #[serde(default)]
    formatted_addresses: Option<FormattedAddresses>,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct FormattedAddresses {
    recommend: Option<String>,
}

/// Client for the geocoder HTTP API.
///
/// Use [`GeocoderClient::new`] for production or
/// [`GeocoderClient::with_base_url`] to point at a mock server in tests.
pub struct GeocoderClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl GeocoderClient {
    /// Creates a client with configured timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("placemap/0.1 (geocoding)")
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates a client against a custom base URL with no retries, for
    /// wiremock-backed tests.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, GeocodeError> {
        Self::new(api_key, base_url, 10, 0, 0)
    }

    /// Resolves one address string to coordinates, retrying transient
    /// failures with exponential backoff.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::RateLimited`] — quota status after all retries.
    /// - [`GeocodeError::NoMatch`] — the service matched nothing.
    /// - [`GeocodeError::Api`] — any other non-zero API status.
    /// - [`GeocodeError::Http`] — network failure after all retries.
    /// - [`GeocodeError::Deserialize`] — unexpected response shape.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.geocode_once(address)
        })
        .await
    }

    async fn geocode_once(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("address", address),
                ("key", &self.api_key),
                ("output", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        if envelope.status == STATUS_QUOTA_EXCEEDED {
            return Err(GeocodeError::RateLimited {
                status: envelope.status,
            });
        }
        if envelope.status != 0 {
            return Err(GeocodeError::Api {
                status: envelope.status,
                message: envelope.message,
            });
        }

        let result = envelope.result.ok_or_else(|| GeocodeError::NoMatch {
            query: address.to_owned(),
        })?;

        Ok(GeocodeResult {
            lat: result.location.lat,
            lng: result.location.lng,
            reliability: result.reliability,
            formatted_address: result
                .formatted_addresses
                .and_then(|f| f.recommend),
        })
    }
}
