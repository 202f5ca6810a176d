//! HTTP client for the geocoding API.
//!
//! Requests are constrained to one country (`components=country:XX`), biased
//! to the same region, and ask for responses in one language. Only the first
//! candidate of a successful response is used.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::types::{GeocodeResponse, GeocodedAddress};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const GEOCODE_PATH: &str = "maps/api/geocode/json";

/// Client for the geocoding API.
///
/// Use [`GeocodingClient::new`] for production or
/// [`GeocodingClient::with_base_url`] to point at a mock server in tests.
pub struct GeocodingClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GeocodingClient {
    /// Creates a client pointed at the production geocoding API.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`GeocodeError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends rather than replaces.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Resolves a free-text address to coordinates.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::EmptyAddress`] if `address` is blank; no request is sent.
    /// - [`GeocodeError::NoResults`] on `ZERO_RESULTS` or an empty result list.
    /// - [`GeocodeError::Status`] on any other non-`OK` status.
    /// - [`GeocodeError::UnexpectedBody`] if the service answered with HTML.
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::Deserialize`] if the JSON does not match the expected shape.
    pub async fn geocode(
        &self,
        address: &str,
        country: &str,
        language: &str,
    ) -> Result<GeocodedAddress, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }

        let url = self.build_url(address, country, language)?;
        tracing::debug!(address, country, "geocoding address");

        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        if body.trim_start().starts_with('<') {
            return Err(GeocodeError::UnexpectedBody {
                address: address.to_string(),
            });
        }

        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        if parsed.status == "ZERO_RESULTS" {
            return Err(GeocodeError::NoResults {
                address: address.to_string(),
            });
        }
        if parsed.status != "OK" {
            return Err(GeocodeError::Status {
                status: parsed.status,
                message: parsed
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            });
        }

        let first = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults {
                address: address.to_string(),
            })?;

        tracing::debug!(
            address,
            formatted = %first.formatted_address,
            lat = first.geometry.location.lat,
            lng = first.geometry.location.lng,
            "geocoded address"
        );

        Ok(GeocodedAddress {
            latitude: first.geometry.location.lat,
            longitude: first.geometry.location.lng,
            formatted_address: first.formatted_address,
        })
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, address: &str, country: &str, language: &str) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(GEOCODE_PATH)
            .map_err(|e| GeocodeError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("address", address);
            pairs.append_pair("components", &format!("country:{country}"));
            pairs.append_pair("region", country);
            pairs.append_pair("language", language);
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
