use thiserror::Error;

/// Errors returned by the geocoding client.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service understood the request but found nothing for the address.
    #[error("no geocoding results for '{address}'")]
    NoResults { address: String },

    /// The service answered with a non-`OK` status such as `REQUEST_DENIED`.
    #[error("geocoding status {status}: {message}")]
    Status { status: String, message: String },

    /// The body was HTML instead of JSON, usually a key or quota problem.
    #[error("unexpected non-JSON response for '{address}' (check API key and quota)")]
    UnexpectedBody { address: String },

    /// The address was empty after trimming.
    #[error("address text is empty")]
    EmptyAddress,

    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
