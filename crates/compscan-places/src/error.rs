use compscan_core::Retriable;
use thiserror::Error;

/// Errors returned by the geocoding / places client and its resolvers.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, or a non-2xx status, from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The address produced no geocoding results.
    #[error("could not resolve address \"{address}\"")]
    Resolution { address: String },

    /// The provider answered with an error status or an unexpected shape.
    #[error("places provider error: {0}")]
    Provider(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// **Retriable:** timeouts, connection failures, and HTTP 5xx.
///
/// **Not retriable:** resolution misses, provider status errors, 4xx, and
/// malformed bodies. Retrying would return the same answer.
impl Retriable for PlacesError {
    fn is_retriable(&self) -> bool {
        match self {
            PlacesError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            PlacesError::Resolution { .. }
            | PlacesError::Provider(_)
            | PlacesError::Deserialize { .. } => false,
        }
    }
}
