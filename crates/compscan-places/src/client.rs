//! HTTP client for the geocode / nearby-search / place-details provider.
//!
//! Wraps `reqwest` with API key management, typed response deserialization,
//! and a [`RetryPolicy`] for transient network failures. Provider-level error
//! statuses surface as [`PlacesError::Provider`].

use std::time::Duration;

use reqwest::{Client, Url};

use compscan_core::{Coordinate, PlaceCandidate, PlaceDetail, RetryPolicy};

use crate::error::PlacesError;
use crate::types::{GeocodeResponse, NearbySearchResponse, PlaceDetailsResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";

const GEOCODE_PATH: &str = "maps/api/geocode/json";
const NEARBY_SEARCH_PATH: &str = "maps/api/place/nearbysearch/json";
const DETAILS_PATH: &str = "maps/api/place/details/json";

/// Fields requested from the details endpoint. Billing is per field group,
/// so keep this list minimal.
pub const DETAIL_FIELDS: &str = "name,website,formatted_phone_number,formatted_address";

/// Client for the geocoding and places REST APIs.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl PlacesClient {
    /// Creates a new client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Provider`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("compscan/0.1 (competitor-pricing)")
            .build()?;

        // Exactly one trailing slash so `Url::join` appends the endpoint path
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::Provider(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy used for every request.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Geocodes a free-form address. An empty `Vec` means the provider found
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Provider`] on an error status other than `ZERO_RESULTS`.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn geocode(&self, address: &str) -> Result<Vec<Coordinate>, PlacesError> {
        let url = self.build_url(GEOCODE_PATH, &[("address", address)])?;
        let body = self.request_json(&url).await?;
        let response: GeocodeResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        check_status(&response.status, response.error_message.as_deref())?;
        Ok(response
            .results
            .into_iter()
            .map(|r| r.geometry.location.into())
            .collect())
    }

    /// Searches for places matching `keyword` within `radius_meters` of
    /// `center`, in provider relevance order.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Provider`] on an error status or when the response
    ///   has no `results` field.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn nearby_search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceCandidate>, PlacesError> {
        let location = center.to_string();
        let radius = radius_meters.to_string();
        let url = self.build_url(
            NEARBY_SEARCH_PATH,
            &[
                ("location", &location),
                ("radius", &radius),
                ("keyword", keyword),
            ],
        )?;
        let body = self.request_json(&url).await?;
        let response: NearbySearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("nearbysearch(location={location}, radius={radius})"),
                source: e,
            })?;

        check_status(&response.status, response.error_message.as_deref())?;
        let results = response.results.ok_or_else(|| {
            PlacesError::Provider("nearby search response missing results".to_owned())
        })?;
        Ok(results.into_iter().map(PlaceCandidate::from).collect())
    }

    /// Fetches details for one place. `Ok(None)` when the provider has no
    /// record for `place_id`.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Provider`] on an error status other than
    ///   `NOT_FOUND` / `ZERO_RESULTS`.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetail>, PlacesError> {
        let url = self.build_url(
            DETAILS_PATH,
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        )?;
        let body = self.request_json(&url).await?;
        let response: PlaceDetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        if response.status == "NOT_FOUND" {
            return Ok(None);
        }
        check_status(&response.status, response.error_message.as_deref())?;
        Ok(response.result.map(PlaceDetail::from))
    }

    /// Builds the full request URL with percent-encoded query parameters and
    /// the API key appended.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::Provider(format!("invalid endpoint path '{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request under the retry policy, asserts a 2xx status, and
    /// parses the body as JSON. Transport errors are stripped of the request
    /// URL, which carries the API key.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let client = &self.client;
        let endpoint = url.path();
        self.retry
            .run(endpoint, || async move {
                let response = client.get(url.clone()).send().await.map_err(redact)?;
                let response = response.error_for_status().map_err(redact)?;
                let body = response.text().await.map_err(redact)?;
                serde_json::from_str::<serde_json::Value>(&body).map_err(|e| {
                    PlacesError::Deserialize {
                        context: endpoint.to_owned(),
                        source: e,
                    }
                })
            })
            .await
    }
}

fn redact(error: reqwest::Error) -> PlacesError {
    PlacesError::Http(error.without_url())
}

/// Maps a provider status to an error. `OK` and `ZERO_RESULTS` pass.
fn check_status(status: &str, message: Option<&str>) -> Result<(), PlacesError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(PlacesError::Provider(match message {
            Some(msg) => format!("{other}: {msg}"),
            None => other.to_owned(),
        })),
    }
}
