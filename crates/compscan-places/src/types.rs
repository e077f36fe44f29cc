//! Provider response types for the geocode, nearby-search, and place-details
//! endpoints.
//!
//! Every response carries a top-level `status` string: `"OK"` and
//! `"ZERO_RESULTS"` are successes, `"NOT_FOUND"` is a normal miss on details,
//! and anything else (`"REQUEST_DENIED"`, `"INVALID_REQUEST"`,
//! `"OVER_QUERY_LIMIT"`, ...) is a provider error with an optional
//! `error_message`.

use serde::Deserialize;

use compscan_core::{Coordinate, PlaceCandidate, PlaceDetail};

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(value: LatLng) -> Self {
        Coordinate::new(value.lat, value.lng)
    }
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

// ---------------------------------------------------------------------------
// geocode
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

// ---------------------------------------------------------------------------
// nearbysearch
// ---------------------------------------------------------------------------

/// `results` is optional here so a body without it can be reported as a
/// malformed response instead of an empty list.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Option<Vec<NearbyResult>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyResult {
    pub place_id: String,
    pub name: String,
    /// Short address; nearby search returns `vicinity` rather than a full
    /// formatted address.
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl From<NearbyResult> for PlaceCandidate {
    fn from(value: NearbyResult) -> Self {
        PlaceCandidate {
            place_id: value.place_id,
            name: value.name,
            address: value
                .vicinity
                .or(value.formatted_address)
                .unwrap_or_default(),
            location: value.geometry.map(|g| g.location.into()),
            types: value.types,
            rating: value.rating,
        }
    }
}

// ---------------------------------------------------------------------------
// details
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<DetailsResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsResult {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

impl From<DetailsResult> for PlaceDetail {
    fn from(value: DetailsResult) -> Self {
        PlaceDetail {
            name: value.name,
            website: value.website.filter(|w| !w.trim().is_empty()),
            phone: value.formatted_phone_number,
            formatted_address: value.formatted_address,
        }
    }
}
