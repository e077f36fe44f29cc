//! Domain records shared by the discovery, scraping, and pricing crates.
//!
//! Types crossing the HTTP boundary serialize in camelCase so the JSON shape
//! matches what browser clients send and expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Lightweight nearby-search hit, in provider relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub location: Option<Coordinate>,
    #[serde(default)]
    pub types: Vec<String>,
    pub rating: Option<f64>,
}

/// Richer per-place data. A missing `website` is normal, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetail {
    pub name: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub formatted_address: Option<String>,
}

/// Output of one page scrape. `None` fields mean the heuristics found nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub source_url: String,
    pub captured_at: DateTime<Utc>,
}

/// Where a competitor row's pricing data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The competitor's website was fetched and run through extraction.
    WebsiteScrape,
    /// Only the places listing was available; no website was fetched.
    PlacesListing,
}

/// One merged row of the scan response.
///
/// Rows with `error` set describe a candidate whose detail lookup or scrape
/// failed; the rest of the scan is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorRecord {
    pub name: String,
    pub address: String,
    pub place_id: String,
    pub website: Option<String>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub source: DataSource,
    pub availability: Option<String>,
    /// Miles from the facility, when both coordinates are known.
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompetitorRecord {
    /// Starts a row from a candidate with no pricing data yet.
    #[must_use]
    pub fn from_candidate(candidate: &PlaceCandidate, distance: Option<f64>) -> Self {
        Self {
            name: candidate.name.clone(),
            address: candidate.address.clone(),
            place_id: candidate.place_id.clone(),
            website: None,
            unit: None,
            price: None,
            source: DataSource::PlacesListing,
            availability: None,
            distance,
            error: None,
        }
    }
}

/// A recommended price derived from competitor prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    pub recommended_price: f64,
    pub rationale: String,
    pub confidence: f64,
}
