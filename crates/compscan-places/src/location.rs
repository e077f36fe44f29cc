//! Turns user input into a [`Coordinate`].
//!
//! Input that is already a strict `lat,lng` pair is parsed locally; anything
//! else goes through one geocoding request. Results are not cached here
//! because address strings vary too widely to hit often.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use compscan_core::Coordinate;

use crate::client::PlacesClient;
use crate::error::PlacesError;

static COORDINATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d{1,3}(?:\.\d+)?)\s*,\s*(-?\d{1,3}(?:\.\d+)?)\s*$")
        .expect("valid coordinate regex")
});

/// Parses `"lat,lng"` into a coordinate. Returns `None` for anything that is
/// not two in-range decimal numbers separated by a comma.
#[must_use]
pub fn parse_coordinate(input: &str) -> Option<Coordinate> {
    let caps = COORDINATE_RE.captures(input)?;
    let lat: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lng: f64 = caps.get(2)?.as_str().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(Coordinate::new(lat, lng))
}

pub struct LocationResolver {
    client: Arc<PlacesClient>,
}

impl LocationResolver {
    #[must_use]
    pub fn new(client: Arc<PlacesClient>) -> Self {
        Self { client }
    }

    /// Resolves `input` to a coordinate.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Resolution`] when the geocoder returns no results.
    /// - Any client error from the geocoding request.
    pub async fn resolve(&self, input: &str) -> Result<Coordinate, PlacesError> {
        if let Some(coordinate) = parse_coordinate(input) {
            tracing::debug!(%coordinate, "input is a literal coordinate; skipping geocode");
            return Ok(coordinate);
        }

        let results = self.client.geocode(input).await?;
        let coordinate = results
            .into_iter()
            .next()
            .ok_or_else(|| PlacesError::Resolution {
                address: input.to_owned(),
            })?;
        tracing::debug!(address = input, %coordinate, "geocoded address");
        Ok(coordinate)
    }
}
