//! Cached nearby search for competitor candidates.

use std::sync::Arc;
use std::time::Duration;

use compscan_core::{CachedValue, Coordinate, PlaceCandidate, SharedCache};

use crate::client::PlacesClient;
use crate::error::PlacesError;

/// Largest radius the nearby-search endpoint accepts.
pub const MAX_RADIUS_METERS: u32 = 50_000;

const METERS_PER_MILE: f64 = 1_609.344;

/// Listings change slowly; six hours keeps repeat scans cheap.
const NEARBY_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Converts a radius in miles to whole meters, clamped to
/// `1..=MAX_RADIUS_METERS`. Non-finite or non-positive input maps to 1 m.
#[must_use]
pub fn radius_meters(miles: f64) -> u32 {
    if !miles.is_finite() || miles <= 0.0 {
        return 1;
    }
    let meters = (miles * METERS_PER_MILE).round();
    if meters >= f64::from(MAX_RADIUS_METERS) {
        MAX_RADIUS_METERS
    } else {
        // In range 0..MAX_RADIUS_METERS after the checks above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meters = meters as u32;
        meters.max(1)
    }
}

pub struct PlaceFinder {
    client: Arc<PlacesClient>,
    cache: SharedCache,
    keyword: String,
}

impl PlaceFinder {
    #[must_use]
    pub fn new(client: Arc<PlacesClient>, cache: SharedCache, keyword: impl Into<String>) -> Self {
        Self {
            client,
            cache,
            keyword: keyword.into(),
        }
    }

    /// Finds candidates around `center` within `radius_miles`.
    ///
    /// # Errors
    ///
    /// Propagates [`PlacesError`] from the nearby-search request, including
    /// [`PlacesError::Provider`] for a response with no `results` field.
    pub async fn find(
        &self,
        center: Coordinate,
        radius_miles: f64,
    ) -> Result<Vec<PlaceCandidate>, PlacesError> {
        let radius = radius_meters(radius_miles);
        let key = cache_key(center, radius);

        if let Some(CachedValue::Candidates(hit)) = self.cache.get(&key) {
            tracing::debug!(key, count = hit.len(), "nearby search cache hit");
            return Ok(hit);
        }

        let candidates = self
            .client
            .nearby_search(center, radius, &self.keyword)
            .await?;
        tracing::info!(
            %center,
            radius_meters = radius,
            count = candidates.len(),
            "nearby search returned candidates"
        );
        self.cache.set(key, CachedValue::Candidates(candidates.clone()), NEARBY_TTL);
        Ok(candidates)
    }
}

fn cache_key(center: Coordinate, radius_meters: u32) -> String {
    format!("nearby:{:.5},{:.5}:{radius_meters}", center.lat, center.lng)
}
