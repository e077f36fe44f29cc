//! Cached place-details lookup.

use std::sync::Arc;
use std::time::Duration;

use compscan_core::{CachedValue, PlaceDetail, SharedCache};

use crate::client::PlacesClient;
use crate::error::PlacesError;

const DETAILS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct DetailResolver {
    client: Arc<PlacesClient>,
    cache: SharedCache,
}

impl DetailResolver {
    #[must_use]
    pub fn new(client: Arc<PlacesClient>, cache: SharedCache) -> Self {
        Self { client, cache }
    }

    /// Returns details for `place_id`, or `None` when the provider has no
    /// record. A `None` answer is cached like any other.
    ///
    /// # Errors
    ///
    /// Propagates [`PlacesError`] from the details request.
    pub async fn resolve(&self, place_id: &str) -> Result<Option<PlaceDetail>, PlacesError> {
        let key = format!("details:{place_id}");

        if let Some(CachedValue::Detail(hit)) = self.cache.get(&key) {
            tracing::debug!(place_id, "place details cache hit");
            return Ok(hit);
        }

        let detail = self.client.place_details(place_id).await?;
        if detail.is_none() {
            tracing::debug!(place_id, "provider has no details for place");
        }
        self.cache.set(key, CachedValue::Detail(detail.clone()), DETAILS_TTL);
        Ok(detail)
    }
}
