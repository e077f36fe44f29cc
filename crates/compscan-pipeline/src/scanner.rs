use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use compscan_core::{
    haversine_miles, AppConfig, CompetitorRecord, Coordinate, DataSource, PlaceCandidate,
    RetryPolicy, SharedCache,
};
use compscan_places::{DetailResolver, LocationResolver, PlaceFinder, PlacesClient};
use compscan_scraper::{
    BrowserSettings, ChromiumFetcher, HostThrottle, PageScraper, RegexPriceExtractor,
};

use crate::error::ScanError;

/// Search radius used when a caller does not supply one.
pub const DEFAULT_RADIUS_MILES: f64 = 10.0;

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_MAX_CANDIDATES: usize = 20;

/// Back-off growth between scrape retries.
const SCRAPE_BACKOFF_MULTIPLIER: f64 = 1.5;

pub struct Scanner {
    locator: LocationResolver,
    finder: PlaceFinder,
    details: DetailResolver,
    scraper: PageScraper,
    concurrency: usize,
    max_candidates: usize,
}

impl Scanner {
    #[must_use]
    pub fn new(
        locator: LocationResolver,
        finder: PlaceFinder,
        details: DetailResolver,
        scraper: PageScraper,
    ) -> Self {
        Self {
            locator,
            finder,
            details,
            scraper,
            concurrency: DEFAULT_CONCURRENCY,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    /// Number of candidates processed at once. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Caps the number of candidates taken from the nearby search.
    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Builds a production scanner: HTTP places client, headless Chromium
    /// fetcher, and a host throttle, all sharing `cache`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Setup`] if the places HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, cache: SharedCache) -> Result<Self, ScanError> {
        let client = Arc::new(
            PlacesClient::new(&config.places_api_key, config.places_timeout_secs)
                .map_err(ScanError::Setup)?,
        );

        let fetcher = ChromiumFetcher::new(BrowserSettings {
            executable: config.chrome_executable.clone(),
            nav_timeout: config.nav_timeout(),
            headless: true,
        });
        let retry = RetryPolicy::new(
            config.scrape_max_retries,
            Duration::from_millis(config.scrape_backoff_ms),
            SCRAPE_BACKOFF_MULTIPLIER,
        );
        let scraper = PageScraper::new(
            Arc::new(fetcher),
            Arc::new(RegexPriceExtractor),
            Arc::new(HostThrottle::new(config.host_min_interval())),
            Arc::clone(&cache),
            retry,
        );

        Ok(Self::new(
            LocationResolver::new(Arc::clone(&client)),
            PlaceFinder::new(
                Arc::clone(&client),
                Arc::clone(&cache),
                config.places_keyword.clone(),
            ),
            DetailResolver::new(client, cache),
            scraper,
        )
        .with_concurrency(config.scan_concurrency)
        .with_max_candidates(config.max_candidates))
    }

    /// Resolves `address`, finds nearby competitors, and builds one record
    /// per candidate in search order.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Location`] if the address cannot be resolved.
    /// - [`ScanError::Search`] if the nearby search fails.
    ///
    /// Detail and scrape failures for individual candidates are recorded on
    /// their rows and do not fail the scan.
    pub async fn scan(
        &self,
        address: &str,
        radius_miles: f64,
    ) -> Result<Vec<CompetitorRecord>, ScanError> {
        let origin = self
            .locator
            .resolve(address)
            .await
            .map_err(ScanError::Location)?;

        let mut candidates = self
            .finder
            .find(origin, radius_miles)
            .await
            .map_err(ScanError::Search)?;
        candidates.truncate(self.max_candidates);

        tracing::info!(
            %origin,
            radius_miles,
            candidates = candidates.len(),
            concurrency = self.concurrency,
            "scanning competitors"
        );

        let records: Vec<CompetitorRecord> = stream::iter(candidates)
            .map(|candidate| self.build_record(origin, candidate))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = records.iter().filter(|r| r.error.is_some()).count();
        let priced = records.iter().filter(|r| r.price.is_some()).count();
        tracing::info!(
            total = records.len(),
            priced,
            failed,
            "competitor scan complete"
        );

        Ok(records)
    }

    async fn build_record(&self, origin: Coordinate, candidate: PlaceCandidate) -> CompetitorRecord {
        let distance = candidate
            .location
            .map(|location| haversine_miles(origin, location));
        let mut record = CompetitorRecord::from_candidate(&candidate, distance);

        let detail = match self.details.resolve(&candidate.place_id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(
                    place_id = %candidate.place_id,
                    error = %e,
                    "place details lookup failed"
                );
                record.error = Some(e.to_string());
                return record;
            }
        };

        let Some(website) = detail.and_then(|d| d.website) else {
            tracing::debug!(place_id = %candidate.place_id, "no website listed");
            return record;
        };

        match self.scraper.scrape(&website).await {
            Ok(scraped) => {
                record.price = scraped.price;
                record.unit = scraped.unit;
                record.source = DataSource::WebsiteScrape;
            }
            Err(e) => {
                tracing::warn!(
                    place_id = %candidate.place_id,
                    url = %website,
                    error = %e,
                    "competitor scrape failed"
                );
                record.error = Some(e.to_string());
            }
        }
        record.website = Some(website);
        record
    }
}

