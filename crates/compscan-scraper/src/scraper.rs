//! Cached, throttled, retried page scrape with heuristic extraction.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use compscan_core::{CachedValue, RetryPolicy, ScrapeResult, SharedCache};

use crate::browser::PageFetcher;
use crate::error::ScrapeError;
use crate::extract::PriceExtractor;
use crate::throttle::HostThrottle;

/// Advertised rates move slowly; half a day keeps rescans cheap.
const SCRAPE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

pub struct PageScraper {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn PriceExtractor>,
    throttle: Arc<HostThrottle>,
    cache: SharedCache,
    retry: RetryPolicy,
}

impl PageScraper {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn PriceExtractor>,
        throttle: Arc<HostThrottle>,
        cache: SharedCache,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            throttle,
            cache,
            retry,
        }
    }

    /// Fetches `url` and extracts a price and unit size.
    ///
    /// Every attempt, including retries, holds the host throttle for the
    /// duration of the fetch, so one host never sees overlapping fetches.
    /// A URL whose host cannot be parsed is fetched without throttling.
    ///
    /// # Errors
    ///
    /// Returns the last [`ScrapeError`] once the retry policy is exhausted.
    pub async fn scrape(&self, url: &str) -> Result<ScrapeResult, ScrapeError> {
        let key = format!("scrape:{url}");
        if let Some(CachedValue::Scrape(hit)) = self.cache.get(&key) {
            tracing::debug!(url, "scrape cache hit");
            return Ok(hit);
        }

        let host = host_of(url);
        if host.is_none() {
            tracing::debug!(url, "could not parse host; skipping throttle");
        }

        let fetcher = &self.fetcher;
        let throttle = &self.throttle;
        let host = host.as_deref();
        let html = self
            .retry
            .run("page scrape", || async move {
                let _permit = match host {
                    Some(host) => Some(throttle.wait_for_host(host).await),
                    None => None,
                };
                fetcher.fetch_html(url).await
            })
            .await?;

        let extraction = self.extractor.extract(&html);
        tracing::info!(
            url,
            price = ?extraction.price,
            unit = ?extraction.unit,
            "scraped competitor page"
        );

        let result = ScrapeResult {
            price: extraction.price,
            unit: extraction.unit,
            source_url: url.to_owned(),
            captured_at: Utc::now(),
        };
        self.cache.set(key, CachedValue::Scrape(result.clone()), SCRAPE_TTL);
        Ok(result)
    }
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}
