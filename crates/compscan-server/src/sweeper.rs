use std::time::Duration;

use compscan_core::SharedCache;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// How often expired cache entries are dropped in bulk.
pub const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Spawns a task that calls [`compscan_core::TtlCache::purge_expired`] every
/// `interval`. The first sweep runs one full interval after start.
pub fn spawn_cache_sweeper(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired();
            tracing::debug!(purged, remaining = cache.len(), "cache sweep complete");
        }
    })
}
