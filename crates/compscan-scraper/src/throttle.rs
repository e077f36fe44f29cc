//! Per-host politeness spacing for automated requests.
//!
//! Each host gets its own async mutex holding the time its last request
//! finished. [`HostThrottle::wait_for_host`] locks that mutex, sleeps out the
//! remaining gap and hands back a [`HostPermit`] that keeps the lock for the
//! whole request. Requests to one host therefore never overlap and start at
//! least `min_interval` after the previous one ended, while other hosts
//! proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

/// Default gap between two requests to the same host.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

type HostSlot = Arc<tokio::sync::Mutex<Option<Instant>>>;

#[derive(Debug)]
pub struct HostThrottle {
    min_interval: Duration,
    hosts: Mutex<HashMap<String, HostSlot>>,
}

/// Exclusive access to one host. Dropping it records the request end time.
#[derive(Debug)]
#[must_use = "the host is released as soon as the permit is dropped"]
pub struct HostPermit {
    last_finished: OwnedMutexGuard<Option<Instant>>,
}

impl Drop for HostPermit {
    fn drop(&mut self) {
        *self.last_finished = Some(Instant::now());
    }
}

impl Default for HostThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl HostThrottle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until no other request to `host` is in flight and at least
    /// `min_interval` has passed since the last one finished.
    ///
    /// Hold the returned permit until the request completes.
    pub async fn wait_for_host(&self, host: &str) -> HostPermit {
        let slot = {
            let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(hosts.entry(host.to_ascii_lowercase()).or_default())
        };

        let last_finished = slot.lock_owned().await;
        if let Some(previous) = *last_finished {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(
                    host,
                    wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    "throttling request to host"
                );
                tokio::time::sleep(wait).await;
            }
        }
        HostPermit { last_finished }
    }

    /// Number of hosts seen so far.
    pub fn tracked_hosts(&self) -> usize {
        self.hosts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
