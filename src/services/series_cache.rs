use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::external::provider::OutputSize;
use crate::models::RawDailySeries;

#[derive(Debug, Clone)]
struct CachedSeries {
    fetched_at: DateTime<Utc>,
    payload: Arc<RawDailySeries>,
}

/// Thread-safe TTL cache of raw daily payloads keyed by symbol and output
/// size. Only the untrusted payload is shared; every request ingests its own
/// [`crate::models::TimeSeries`] from it.
#[derive(Clone)]
pub struct SeriesCache {
    entries: Arc<DashMap<(String, OutputSize), CachedSeries>>,
    ttl: Duration,
}

impl SeriesCache {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::weeks(52 * 100)),
        }
    }

    /// Cached payload for `symbol`, if present and younger than the TTL.
    pub fn get(&self, symbol: &str, output_size: OutputSize) -> Option<Arc<RawDailySeries>> {
        self.get_at(symbol, output_size, Utc::now())
    }

    fn get_at(
        &self,
        symbol: &str,
        output_size: OutputSize,
        now: DateTime<Utc>,
    ) -> Option<Arc<RawDailySeries>> {
        let key = (symbol.to_string(), output_size);
        if let Some(entry) = self.entries.get(&key) {
            if self.is_fresh(entry.value(), now) {
                debug!("Series cache hit for {} ({})", symbol, output_size.as_str());
                return Some(entry.payload.clone());
            }
            // Release the read lock before removing
            drop(entry);
            self.entries.remove(&key);
        }
        None
    }

    pub fn insert(
        &self,
        symbol: &str,
        output_size: OutputSize,
        payload: RawDailySeries,
    ) -> Arc<RawDailySeries> {
        let payload = Arc::new(payload);
        self.entries.insert(
            (symbol.to_string(), output_size),
            CachedSeries {
                fetched_at: Utc::now(),
                payload: payload.clone(),
            },
        );
        payload
    }

    /// Remove every entry older than the TTL and return how many went.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    fn cleanup_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, cached| self.is_fresh(cached, now));
        before.saturating_sub(self.entries.len())
    }

    /// Sweep expired entries every `every` on a background task, so symbols
    /// that are never requested again do not stay in memory.
    pub fn spawn_cleanup(&self, every: std::time::Duration) -> JoinHandle<()> {
        let cache = self.clone();
        let every = every.max(std::time::Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.cleanup_expired();
                if removed > 0 {
                    info!("Removed {} expired series cache entries", removed);
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, cached: &CachedSeries, now: DateTime<Utc>) -> bool {
        cached
            .fetched_at
            .checked_add_signed(self.ttl)
            .map_or(true, |expiry| now < expiry)
    }
}
