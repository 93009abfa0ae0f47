//! TTL cache in front of a slower provider.
//! Species stats are stored as `(Instant, StatsRecord)` in a `HashMap` behind an `RwLock`;
//! only successful lookups are cached.
use crate::errors::LookupResult;
use crate::provider::{lookup_key, DataProvider};
use schema::{EncounterArea, StatsRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub struct CachingProvider<P> {
    inner: P,
    ttl: Duration,
    stats: RwLock<HashMap<String, (Instant, StatsRecord)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: DataProvider> CachingProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            stats: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Counters for diagnostics: (hits, misses).
    pub fn cache_stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    fn cached(&self, key: &str) -> Option<StatsRecord> {
        // Fast path: read lock
        {
            let map = self.stats.read().unwrap_or_else(|e| e.into_inner());
            match map.get(key) {
                Some((stored, value)) if stored.elapsed() < self.ttl => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(value.clone());
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }
        // Entry expired: take the write lock only to evict it
        let mut map = self.stats.write().unwrap_or_else(|e| e.into_inner());
        if let Some((stored, _)) = map.get(key) {
            if stored.elapsed() >= self.ttl {
                map.remove(key);
                debug!(key, "stats cache entry expired");
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn insert(&self, key: String, value: StatsRecord) {
        self.stats
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, (Instant::now(), value));
    }
}

impl<P: DataProvider> DataProvider for CachingProvider<P> {
    fn stats(&self, id_or_name: &str) -> LookupResult<StatsRecord> {
        let key = lookup_key(id_or_name);
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }
        let fresh = self.inner.stats(&key)?;
        self.insert(key, fresh.clone());
        Ok(fresh)
    }

    fn move_power(&self, move_name: &str) -> LookupResult<Option<u16>> {
        self.inner.move_power(move_name)
    }

    fn encounter_area(&self, area: &str) -> LookupResult<EncounterArea> {
        self.inner.encounter_area(area)
    }

    fn roster(&self) -> LookupResult<Vec<String>> {
        self.inner.roster()
    }
}
