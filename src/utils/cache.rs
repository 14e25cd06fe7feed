//! In-Memory TTL Cache
//!
//! Thread-safe cache for provider payloads, keyed by normalized
//! identifier. DashMap gives concurrent access without a global lock.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::models::RawProjectPayload;
use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

/// Cached value with its insertion time
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    pub fn remaining_ttl(&self) -> Duration {
        self.ttl.saturating_sub(self.created_at.elapsed())
    }
}

/// TTL cache with hit/miss counters
#[derive(Clone)]
pub struct TtlCache<V: Clone> {
    store: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

/// Provider payload cache
pub type PayloadCache = TtlCache<RawProjectPayload>;

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn normalize_key(key: &str) -> String {
        key.trim().to_lowercase()
    }

    /// Fresh value for `key`; expired entries are evicted on read
    pub fn get(&self, key: &str) -> Option<V> {
        let key = Self::normalize_key(key);

        if let Some(entry) = self.store.get(&key) {
            if entry.is_expired() {
                drop(entry); // release the shard read lock before removing
                self.store.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS (expired): {}", key);
                None
            } else {
                self.hits.fetch_add(1, Ordering::Relaxed);
                info!(
                    "✅ CACHE HIT: {} (TTL: {}s remaining)",
                    key,
                    entry.remaining_ttl().as_secs()
                );
                Some(entry.value.clone())
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", key);
            None
        }
    }

    pub fn set(&self, key: &str, value: V) {
        let key = Self::normalize_key(key);
        let entry = CacheEntry {
            value,
            created_at: Instant::now(),
            ttl: self.ttl,
        };
        self.store.insert(key.clone(), entry);
        debug!("💾 CACHE SET: {} (TTL: {}s)", key, self.ttl.as_secs());
    }

    pub fn invalidate(&self, key: &str) {
        self.store.remove(&Self::normalize_key(key));
    }

    /// Drop every expired entry, returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.store.len());
        if removed > 0 {
            info!("🧹 CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl.as_secs(),
        }
    }

    pub fn clear(&self) {
        self.store.clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Percent
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_and_miss() {
        let cache = PayloadCache::default();
        assert!(cache.get("bitcoin").is_none());
        cache.set("Bitcoin", json!({"coin_id": "bitcoin"}));
        assert_eq!(cache.get("BITCOIN"), Some(json!({"coin_id": "bitcoin"})));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_expiry() {
        let cache: TtlCache<u32> = TtlCache::with_ttl(Duration::from_millis(0));
        cache.set("k", 7);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("k").is_none());
        cache.set("k", 7);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_invalidate() {
        let cache: TtlCache<u32> = TtlCache::default();
        cache.set("k", 1);
        cache.invalidate("K");
        assert!(cache.get("k").is_none());
    }
}
