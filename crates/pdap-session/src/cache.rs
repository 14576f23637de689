//! Time-boxed response cache for GET results.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::CacheConfig;

/// Entry stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Resource identity the entry was stored under.
    pub key: String,

    /// Cached response body.
    pub data: Value,

    /// When this entry was stored, in epoch milliseconds.
    pub timestamp: i64,
}

/// Keyed store of prior GET results for one resource family.
///
/// Entries never expire on their own. Readers decide freshness by passing
/// a TTL to [`ResponseCache::is_valid`] or [`ResponseCache::get_fresh`].
#[derive(Debug)]
pub struct ResponseCache {
    name: &'static str,
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Create an empty cache. `name` only appears in logs.
    pub fn new(name: &'static str, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Get the entry stored under `key`, regardless of age.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Store `data` under `key`, stamped with the current time.
    pub fn set(&self, key: impl Into<String>, data: Value) {
        let key = key.into();
        let entry = CacheEntry {
            key: key.clone(),
            data,
            timestamp: self.clock.now_ms(),
        };
        let mut entries = self.entries.write();
        entries.insert(key, entry);
        trace!(cache = self.name, size = entries.len(), "Response cached");
    }

    /// Whether `entry` is younger than `ttl`. The boundary itself is stale.
    pub fn is_valid(&self, entry: &CacheEntry, ttl: Duration) -> bool {
        let age = self.clock.now_ms() - entry.timestamp;
        age < ttl.as_millis() as i64
    }

    /// Get the cached data for `key` if it is still within `ttl`.
    pub fn get_fresh(&self, key: &str, ttl: Duration) -> Option<Value> {
        match self.get(key) {
            Some(entry) if self.is_valid(&entry, ttl) => {
                debug!(cache = self.name, key = %key, "Cache hit");
                Some(entry.data)
            }
            Some(_) => {
                debug!(cache = self.name, key = %key, "Cache entry stale");
                None
            }
            None => {
                debug!(cache = self.name, key = %key, "Cache miss");
                None
            }
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        debug!(cache = self.name, dropped, "Cache cleared");
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// All response caches the client keeps, one per resource family.
#[derive(Debug)]
pub struct CacheState {
    /// Data sources by id.
    pub data_sources: ResponseCache,

    /// Search results by canonical query.
    pub search: ResponseCache,

    config: CacheConfig,
}

impl CacheState {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            data_sources: ResponseCache::new("data_sources", clock.clone()),
            search: ResponseCache::new("search", clock),
            config,
        }
    }

    /// TTL policy used by the resource clients.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Clear every cache.
    pub fn clear_all(&self) {
        self.data_sources.clear();
        self.search.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn cache_at(start_ms: i64) -> (Arc<ManualClock>, ResponseCache) {
        let clock = Arc::new(ManualClock::new(start_ms));
        let cache = ResponseCache::new("test", clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_set_and_get() {
        let (_, cache) = cache_at(5_000);
        cache.set("42", json!({"name": "Arrest records"}));

        let entry = cache.get("42").unwrap();
        assert_eq!(entry.key, "42");
        assert_eq!(entry.data["name"], "Arrest records");
        assert_eq!(entry.timestamp, 5_000);
        assert!(cache.get("43").is_none());
    }

    #[test]
    fn test_validity_is_strict_at_boundary() {
        let (clock, cache) = cache_at(0);
        cache.set("a", json!(1));
        let entry = cache.get("a").unwrap();
        let ttl = Duration::from_millis(100);

        clock.set(99);
        assert!(cache.is_valid(&entry, ttl));

        clock.set(100);
        assert!(!cache.is_valid(&entry, ttl));

        clock.set(250);
        assert!(!cache.is_valid(&entry, ttl));
    }

    #[test]
    fn test_get_fresh_respects_ttl_per_call() {
        let (clock, cache) = cache_at(0);
        cache.set("a", json!("value"));
        clock.advance(Duration::from_secs(150));

        // Stale under the 2 minute default, fresh under 3 minutes
        assert!(cache.get_fresh("a", Duration::from_secs(120)).is_none());
        assert_eq!(
            cache.get_fresh("a", Duration::from_secs(180)),
            Some(json!("value"))
        );
    }

    #[test]
    fn test_stale_entry_still_readable_with_get() {
        let (clock, cache) = cache_at(0);
        cache.set("a", json!(1));
        clock.advance(Duration::from_secs(3600));
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn test_set_overwrites_and_restamps() {
        let (clock, cache) = cache_at(0);
        cache.set("a", json!(1));
        clock.set(500);
        cache.set("a", json!(2));

        let entry = cache.get("a").unwrap();
        assert_eq!(entry.data, json!(2));
        assert_eq!(entry.timestamp, 500);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let (_, cache) = cache_at(0);
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_state_clear_all() {
        let clock = Arc::new(ManualClock::new(0));
        let state = CacheState::new(CacheConfig::default(), clock);
        state.data_sources.set("1", json!({}));
        state.search.set("q", json!([]));

        state.clear_all();
        assert!(state.data_sources.is_empty());
        assert!(state.search.is_empty());
    }
}
