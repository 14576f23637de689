//! Configuration for the response cache.

use std::time::Duration;

/// Default freshness window for cached GET results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60);

/// Freshness window for single data source lookups.
pub const DEFAULT_DATA_SOURCE_TTL: Duration = Duration::from_secs(3 * 60);

/// TTL policy for the response caches.
///
/// The caches themselves carry no TTL; each read site passes the window
/// it wants, and these are the values the resource clients use.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for reads that have no specific policy (search results).
    pub default_ttl: Duration,

    /// TTL for data source lookups by id.
    pub data_source_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            data_source_ttl: DEFAULT_DATA_SOURCE_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the TTL for data source lookups.
    pub fn with_data_source_ttl(mut self, ttl: Duration) -> Self {
        self.data_source_ttl = ttl;
        self
    }
}
