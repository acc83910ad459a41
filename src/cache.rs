//! The main cache interface.
//!
//! This module provides the primary `Cache` type that users interact with.
//! It wraps the internal storage and provides a clean, thread-safe API.

use bytes::Bytes;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::stats::{CacheStats, StatsSnapshot};
use crate::storage::Db;

/// A thread-safe, memory-bounded in-memory cache with TTL expiration and
/// LRU eviction.
///
/// # Features
/// - **Thread-safe**: Can be safely shared across threads by cloning.
/// - **Byte-bounded**: Tracks the total payload bytes it references and can
///   shrink back under a budget, on demand or on a background timer.
/// - **TTL support**: Entries expire lazily at read time.
/// - **Statistics**: Track hits, misses, evictions, and more.
///
/// # Example
/// ```
/// use membound::{Cache, CacheConfig};
/// use std::time::Duration;
///
/// let cache = Cache::new(CacheConfig::default());
///
/// cache.set("user:123", "Alice");
/// if let Some(value) = cache.get("user:123") {
///     println!("Found: {:?}", value);
/// }
///
/// // With explicit TTL
/// cache.set_with_ttl("session:abc", "data", Duration::from_secs(60));
///
/// // Shrink the cache under a byte budget, evicting LRU entries
/// cache.shrink_to(1024);
/// assert!(cache.bytes_referenced() <= 1024);
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    /// Internal storage.
    db: Arc<Db>,
}

impl Cache {
    /// Create a new cache with the given configuration and a real-time
    /// clock.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// ```
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new cache with an injected time source.
    ///
    /// Intended for tests: a [`ManualClock`](crate::ManualClock) makes TTL
    /// expiration deterministic.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig, Clock, ManualClock};
    /// use std::sync::Arc;
    /// use std::time::{Duration, Instant};
    ///
    /// let clock = Arc::new(ManualClock::new(Instant::now()));
    /// let cache = Cache::with_clock(CacheConfig::default(), clock.clone() as Arc<dyn Clock>);
    ///
    /// cache.set_with_ttl("key", "value", Duration::from_secs(10));
    /// clock.advance(Duration::from_secs(11));
    /// assert!(cache.get("key").is_none());
    /// ```
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            db: Arc::new(Db::new(config, clock)),
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired; the two are
    /// indistinguishable from the outside. A hit marks the key most
    /// recently used; an expired entry found here is purged on the spot.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set("key", "value");
    ///
    /// match cache.get("key") {
    ///     Some(value) => println!("Found: {:?}", value),
    ///     None => println!("Not found"),
    /// }
    /// ```
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.db.get(key)
    }

    /// Set a value in the cache.
    ///
    /// If a `default_ttl` is configured, the entry expires that far from
    /// now; otherwise it does not expire. Overwriting an existing key
    /// refreshes its recency and adjusts the tracked byte total by the size
    /// delta.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set("string_key", "string value");
    /// cache.set("bytes_key", vec![1, 2, 3, 4]);
    /// assert_eq!(cache.bytes_referenced(), 16);
    /// ```
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.db.set(key, value);
    }

    /// Set a value that expires `ttl` from now.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    /// use std::time::Duration;
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set_with_ttl("session", "data", Duration::from_secs(3600));
    /// ```
    pub fn set_with_ttl(&self, key: impl Into<String>, value: impl Into<Bytes>, ttl: Duration) {
        self.db.set_with_ttl(key, value, ttl);
    }

    /// Set a value with an absolute expiration deadline.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    /// use std::time::{Duration, Instant};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set_with_expiration("key", "value", Instant::now() + Duration::from_secs(60));
    /// assert!(cache.get("key").is_some());
    /// ```
    pub fn set_with_expiration(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        expires_at: Instant,
    ) {
        self.db.set_with_expiration(key, value, expires_at);
    }

    /// Delete a key from the cache.
    ///
    /// Returns `true` if the key existed and was removed.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set("key", "value");
    /// assert!(cache.delete("key"));
    /// assert!(!cache.delete("key")); // Already deleted
    /// ```
    pub fn delete(&self, key: &str) -> bool {
        self.db.delete(key)
    }

    /// Check if a key exists in the cache.
    ///
    /// Returns `false` if the key doesn't exist or has expired.
    /// Note: this does NOT touch the key's recency.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// assert!(!cache.contains("key"));
    /// cache.set("key", "value");
    /// assert!(cache.contains("key"));
    /// ```
    pub fn contains(&self, key: &str) -> bool {
        self.db.contains(key)
    }

    /// Get the number of entries in the cache.
    ///
    /// Note: this may include expired entries that haven't been discovered
    /// by lazy expiration or a cleanup sweep yet.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Remove all entries from the cache.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set("key1", "value1");
    /// cache.clear();
    /// assert!(cache.is_empty());
    /// assert_eq!(cache.bytes_referenced(), 0);
    /// ```
    pub fn clear(&self) {
        self.db.clear();
    }

    /// The total payload bytes currently referenced by the cache.
    ///
    /// This is a lock-protected snapshot equal to the sum of payload
    /// lengths over all live entries.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set("key", vec![0u8; 128]);
    /// assert_eq!(cache.bytes_referenced(), 128);
    /// ```
    pub fn bytes_referenced(&self) -> u64 {
        self.db.bytes_referenced()
    }

    /// Synchronously evict least-recently-used entries until the byte total
    /// is at or below `target_bytes` or the cache is empty.
    ///
    /// Returns the number of entries evicted. This is the same pass the
    /// background eviction task runs.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set("a", vec![0u8; 16]);
    /// cache.set("b", vec![0u8; 16]);
    ///
    /// let evicted = cache.shrink_to(16);
    /// assert_eq!(evicted, 1);
    /// assert_eq!(cache.bytes_referenced(), 16);
    /// ```
    pub fn shrink_to(&self, target_bytes: u64) -> usize {
        self.db.shrink_to(target_bytes)
    }

    /// Start a background task that shrinks the cache to `memory_limit`
    /// bytes every `check_interval`.
    ///
    /// Returns `Err(CacheError::EvictionRunning)` if a task is already
    /// active; at most one runs at a time. Stop it with
    /// [`stop_eviction`](Cache::stop_eviction).
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    /// use std::time::Duration;
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.start_eviction(1024, Duration::from_millis(100)).unwrap();
    /// assert!(cache.start_eviction(1024, Duration::from_millis(100)).is_err());
    /// cache.stop_eviction();
    /// ```
    pub fn start_eviction(&self, memory_limit: u64, check_interval: Duration) -> CacheResult<()> {
        Arc::clone(&self.db).start_eviction(memory_limit, check_interval)
    }

    /// Stop the background eviction task.
    ///
    /// Idempotent; a no-op if none is running. After this returns, no
    /// further shrink passes begin.
    pub fn stop_eviction(&self) {
        self.db.stop_eviction();
    }

    /// Whether a background eviction task is currently active.
    pub fn eviction_running(&self) -> bool {
        self.db.eviction_running()
    }

    /// Manually sweep out all expired entries.
    ///
    /// Returns the number of entries removed. Lazy expiration already
    /// purges entries on access; this catches entries nobody reads.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig, Clock, ManualClock};
    /// use std::sync::Arc;
    /// use std::time::{Duration, Instant};
    ///
    /// let clock = Arc::new(ManualClock::new(Instant::now()));
    /// let cache = Cache::with_clock(CacheConfig::default(), clock.clone() as Arc<dyn Clock>);
    ///
    /// cache.set_with_ttl("key", "value", Duration::from_secs(1));
    /// clock.advance(Duration::from_secs(2));
    /// assert_eq!(cache.cleanup_expired(), 1);
    /// ```
    pub fn cleanup_expired(&self) -> usize {
        self.db.cleanup_expired()
    }

    /// Get a snapshot of the cache statistics.
    ///
    /// Counters are point-in-time; `entries` and `bytes_referenced` are
    /// read under the cache lock and exact.
    ///
    /// # Example
    /// ```
    /// use membound::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.set("key", "value");
    /// let _ = cache.get("key");        // Hit
    /// let _ = cache.get("missing");    // Miss
    ///
    /// let stats = cache.stats();
    /// assert_eq!(stats.hits, 1);
    /// assert_eq!(stats.misses, 1);
    /// ```
    pub fn stats(&self) -> StatsSnapshot {
        self.db.snapshot()
    }

    /// Get a reference to the internal statistics counters.
    ///
    /// This is useful for integrating with external metrics systems.
    pub fn stats_ref(&self) -> Arc<CacheStats> {
        self.db.stats()
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        self.db.config()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
