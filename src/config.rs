//! Configuration for the cache.
//!
//! This module provides a builder pattern for configuring cache behavior:
//! the memory budget, the default TTL, and the background eviction cadence.

use std::time::Duration;

/// Configuration for creating a new cache instance.
///
/// Use the builder pattern to construct configuration:
///
/// ```
/// use membound::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .max_bytes(64 * 1024 * 1024)
///     .default_ttl(Duration::from_secs(300))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Memory budget in payload bytes. The background eviction task shrinks
    /// the cache back under this budget. `None` means unbounded.
    pub(crate) max_bytes: Option<u64>,

    /// Default TTL for entries set without an explicit expiration.
    /// `None` means entries don't expire by default.
    pub(crate) default_ttl: Option<Duration>,

    /// How often the background eviction task checks the byte budget.
    pub(crate) eviction_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: None,
            default_ttl: None,
            eviction_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the memory budget in payload bytes.
    ///
    /// The background eviction task (when started) removes least recently
    /// used entries until the tracked byte total is at or below this budget.
    ///
    /// # Arguments
    /// * `bytes` - Budget in bytes. Use 0 for unbounded (not recommended).
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = if bytes == 0 { None } else { Some(bytes) };
        self
    }

    /// Set the default TTL for entries.
    ///
    /// Entries set without an explicit TTL or expiration will use this value.
    /// Set to `Duration::ZERO` to disable the default TTL.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = if ttl.is_zero() { None } else { Some(ttl) };
        self
    }

    /// Set how often the background eviction task checks the byte budget.
    ///
    /// A zero interval is ignored and the default (60 seconds) is kept.
    pub fn eviction_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.eviction_interval = interval;
        }
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Self {
        self
    }

    /// Get the memory budget, if set.
    pub fn get_max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    /// Get the default TTL, if set.
    pub fn get_default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Get the background eviction check interval.
    pub fn get_eviction_interval(&self) -> Duration {
        self.eviction_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert!(config.max_bytes.is_none());
        assert!(config.default_ttl.is_none());
        assert_eq!(config.eviction_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_pattern() {
        let config = CacheConfig::new()
            .max_bytes(4096)
            .default_ttl(Duration::from_secs(60))
            .eviction_interval(Duration::from_secs(5))
            .build();

        assert_eq!(config.max_bytes, Some(4096));
        assert_eq!(config.default_ttl, Some(Duration::from_secs(60)));
        assert_eq!(config.eviction_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_budget_means_unbounded() {
        let config = CacheConfig::new().max_bytes(0).build();
        assert!(config.max_bytes.is_none());
    }

    #[test]
    fn test_zero_ttl_means_no_default() {
        let config = CacheConfig::new().default_ttl(Duration::ZERO).build();
        assert!(config.default_ttl.is_none());
    }

    #[test]
    fn test_zero_interval_keeps_default() {
        let config = CacheConfig::new().eviction_interval(Duration::ZERO).build();
        assert_eq!(config.eviction_interval, Duration::from_secs(60));
    }
}
