//! Statistics and metrics for the cache.
//!
//! This module provides atomic counters for tracking cache operations,
//! enabling observability without impacting performance. Entry count and
//! the byte total are not counters here: they must agree exactly with the
//! locked cache state, so snapshots read them under the lock instead.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for cache operations.
///
/// All counters are atomic and can be safely accessed from multiple threads.
/// Use `Cache::stats()` to get a snapshot of the current statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of successful get operations (key found, not expired).
    hits: AtomicU64,

    /// Number of failed get operations (key not found or expired).
    misses: AtomicU64,

    /// Number of entries evicted by shrink passes (byte budget).
    evictions: AtomicU64,

    /// Number of entries removed due to TTL expiration.
    expirations: AtomicU64,

    /// Total number of set operations performed.
    sets: AtomicU64,

    /// Total number of delete operations performed.
    deletes: AtomicU64,
}

impl CacheStats {
    /// Create a new stats instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction (byte budget).
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an expiration (TTL).
    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a set operation.
    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delete operation.
    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    // Getters for reading statistics

    /// Get the number of cache hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the number of cache misses.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the number of evictions.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Get the number of expirations.
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Get the total number of set operations.
    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    /// Get the total number of delete operations.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Calculate the hit rate as a percentage (0.0 to 100.0).
    /// Returns 0.0 if no operations have been performed.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let misses = self.misses();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    /// Create a snapshot of the current statistics.
    ///
    /// `entries` and `bytes_referenced` come from the locked cache state so
    /// they are exact, not racy counter approximations.
    pub fn snapshot(&self, entries: u64, bytes_referenced: u64) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            evictions: self.evictions(),
            expirations: self.expirations(),
            sets: self.sets(),
            deletes: self.deletes(),
            entries,
            bytes_referenced,
            hit_rate: self.hit_rate(),
        }
    }
}

/// A point-in-time snapshot of cache statistics.
///
/// Unlike `CacheStats`, this struct contains plain values (not atomics)
/// and can be easily serialized or logged.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub sets: u64,
    pub deletes: u64,
    pub entries: u64,
    pub bytes_referenced: u64,
    pub hit_rate: f64,
}
