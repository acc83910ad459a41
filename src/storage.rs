//! Internal storage implementation for the cache.
//!
//! One `Mutex` protects the whole mutable aggregate: the key map, the
//! recency list, the byte counter, and the background eviction marker. Every
//! public operation takes the lock for its duration, so the three structures
//! are always observed and mutated together and operations linearize in lock
//! order. The background eviction task re-checks its stop flag under that
//! same lock before each shrink pass, which is what makes `stop_eviction`'s
//! "no pass begins after stop returns" guarantee hold.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::entry::Entry;
use crate::error::{CacheError, CacheResult};
use crate::lru::RecencyList;
use crate::stats::{CacheStats, StatsSnapshot};

/// The mutable aggregate behind the lock.
#[derive(Debug, Default)]
struct State {
    /// Key map, owning the entries.
    entries: HashMap<String, Entry>,

    /// Recency order over the same keys. Front = MRU, back = LRU.
    lru: RecencyList,

    /// Running sum of payload lengths over all live entries.
    bytes_referenced: u64,

    /// Stop flag of the active background eviction task, if any.
    eviction: Option<Arc<AtomicBool>>,
}

impl State {
    /// Remove a key from both the map and the list, fixing the byte total.
    fn remove_entry(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(entry.node());
        self.bytes_referenced = self.bytes_referenced.saturating_sub(entry.len() as u64);
        Some(entry)
    }
}

/// Thread-safe storage core.
///
/// This is the internal implementation; users should use `Cache` instead.
#[derive(Debug)]
pub struct Db {
    /// All mutable cache state, behind a single exclusive lock.
    state: Mutex<State>,

    /// Time source for TTL decisions.
    clock: Arc<dyn Clock>,

    /// Configuration for this cache instance.
    config: CacheConfig,

    /// Statistics for cache operations.
    stats: Arc<CacheStats>,
}

impl Db {
    /// Create a new database with the given configuration and clock.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
            config,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Acquire the lock, returning `None` if poisoned.
    fn lock(&self) -> Option<MutexGuard<'_, State>> {
        self.state.lock().ok()
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired. An expired
    /// entry found here is purged on the spot (lazy expiration); a live one
    /// is moved to the front of the recency list.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut guard = self.lock()?;
        let now = self.clock.now();

        let found = guard
            .entries
            .get(key)
            .map(|entry| (entry.node(), entry.read(), entry.is_expired_at(now)));
        let Some((node, value, expired)) = found else {
            drop(guard);
            self.stats.record_miss();
            return None;
        };

        if expired {
            guard.remove_entry(key);
            drop(guard);
            self.stats.record_miss();
            self.stats.record_expiration();
            return None;
        }

        guard.lru.move_to_front(node);
        drop(guard);
        self.stats.record_hit();
        Some(value)
    }

    /// Set a value using the configured default TTL (or no expiration).
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let expires_at = self.config.default_ttl.map(|ttl| self.clock.now() + ttl);
        self.set_internal(key.into(), value.into(), expires_at);
    }

    /// Set a value that expires `ttl` from now.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: impl Into<Bytes>, ttl: Duration) {
        let expires_at = Some(self.clock.now() + ttl);
        self.set_internal(key.into(), value.into(), expires_at);
    }

    /// Set a value with an absolute expiration deadline.
    pub fn set_with_expiration(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        expires_at: Instant,
    ) {
        self.set_internal(key.into(), value.into(), Some(expires_at));
    }

    /// Upsert. Existing keys are updated in place, moved to the recency
    /// front, and the byte total is adjusted by the size delta. New keys get
    /// a fresh list node and add their full length.
    fn set_internal(&self, key: String, value: Bytes, expires_at: Option<Instant>) {
        let new_len = value.len() as u64;

        let Some(mut guard) = self.lock() else {
            return;
        };
        let state = &mut *guard;

        match state.entries.get_mut(&key) {
            Some(entry) => {
                let old_len = entry.len() as u64;
                entry.update(value, expires_at);
                state.lru.move_to_front(entry.node());
                state.bytes_referenced =
                    state.bytes_referenced.saturating_sub(old_len) + new_len;
            }
            None => {
                let node = state.lru.push_front(key.clone());
                state.entries.insert(key, Entry::new(value, expires_at, node));
                state.bytes_referenced += new_len;
            }
        }

        drop(guard);
        self.stats.record_set();
    }

    /// Delete a key from the cache.
    ///
    /// Returns `true` if the key existed and was removed.
    pub fn delete(&self, key: &str) -> bool {
        let Some(mut guard) = self.lock() else {
            return false;
        };

        let existed = guard.remove_entry(key).is_some();
        drop(guard);
        if existed {
            self.stats.record_delete();
        }
        existed
    }

    /// Check if a key exists in the cache (and is not expired).
    ///
    /// Does not touch recency; an expired entry found here is still purged.
    pub fn contains(&self, key: &str) -> bool {
        let Some(mut guard) = self.lock() else {
            return false;
        };
        let now = self.clock.now();

        match guard.entries.get(key).map(|entry| entry.is_expired_at(now)) {
            Some(true) => {
                guard.remove_entry(key);
                drop(guard);
                self.stats.record_expiration();
                false
            }
            Some(false) => true,
            None => false,
        }
    }

    /// Get the number of entries in the cache.
    ///
    /// Note: this may include expired entries that haven't been discovered
    /// by lazy expiration or a cleanup sweep yet.
    pub fn len(&self) -> usize {
        match self.lock() {
            Some(guard) => guard.entries.len(),
            None => 0,
        }
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries from the cache.
    pub fn clear(&self) {
        if let Some(mut guard) = self.lock() {
            guard.entries.clear();
            guard.lru.clear();
            guard.bytes_referenced = 0;
        }
    }

    /// The tracked byte total: Σ payload length over all live entries.
    pub fn bytes_referenced(&self) -> u64 {
        match self.lock() {
            Some(guard) => guard.bytes_referenced,
            None => 0,
        }
    }

    /// Evict least-recently-used entries until the byte total is at or below
    /// `target_bytes` or the cache is empty. Returns the number evicted.
    pub fn shrink_to(&self, target_bytes: u64) -> usize {
        let Some(mut guard) = self.lock() else {
            return 0;
        };
        self.shrink_locked(&mut guard, target_bytes)
    }

    /// The shrink loop, shared by the manual path and the background task.
    fn shrink_locked(&self, state: &mut State, target_bytes: u64) -> usize {
        let mut evicted = 0;
        while state.bytes_referenced > target_bytes {
            let Some(key) = state.lru.pop_back() else {
                break;
            };
            if let Some(entry) = state.entries.remove(&key) {
                state.bytes_referenced =
                    state.bytes_referenced.saturating_sub(entry.len() as u64);
            }
            self.stats.record_eviction();
            evicted += 1;
        }
        evicted
    }

    /// Remove all expired entries in one sweep.
    ///
    /// Lazy expiration already purges entries on access; this is a manual,
    /// caller-invoked sweep for entries nobody reads.
    pub fn cleanup_expired(&self) -> usize {
        let Some(mut guard) = self.lock() else {
            return 0;
        };
        let now = self.clock.now();

        let expired: Vec<String> = guard
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            guard.remove_entry(key);
            self.stats.record_expiration();
        }

        expired.len()
    }

    /// Start the background eviction task.
    ///
    /// Every `check_interval` the task runs the same shrink pass as
    /// [`shrink_to`](Db::shrink_to) with `memory_limit` as the target.
    /// Returns `Err(CacheError::EvictionRunning)` if a task is already
    /// active; no second task is started.
    ///
    /// The task holds only a weak reference to this storage, so dropping the
    /// last cache handle ends it at its next tick.
    pub fn start_eviction(
        self: Arc<Self>,
        memory_limit: u64,
        check_interval: Duration,
    ) -> CacheResult<()> {
        let Some(mut guard) = self.lock() else {
            return Ok(());
        };

        if guard.eviction.is_some() {
            return Err(CacheError::EvictionRunning);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let handle = Self::spawn_eviction_thread(
            Arc::downgrade(&self),
            Arc::clone(&stop),
            memory_limit,
            check_interval,
        )?;

        guard.eviction = Some(stop);
        drop(guard);

        info!(
            memory_limit,
            interval_ms = check_interval.as_millis() as u64,
            thread = ?handle.thread().name(),
            "background eviction started"
        );
        Ok(())
    }

    fn spawn_eviction_thread(
        db: Weak<Db>,
        stop: Arc<AtomicBool>,
        memory_limit: u64,
        check_interval: Duration,
    ) -> CacheResult<thread::JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("membound-eviction".to_string())
            .spawn(move || {
                loop {
                    thread::sleep(check_interval);

                    let Some(db) = db.upgrade() else {
                        break;
                    };
                    let Some(mut guard) = db.lock() else {
                        break;
                    };
                    // The stop flag is flipped while holding this lock, so a
                    // pass that reaches here after stop_eviction returned
                    // always sees it and refuses.
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }

                    let evicted = db.shrink_locked(&mut guard, memory_limit);
                    let bytes = guard.bytes_referenced;
                    drop(guard);

                    if evicted > 0 {
                        info!(evicted, bytes, "eviction pass shrank cache");
                    } else {
                        debug!(bytes, "eviction pass: under budget");
                    }
                }
                debug!("eviction task exiting");
            })?;
        Ok(handle)
    }

    /// Stop the background eviction task. Idempotent; a no-op if none is
    /// running. After this returns, no further shrink passes begin (a pass
    /// already holding the lock completes first).
    pub fn stop_eviction(&self) {
        let Some(mut guard) = self.lock() else {
            return;
        };
        if let Some(stop) = guard.eviction.take() {
            stop.store(true, Ordering::Relaxed);
            drop(guard);
            info!("background eviction stopped");
        }
    }

    /// Whether a background eviction task is currently active.
    pub fn eviction_running(&self) -> bool {
        match self.lock() {
            Some(guard) => guard.eviction.is_some(),
            None => false,
        }
    }

    /// Get a reference to the statistics counters.
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// A snapshot of the statistics with lock-accurate entry and byte totals.
    pub fn snapshot(&self) -> StatsSnapshot {
        let (entries, bytes) = match self.lock() {
            Some(guard) => (guard.entries.len() as u64, guard.bytes_referenced),
            None => (0, 0),
        };
        self.stats.snapshot(entries, bytes)
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl Drop for Db {
    fn drop(&mut self) {
        // A live eviction thread exits at its next tick once its weak
        // reference fails to upgrade.
        if let Ok(state) = self.state.get_mut() {
            if let Some(stop) = state.eviction.take() {
                stop.store(true, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SystemClock};

    fn db() -> Arc<Db> {
        Arc::new(Db::new(CacheConfig::default(), Arc::new(SystemClock)))
    }

    fn db_with_clock(clock: Arc<ManualClock>) -> Arc<Db> {
        Arc::new(Db::new(CacheConfig::default(), clock))
    }

    #[test]
    fn test_basic_set_get() {
        let db = db();

        db.set("key1", "value1");
        assert_eq!(db.get("key1"), Some(Bytes::from("value1")));
    }

    #[test]
    fn test_get_nonexistent() {
        let db = db();
        assert!(db.get("nonexistent").is_none());
    }

    #[test]
    fn test_byte_accounting_on_insert() {
        let db = db();

        db.set("a", "12345");
        assert_eq!(db.bytes_referenced(), 5);

        db.set("b", "123");
        assert_eq!(db.bytes_referenced(), 8);
    }

    #[test]
    fn test_overwrite_adjusts_bytes_by_delta() {
        let db = db();

        db.set("key1", "short");
        assert_eq!(db.bytes_referenced(), 5);

        db.set("key1", "a much longer value");
        assert_eq!(db.get("key1"), Some(Bytes::from("a much longer value")));
        assert_eq!(db.bytes_referenced(), 19);
        assert_eq!(db.len(), 1);

        db.set("key1", "x");
        assert_eq!(db.bytes_referenced(), 1);
    }

    #[test]
    fn test_delete_frees_bytes() {
        let db = db();

        db.set("key1", "value1");
        assert!(db.contains("key1"));
        assert_eq!(db.bytes_referenced(), 6);

        assert!(db.delete("key1"));
        assert!(!db.contains("key1"));
        assert_eq!(db.bytes_referenced(), 0);
        assert!(!db.delete("key1"));
    }

    #[test]
    fn test_clear_resets_accounting() {
        let db = db();

        db.set("key1", "value1");
        db.set("key2", "value2");
        assert_eq!(db.len(), 2);

        db.clear();
        assert!(db.is_empty());
        assert_eq!(db.bytes_referenced(), 0);

        // The list must be reusable after clear.
        db.set("key3", "value3");
        assert_eq!(db.bytes_referenced(), 6);
    }

    #[test]
    fn test_lazy_expiration_purges_on_get() {
        let clock = Arc::new(ManualClock::new(Instant::now()));
        let db = db_with_clock(Arc::clone(&clock));

        db.set_with_ttl("key1", "value1", Duration::from_secs(10));
        assert_eq!(db.bytes_referenced(), 6);

        clock.advance(Duration::from_secs(11));

        assert!(db.get("key1").is_none());
        // The purge fixed the accounting, not just the lookup result.
        assert_eq!(db.bytes_referenced(), 0);
        assert_eq!(db.len(), 0);
        assert_eq!(db.stats().expirations(), 1);
    }

    #[test]
    fn test_expiration_boundary_is_inclusive() {
        let start = Instant::now();
        let clock = Arc::new(ManualClock::new(start));
        let db = db_with_clock(Arc::clone(&clock));

        db.set_with_expiration("key1", "v", start + Duration::from_secs(5));

        clock.set(start + Duration::from_secs(5) - Duration::from_nanos(1));
        assert!(db.get("key1").is_some());

        clock.set(start + Duration::from_secs(5));
        assert!(db.get("key1").is_none());
    }

    #[test]
    fn test_contains_purges_expired_without_recency_touch() {
        let clock = Arc::new(ManualClock::new(Instant::now()));
        let db = db_with_clock(Arc::clone(&clock));

        db.set_with_ttl("old", "aaaa", Duration::from_secs(1));
        db.set("young", "bbbb");

        clock.advance(Duration::from_secs(2));
        assert!(!db.contains("old"));
        assert_eq!(db.bytes_referenced(), 4);
        assert!(db.contains("young"));
    }

    #[test]
    fn test_shrink_to_evicts_lru_first() {
        let db = db();

        db.set("a", "1111");
        db.set("b", "2222");
        db.set("c", "3333");
        assert_eq!(db.bytes_referenced(), 12);

        // Touch "a" so "b" becomes the LRU.
        let _ = db.get("a");

        let evicted = db.shrink_to(8);
        assert_eq!(evicted, 1);
        assert_eq!(db.bytes_referenced(), 8);
        assert!(!db.contains("b"));
        assert!(db.contains("a"));
        assert!(db.contains("c"));
    }

    #[test]
    fn test_shrink_to_zero_empties_cache() {
        let db = db();

        db.set("a", "1111");
        db.set("b", "2222");

        let evicted = db.shrink_to(0);
        assert_eq!(evicted, 2);
        assert!(db.is_empty());
        assert_eq!(db.bytes_referenced(), 0);
        // Shrinking an empty cache is a no-op, never an error.
        assert_eq!(db.shrink_to(0), 0);
    }

    #[test]
    fn test_shrink_already_under_target() {
        let db = db();
        db.set("a", "1111");

        assert_eq!(db.shrink_to(100), 0);
        assert!(db.contains("a"));
    }

    #[test]
    fn test_cleanup_expired_sweep() {
        let clock = Arc::new(ManualClock::new(Instant::now()));
        let db = db_with_clock(Arc::clone(&clock));

        db.set_with_ttl("a", "1111", Duration::from_secs(1));
        db.set_with_ttl("b", "2222", Duration::from_secs(1));
        db.set("keeper", "3333");

        clock.advance(Duration::from_secs(2));

        assert_eq!(db.cleanup_expired(), 2);
        assert_eq!(db.len(), 1);
        assert_eq!(db.bytes_referenced(), 4);
        assert!(db.contains("keeper"));
    }

    #[test]
    fn test_start_eviction_twice_errors() {
        let db = db();

        assert!(Arc::clone(&db)
            .start_eviction(5000, Duration::from_secs(1))
            .is_ok());
        assert!(matches!(
            Arc::clone(&db).start_eviction(5000, Duration::from_secs(1)),
            Err(CacheError::EvictionRunning)
        ));
        assert!(db.eviction_running());

        db.stop_eviction();
        assert!(!db.eviction_running());
        // Restart after stop is allowed.
        assert!(Arc::clone(&db)
            .start_eviction(5000, Duration::from_secs(1))
            .is_ok());
        db.stop_eviction();
    }

    #[test]
    fn test_stop_eviction_is_idempotent() {
        let db = db();
        db.stop_eviction();
        db.stop_eviction();
        assert!(!db.eviction_running());
    }

    #[test]
    fn test_background_eviction_shrinks() {
        let db = db();

        db.set("key1", "some value worth evicting");
        Arc::clone(&db)
            .start_eviction(0, Duration::from_millis(5))
            .ok();

        // Poll rather than sleeping a fixed amount; the pass runs on its own
        // schedule.
        for _ in 0..200 {
            if db.bytes_referenced() == 0 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        db.stop_eviction();
        assert_eq!(db.bytes_referenced(), 0);
        assert!(db.get("key1").is_none());
    }

    #[test]
    fn test_no_passes_after_stop() {
        let db = db();

        Arc::clone(&db)
            .start_eviction(0, Duration::from_millis(5))
            .ok();
        db.stop_eviction();

        // Anything set after stop returns must survive future ticks.
        db.set("survivor", "value");
        thread::sleep(Duration::from_millis(50));
        assert_eq!(db.get("survivor"), Some(Bytes::from("value")));
    }

    #[test]
    fn test_snapshot_reflects_locked_state() {
        let db = db();

        db.set("key1", "value1");
        let _ = db.get("key1");
        let _ = db.get("missing");

        let snapshot = db.snapshot();
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.sets, 1);
        assert_eq!(snapshot.entries, 1);
        assert_eq!(snapshot.bytes_referenced, 6);
    }
}
