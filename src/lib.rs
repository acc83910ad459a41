//! # membound
//!
//! A thread-safe, memory-bounded in-memory cache for Rust with per-entry
//! TTL expiration and least-recently-used eviction.
//!
//! ## Features
//!
//! - **Thread-safe**: Share across threads with `Clone` (uses `Arc` internally)
//! - **Byte-bounded**: Tracks the payload bytes it references; shrink under a
//!   budget on demand or on a background timer
//! - **TTL support**: Entries expire lazily, detected and purged on access
//! - **LRU eviction**: Shrink passes always evict the least recently used entry first
//! - **Testable time**: Inject a manual clock for deterministic expiration tests
//! - **Statistics**: Track cache hits, misses, evictions, and more
//!
//! ## Quick Start
//!
//! ```rust
//! use membound::{Cache, CacheConfig};
//! use std::time::Duration;
//!
//! // Create a cache with a 5 minute default TTL
//! let config = CacheConfig::new()
//!     .default_ttl(Duration::from_secs(300))
//!     .build();
//!
//! let cache = Cache::new(config);
//!
//! // Store and retrieve values
//! cache.set("user:123", "Alice");
//!
//! if let Some(value) = cache.get("user:123") {
//!     println!("Found: {:?}", value);
//! }
//!
//! // Keep resident bytes under a budget: synchronously...
//! cache.shrink_to(64 * 1024);
//!
//! // ...or on a background timer
//! cache.start_eviction(64 * 1024, Duration::from_secs(5)).unwrap();
//! cache.stop_eviction();
//!
//! // Check statistics
//! let stats = cache.stats();
//! println!("Hit rate: {:.1}%, bytes: {}", stats.hit_rate, stats.bytes_referenced);
//! ```
//!
//! ## Thread Safety
//!
//! The cache is safe to share across threads. Cloning a `Cache` creates a new
//! handle to the same underlying data:
//!
//! ```rust
//! use membound::Cache;
//! use std::thread;
//!
//! let cache = Cache::default();
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let cache = cache.clone();
//!     thread::spawn(move || {
//!         cache.set(format!("key_{}", i), format!("value_{}", i));
//!     })
//! }).collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! ```

// Public API - stable in v1.0.0
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod stats;

pub use cache::Cache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use stats::{CacheStats, StatsSnapshot};

// Internal modules - not part of public API
pub(crate) mod entry;
pub(crate) mod lru;
pub(crate) mod storage;

// Protocol glue for the server/client binaries
pub mod utils;
pub use utils::buffer_to_array;

pub mod command;
pub use command::Command;

pub mod cli;
pub use cli::{Cli, ClientCommand};

#[cfg(test)]
mod property_tests;
