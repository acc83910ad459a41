//! A single cache entry.

use bytes::Bytes;
use generational_arena::Index;
use std::time::Instant;

/// The value holder for one key: the payload, its expiration deadline, and
/// a handle to the key's node in the recency list.
///
/// Entries are owned by the cache's key map. The recency handle is a
/// back-reference only; the list node itself is owned by the list's arena
/// and the two are kept consistent by the cache's lock-protected operations.
#[derive(Debug)]
pub struct Entry {
    /// The stored payload.
    value: Bytes,

    /// Absolute deadline after which the entry is logically absent.
    /// `None` means it never expires.
    expires_at: Option<Instant>,

    /// Handle to this key's node in the recency list.
    node: Index,
}

impl Entry {
    /// Create an entry for a freshly inserted key.
    pub fn new(value: Bytes, expires_at: Option<Instant>, node: Index) -> Self {
        Self {
            value,
            expires_at,
            node,
        }
    }

    /// Replace the payload and expiration in place. The recency handle is
    /// untouched; repositioning is the cache's job.
    pub fn update(&mut self, value: Bytes, expires_at: Option<Instant>) {
        self.value = value;
        self.expires_at = expires_at;
    }

    /// A refcounted view of the payload. No recency side effects.
    pub fn read(&self) -> Bytes {
        self.value.clone()
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the entry is expired as of `now`. The deadline itself counts
    /// as expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// The recency-list handle for this entry's key.
    pub fn node(&self) -> Index {
        self.node
    }

    /// The expiration deadline, if any.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }
}
