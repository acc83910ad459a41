//! Injectable time source.
//!
//! TTL expiration compares entry deadlines against "now". Reading the wall
//! clock directly would make expiration tests depend on real sleeps, so the
//! cache takes its notion of time from a `Clock` passed in at construction.

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A source of the current time.
///
/// The cache calls `now()` whenever it needs to decide if an entry has
/// expired or to compute an absolute deadline from a TTL.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Return the current instant.
    fn now(&self) -> Instant;
}

/// The default clock: real wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that reports a fixed instant until explicitly advanced.
///
/// Intended for tests: inject one with `Cache::with_clock`, then move time
/// forward with [`advance`](ManualClock::advance) to trigger expiration
/// deterministically.
///
/// # Example
/// ```
/// use membound::ManualClock;
/// use std::time::{Duration, Instant};
///
/// let clock = ManualClock::new(Instant::now());
/// let before = clock.now();
/// clock.advance(Duration::from_secs(60));
/// assert_eq!(clock.now() - before, Duration::from_secs(60));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    instant: Mutex<Instant>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            instant: Mutex::new(start),
        }
    }

    /// Read the current (frozen) instant.
    pub fn now(&self) -> Instant {
        match self.instant.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        match self.instant.lock() {
            Ok(mut guard) => *guard += delta,
            Err(mut poisoned) => **poisoned.get_mut() += delta,
        }
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, instant: Instant) {
        match self.instant.lock() {
            Ok(mut guard) => *guard = instant,
            Err(mut poisoned) => **poisoned.get_mut() = instant,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        ManualClock::now(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_is_frozen() {
        let clock = ManualClock::new(Instant::now());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_manual_clock_advance() {
        let start = Instant::now();
        let clock = ManualClock::new(start);

        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now(), start + Duration::from_secs(5));

        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now(), start + Duration::from_secs(10));
    }

    #[test]
    fn test_manual_clock_set() {
        let start = Instant::now();
        let clock = ManualClock::new(start);

        let later = start + Duration::from_secs(3600);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}
