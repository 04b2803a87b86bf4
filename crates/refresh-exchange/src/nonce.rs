//! Nonce source for signed requests.
//!
//! The exchange requires a nonce on every signed call. Nonces start at the
//! current Unix time in milliseconds and increase by one per request.

use std::sync::atomic::{AtomicU64, Ordering};

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Returns current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Issues strictly increasing nonces.
///
/// Owns the counter exclusively; the only way to observe it is `next()`.
#[derive(Debug)]
pub struct NonceManager {
    counter: AtomicU64,
}

impl NonceManager {
    /// Creates a manager seeded from `clock`.
    #[must_use]
    pub fn new<C: Clock>(clock: &C) -> Self {
        Self {
            counter: AtomicU64::new(clock.now_ms()),
        }
    }

    /// Creates a manager seeded from the system clock.
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(&SystemClock)
    }

    /// Returns the next nonce.
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::AcqRel) + 1
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    const BASE_TIME: u64 = 1_700_000_000_000; // ~2023-11-14

    #[test]
    fn test_seeded_from_clock() {
        let manager = NonceManager::new(&FixedClock(BASE_TIME));
        assert_eq!(manager.next(), BASE_TIME + 1);
        assert_eq!(manager.next(), BASE_TIME + 2);
    }

    #[test]
    fn test_monotonic_increase() {
        let manager = NonceManager::new(&FixedClock(BASE_TIME));

        let mut prev = 0u64;
        for _ in 0..1000 {
            let nonce = manager.next();
            assert!(nonce > prev, "nonce must be strictly increasing");
            prev = nonce;
        }
    }

    #[test]
    fn test_concurrent_no_duplicates() {
        let manager = Arc::new(NonceManager::new(&FixedClock(BASE_TIME)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || (0..500).map(|_| manager.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all_nonces: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        all_nonces.sort_unstable();
        let original_len = all_nonces.len();
        all_nonces.dedup();

        assert_eq!(all_nonces.len(), original_len, "all nonces must be unique");
    }

    #[test]
    fn test_system_clock_seed_is_recent() {
        let manager = NonceManager::with_system_clock();
        assert!(manager.next() > BASE_TIME);
    }
}
