//! In-flight workflow gauge.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts per-order workflows currently in flight and remembers the peak.
#[derive(Debug)]
pub struct InflightTracker {
    count: AtomicUsize,
    peak: AtomicUsize,
    limit: usize,
}

impl InflightTracker {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            count: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            limit,
        }
    }

    /// Mark a workflow as started. The slot is released when the guard drops.
    pub fn enter(&self) -> InflightGuard<'_> {
        let now = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        debug_assert!(now <= self.limit, "in-flight {now} exceeds limit {}", self.limit);
        InflightGuard { tracker: self }
    }

    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

/// Releases an in-flight slot on drop.
#[derive(Debug)]
pub struct InflightGuard<'a> {
    tracker: &'a InflightTracker,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.tracker.count.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_slot() {
        let tracker = InflightTracker::new(2);
        {
            let _a = tracker.enter();
            let _b = tracker.enter();
        }
        let _c = tracker.enter();
        let _d = tracker.enter();
        assert_eq!(tracker.peak(), 2);
    }

    #[test]
    fn test_peak_is_sticky() {
        let tracker = InflightTracker::new(3);
        let a = tracker.enter();
        drop(a);
        let _b = tracker.enter();
        assert_eq!(tracker.peak(), 1);
    }
}
