//! Review-prompt tracking.
//!
//! Every filter change bumps a persistent counter. Once the counter reaches
//! the threshold the tracker tells the caller to ask for an app review; the
//! prompt itself belongs to the platform, not to this crate.

use crate::core::error::StoreResult;
use crate::session::store::KeyValueStore;
use log::{info, warn};

/// Store key holding the cumulative number of filter changes.
pub const FILTER_COUNT_KEY: &str = "filterCount";

/// Filter changes before a review is requested.
pub const DEFAULT_REVIEW_THRESHOLD: u32 = 20;

/// What the caller should do after a filter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Ask the platform to show its review prompt.
    RequestReview,
    /// Keep going.
    NotYet {
        /// Filter changes left until a request
        remaining: u32,
    },
}

/// Counts filter changes against a persistent store.
pub struct ReviewTracker {
    store: Box<dyn KeyValueStore>,
    threshold: u32,
}

impl ReviewTracker {
    /// Tracker with the default threshold.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_threshold(store, DEFAULT_REVIEW_THRESHOLD)
    }

    /// Tracker requesting a review once `threshold` changes were recorded.
    pub fn with_threshold(store: Box<dyn KeyValueStore>, threshold: u32) -> Self {
        Self { store, threshold }
    }

    /// Filter changes recorded so far.
    pub fn count(&self) -> StoreResult<u32> {
        let raw = self.store.get_i64(FILTER_COUNT_KEY)?.unwrap_or(0);
        Ok(raw.clamp(0, u32::MAX as i64) as u32)
    }

    /// Filter changes needed before a review is requested.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Record one filter change and decide whether to request a review.
    ///
    /// A store failure is logged and treated as "not yet"; it never blocks
    /// the filter change itself.
    pub fn record_filter_change(&mut self) -> ReviewDecision {
        match self.try_record() {
            Ok(count) => self.decide(count),
            Err(e) => {
                warn!("Could not update {}: {}", FILTER_COUNT_KEY, e);
                ReviewDecision::NotYet {
                    remaining: self.threshold,
                }
            }
        }
    }

    fn try_record(&mut self) -> StoreResult<u32> {
        let count = self.count()?.saturating_add(1);
        self.store.set_i64(FILTER_COUNT_KEY, count as i64)?;
        Ok(count)
    }

    fn decide(&self, count: u32) -> ReviewDecision {
        if count >= self.threshold {
            info!("Filter changed {} times, requesting review", count);
            ReviewDecision::RequestReview
        } else {
            ReviewDecision::NotYet {
                remaining: self.threshold - count,
            }
        }
    }
}

impl std::fmt::Debug for ReviewTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewTracker")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreError;
    use crate::session::store::{JsonFileStore, MemoryStore};

    #[test]
    fn test_requests_review_on_twentieth_change() {
        let mut tracker = ReviewTracker::new(Box::new(MemoryStore::new()));
        for i in 1..20 {
            assert_eq!(
                tracker.record_filter_change(),
                ReviewDecision::NotYet { remaining: 20 - i }
            );
        }
        assert_eq!(tracker.record_filter_change(), ReviewDecision::RequestReview);
        // Keeps requesting after the threshold, like the counter it mirrors.
        assert_eq!(tracker.record_filter_change(), ReviewDecision::RequestReview);
        assert_eq!(tracker.count().unwrap(), 21);
    }

    #[test]
    fn test_count_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut tracker = ReviewTracker::with_threshold(Box::new(JsonFileStore::open(&path).unwrap()), 3);
        tracker.record_filter_change();
        tracker.record_filter_change();

        let mut tracker = ReviewTracker::with_threshold(Box::new(JsonFileStore::open(&path).unwrap()), 3);
        assert_eq!(tracker.count().unwrap(), 2);
        assert_eq!(tracker.record_filter_change(), ReviewDecision::RequestReview);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_i64(&self, _key: &str) -> StoreResult<Option<i64>> {
            Ok(None)
        }

        fn set_i64(&mut self, _key: &str, _value: i64) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "read-only")))
        }
    }

    #[test]
    fn test_store_failure_is_not_fatal() {
        let mut tracker = ReviewTracker::with_threshold(Box::new(BrokenStore), 1);
        assert_eq!(tracker.record_filter_change(), ReviewDecision::NotYet { remaining: 1 });
    }
}
