//! Schema cache counters
//!
//! - Counters only, monotonic
//! - Thread-safe, lock-free
//! - Passive: nothing reads them to make decisions

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by a `SchemaCache`
///
/// Uses Relaxed ordering; the values are exact once all callers are done.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Schemas built and published
    builds: AtomicU64,
    /// Builds that failed
    build_failures: AtomicU64,
    /// Lookups answered from the cache
    hits: AtomicU64,
    /// Lookups that had to take the write lock
    misses: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_builds(&self) {
        self.builds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_build_failures(&self) {
        self.build_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_misses(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            builds: self.builds.load(Ordering::Relaxed),
            build_failures: self.build_failures.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of the cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub builds: u64,
    pub build_failures: u64,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Snapshot as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "builds": self.builds,
            "build_failures": self.build_failures,
            "hits": self.hits,
            "misses": self.misses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.snapshot(), CacheStats::default());
    }

    #[test]
    fn test_increments() {
        let metrics = CacheMetrics::new();
        metrics.increment_builds();
        metrics.increment_hits();
        metrics.increment_hits();
        metrics.increment_misses();
        metrics.increment_build_failures();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.builds, 1);
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.build_failures, 1);
        assert_eq!(metrics.builds(), 1);
    }

    #[test]
    fn test_to_json() {
        let metrics = CacheMetrics::new();
        metrics.increment_builds();

        let json = metrics.snapshot().to_json();
        assert_eq!(json["builds"], 1);
        assert_eq!(json["hits"], 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = CacheMetrics::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        metrics.increment_hits();
                    }
                });
            }
        });
        assert_eq!(metrics.snapshot().hits, 4000);
    }
}
