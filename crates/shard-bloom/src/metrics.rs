//! Metrics hooks for filter operations
//!
//! Counts filter lifecycle events and store round trips so callers can
//! watch latency and positive-lookup rates.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use shard_bloom::{Metrics, ShardedBloomFilter};
//!
//! let metrics = Arc::new(Metrics::new());
//! let filter = ShardedBloomFilter::restore(store, "signups")
//!     .await?
//!     .with_metrics(metrics.clone());
//!
//! filter.add(b"alice").await?;
//! println!("{:?}", metrics.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for filter operations
///
/// Thread-safe counters for monitoring store traffic.
#[derive(Default)]
pub struct Metrics {
    /// Filters created
    pub filters_created: AtomicU64,
    /// Filters restored by name
    pub filters_restored: AtomicU64,
    /// Filters cleared
    pub filters_cleared: AtomicU64,
    /// Elements added
    pub elements_added: AtomicU64,
    /// Elements tested
    pub lookups_performed: AtomicU64,
    /// Tests that reported "probably present"
    pub lookups_positive: AtomicU64,
    /// Store calls that failed
    pub store_errors: AtomicU64,
    /// Store round trips issued by add/exists
    pub round_trips: AtomicU64,
    /// Cumulative round trip time in nanoseconds
    pub round_trip_ns: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_created: self.filters_created.load(Ordering::Relaxed),
            filters_restored: self.filters_restored.load(Ordering::Relaxed),
            filters_cleared: self.filters_cleared.load(Ordering::Relaxed),
            elements_added: self.elements_added.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            round_trips: self.round_trips.load(Ordering::Relaxed),
            avg_round_trip_ns: self.avg_round_trip_ns(),
        }
    }

    /// Average round trip time in nanoseconds
    pub fn avg_round_trip_ns(&self) -> u64 {
        let total = self.round_trip_ns.load(Ordering::Relaxed);
        let count = self.round_trips.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Ratio of positive lookups to total lookups
    ///
    /// Includes both true and false positives.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.filters_created,
            &self.filters_restored,
            &self.filters_cleared,
            &self.elements_added,
            &self.lookups_performed,
            &self.lookups_positive,
            &self.store_errors,
            &self.round_trips,
            &self.round_trip_ns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    pub filters_created: u64,
    pub filters_restored: u64,
    pub filters_cleared: u64,
    pub elements_added: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub store_errors: u64,
    pub round_trips: u64,
    pub avg_round_trip_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus or StatsD.
pub trait MetricsRecorder: Send + Sync {
    /// Record filter creation
    fn record_filter_created(&self, size_bits: u64, hash_count: u64, shards: usize);

    /// Record restore by name
    fn record_filter_restored(&self);

    /// Record clear
    fn record_filter_cleared(&self);

    /// Record an add round trip covering `count` elements
    fn record_add(&self, duration: Duration, count: usize);

    /// Record an exists round trip covering `count` elements, `positive` of them present
    fn record_lookup(&self, duration: Duration, count: usize, positive: usize);

    /// Record a failed store call
    fn record_store_error(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_created(&self, _: u64, _: u64, _: usize) {}
    fn record_filter_restored(&self) {}
    fn record_filter_cleared(&self) {}
    fn record_add(&self, _: Duration, _: usize) {}
    fn record_lookup(&self, _: Duration, _: usize, _: usize) {}
    fn record_store_error(&self) {}
}

impl MetricsRecorder for Metrics {
    fn record_filter_created(&self, _size_bits: u64, _hash_count: u64, _shards: usize) {
        self.filters_created.fetch_add(1, Ordering::Relaxed);
    }

    fn record_filter_restored(&self) {
        self.filters_restored.fetch_add(1, Ordering::Relaxed);
    }

    fn record_filter_cleared(&self) {
        self.filters_cleared.fetch_add(1, Ordering::Relaxed);
    }

    fn record_add(&self, duration: Duration, count: usize) {
        self.elements_added.fetch_add(count as u64, Ordering::Relaxed);
        self.record_round_trip(duration);
    }

    fn record_lookup(&self, duration: Duration, count: usize, positive: usize) {
        self.lookups_performed.fetch_add(count as u64, Ordering::Relaxed);
        self.lookups_positive.fetch_add(positive as u64, Ordering::Relaxed);
        self.record_round_trip(duration);
    }

    fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }
}

impl Metrics {
    fn record_round_trip(&self, duration: Duration) {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        self.round_trip_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }
}
