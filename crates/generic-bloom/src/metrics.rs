//! Metrics hooks for Bloom filter operations
//!
//! Provides instrumentation points for monitoring filter usage, memory held
//! by live filters, and operation latencies.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use generic_bloom::{BloomFilter, Metrics};
//!
//! let metrics = Arc::new(Metrics::new());
//! let mut filter = BloomFilter::<u64>::with_false_positive_rate(0.01, 1000, primitives, encoder)?
//!     .with_metrics(metrics.clone());
//!
//! filter.add(&7);
//! assert_eq!(metrics.snapshot().elements_inserted, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for Bloom filter operations
///
/// Thread-safe counters, shareable across filters.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total filters attached to this collector
    pub filters_created: AtomicU64,
    /// Total `add` calls across all filters
    pub elements_inserted: AtomicU64,
    /// Total membership queries performed
    pub lookups_performed: AtomicU64,
    /// Total positive lookups (true or false positives)
    pub lookups_positive: AtomicU64,
    /// Values turned away by a type-erased filter
    pub elements_rejected: AtomicU64,
    /// Bytes of bit storage held by live filters
    pub bytes_allocated: AtomicU64,
    /// Sum of indexes per item (k) over attached filters
    pub indexes_configured: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record filter creation
    ///
    /// # Arguments
    /// * `bit_count` - Filter size in bits, after rounding
    /// * `index_count` - Indexes derived per item (k)
    pub fn record_filter_created(&self, bit_count: usize, index_count: usize) {
        self.filters_created.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add((bit_count / 8) as u64, Ordering::Relaxed);
        self.indexes_configured
            .fetch_add(index_count as u64, Ordering::Relaxed);
    }

    pub fn record_insert(&self, duration: Duration) {
        self.elements_inserted.fetch_add(1, Ordering::Relaxed);
        self.insert_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record lookup operation
    ///
    /// # Arguments
    /// * `duration` - Time taken for lookup
    /// * `found` - Whether the element was reported present
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rejected(&self) {
        self.elements_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filter_freed(&self, bit_count: usize) {
        self.bytes_allocated
            .fetch_sub((bit_count / 8) as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_created: self.filters_created.load(Ordering::Relaxed),
            elements_inserted: self.elements_inserted.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            elements_rejected: self.elements_rejected.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            avg_index_count: average(&self.indexes_configured, &self.filters_created),
            avg_lookup_ns: average(&self.lookup_time_ns, &self.lookups_performed),
            avg_insert_ns: average(&self.insert_time_ns, &self.elements_inserted),
        }
    }

    /// Ratio of positive lookups to total lookups.
    ///
    /// Includes true positives, so it only approximates the false positive
    /// rate when queries are for items known to be absent.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }
}

fn average(total: &AtomicU64, count: &AtomicU64) -> u64 {
    let total = total.load(Ordering::Relaxed);
    let count = count.load(Ordering::Relaxed);
    if count > 0 {
        total / count
    } else {
        0
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub filters_created: u64,
    pub elements_inserted: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub elements_rejected: u64,
    pub bytes_allocated: u64,
    /// Mean k over attached filters; 0 for filters built from a bare index function
    pub avg_index_count: u64,
    pub avg_lookup_ns: u64,
    pub avg_insert_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to forward filter activity to an external metrics
/// system.
pub trait MetricsRecorder: Send + Sync {
    fn record_filter_created(&self, bit_count: usize, index_count: usize);

    fn record_insert(&self, duration: Duration);

    fn record_lookup(&self, duration: Duration, found: bool);

    /// A type-erased filter was handed a value of the wrong type.
    fn record_rejected(&self);

    fn record_filter_freed(&self, bit_count: usize);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_created(&self, _: usize, _: usize) {}
    fn record_insert(&self, _: Duration) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
    fn record_rejected(&self) {}
    fn record_filter_freed(&self, _: usize) {}
}

impl MetricsRecorder for Metrics {
    fn record_filter_created(&self, bit_count: usize, index_count: usize) {
        Metrics::record_filter_created(self, bit_count, index_count);
    }

    fn record_insert(&self, duration: Duration) {
        Metrics::record_insert(self, duration);
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        Metrics::record_lookup(self, duration, found);
    }

    fn record_rejected(&self) {
        Metrics::record_rejected(self);
    }

    fn record_filter_freed(&self, bit_count: usize) {
        Metrics::record_filter_freed(self, bit_count);
    }
}
