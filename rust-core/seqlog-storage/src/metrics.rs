// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metrics-collecting wrapper for SeqLog storage backends.
//
// Wraps any `StorageBackend` and transparently collects operation counts,
// latency sums and byte transfer totals. Useful for profiling appends and
// range reads without touching the log itself.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::backend::{RangeVisitor, StorageBackend};
use crate::error::StorageError;

/// Accumulated statistics for a storage backend.
///
/// All counters are monotonically increasing for the lifetime of the
/// [`MetricsBackend`] that owns them (until [`MetricsBackend::reset_stats`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendStats {
    /// Number of `get` operations performed.
    pub get_count: u64,
    /// Number of `put` operations performed.
    pub put_count: u64,
    /// Number of `scan_range` operations performed.
    pub scan_count: u64,
    /// Number of `last_key_in_range` seeks performed.
    pub seek_count: u64,
    /// Entries handed to scan visitors across all scans.
    pub scanned_entries: u64,
    /// Cumulative wall-clock latency of all `get` calls, in milliseconds.
    pub get_latency_sum_ms: f64,
    /// Cumulative wall-clock latency of all `put` calls, in milliseconds.
    pub put_latency_sum_ms: f64,
    /// Total bytes read across `get` and `scan_range`.
    pub total_bytes_read: u64,
    /// Total bytes written across successful `put` operations.
    pub total_bytes_written: u64,
}

/// A storage backend wrapper that collects operation metrics.
///
/// # Example
///
/// ```rust
/// use seqlog_storage::memory::InMemoryBackend;
/// use seqlog_storage::metrics::MetricsBackend;
/// use seqlog_storage::backend::StorageBackend;
///
/// let metered = MetricsBackend::new(InMemoryBackend::new());
///
/// metered.put(b"key", b"value").unwrap();
/// metered.get(b"key").unwrap();
///
/// let stats = metered.stats();
/// assert_eq!(stats.put_count, 1);
/// assert_eq!(stats.get_count, 1);
/// ```
pub struct MetricsBackend<B: StorageBackend> {
    /// The wrapped backend that performs the actual storage operations.
    inner: B,
    /// Shared, mutable statistics accumulator.
    stats: Arc<Mutex<BackendStats>>,
}

impl<B: StorageBackend> MetricsBackend<B> {
    /// Wrap `inner` with metrics collection.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            stats: Arc::new(Mutex::new(BackendStats::default())),
        }
    }

    /// Return a snapshot of the current statistics.
    pub fn stats(&self) -> BackendStats {
        self.lock_stats().clone()
    }

    /// Reset all statistics to zero.
    pub fn reset_stats(&self) {
        *self.lock_stats() = BackendStats::default();
    }

    /// Return a reference to the inner backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    // Counters stay usable after a panic elsewhere; a poisoned guard only
    // means some update may be missing.
    fn lock_stats(&self) -> MutexGuard<'_, BackendStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<B: StorageBackend> StorageBackend for MetricsBackend<B> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let start = Instant::now();
        let result = self.inner.get(key);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut s = self.lock_stats();
        s.get_count += 1;
        s.get_latency_sum_ms += elapsed_ms;
        if let Ok(Some(ref val)) = result {
            s.total_bytes_read += val.len() as u64;
        }

        result
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let start = Instant::now();
        let result = self.inner.put(key, value);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut s = self.lock_stats();
        s.put_count += 1;
        s.put_latency_sum_ms += elapsed_ms;
        if result.is_ok() {
            s.total_bytes_written += value.len() as u64;
        }

        result
    }

    fn scan_range(
        &self,
        start: &[u8],
        end: &[u8],
        visit: &mut RangeVisitor<'_>,
    ) -> Result<(), StorageError> {
        let mut entries = 0u64;
        let mut bytes = 0u64;
        let result = self.inner.scan_range(start, end, &mut |key, value| {
            entries += 1;
            bytes += (key.len() + value.len()) as u64;
            visit(key, value)
        });

        let mut s = self.lock_stats();
        s.scan_count += 1;
        s.scanned_entries += entries;
        s.total_bytes_read += bytes;

        result
    }

    fn last_key_in_range(&self, start: &[u8], end: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let result = self.inner.last_key_in_range(start, end);
        self.lock_stats().seek_count += 1;
        result
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn approximate_size(&self) -> Result<Option<u64>, StorageError> {
        self.inner.approximate_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use std::ops::ControlFlow;

    #[test]
    fn test_get_increments_count() {
        let metered = MetricsBackend::new(InMemoryBackend::new());

        metered.put(b"k", b"v").unwrap();
        metered.get(b"k").unwrap();
        metered.get(b"k").unwrap();
        metered.get(b"missing").unwrap();

        let stats = metered.stats();
        assert_eq!(stats.get_count, 3);
        assert_eq!(stats.put_count, 1);
        assert_eq!(stats.total_bytes_read, 2);
    }

    #[test]
    fn test_put_increments_count_and_bytes() {
        let metered = MetricsBackend::new(InMemoryBackend::new());

        metered.put(b"a", b"hello").unwrap(); // 5 bytes
        metered.put(b"b", b"world!").unwrap(); // 6 bytes

        let stats = metered.stats();
        assert_eq!(stats.put_count, 2);
        assert_eq!(stats.total_bytes_written, 11);
    }

    #[test]
    fn test_scan_counts_visited_entries_only() {
        let metered = MetricsBackend::new(InMemoryBackend::new());

        metered.put(b"pfx:a", b"11").unwrap(); // 5 + 2 = 7
        metered.put(b"pfx:b", b"22").unwrap();
        metered.put(b"pfx:c", b"33").unwrap();

        metered
            .scan_range(b"pfx:", b"pfx;", &mut |_, _| ControlFlow::Break(()))
            .unwrap();

        let stats = metered.stats();
        assert_eq!(stats.scan_count, 1);
        assert_eq!(stats.scanned_entries, 1);
        assert_eq!(stats.total_bytes_read, 7);
    }

    #[test]
    fn test_seek_increments_count() {
        let metered = MetricsBackend::new(InMemoryBackend::new());
        metered.put(b"a1", b"x").unwrap();

        let last = metered.last_key_in_range(b"a", b"b").unwrap();
        assert_eq!(last, Some(b"a1".to_vec()));
        assert_eq!(metered.stats().seek_count, 1);
    }

    #[test]
    fn test_reset_stats() {
        let metered = MetricsBackend::new(InMemoryBackend::new());

        metered.put(b"a", b"1").unwrap();
        metered.get(b"a").unwrap();
        assert_eq!(metered.stats().get_count, 1);

        metered.reset_stats();

        assert_eq!(metered.stats(), BackendStats::default());
    }

    #[test]
    fn test_delegating_accessors() {
        let metered = MetricsBackend::new(InMemoryBackend::new());
        metered.put(b"abc", b"defgh").unwrap();
        metered.flush().unwrap();

        assert_eq!(metered.name(), "in-memory");
        assert_eq!(metered.approximate_size().unwrap(), Some(8));
        assert_eq!(metered.inner().len().unwrap(), 1);
    }
}
