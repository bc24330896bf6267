// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core storage backend trait for SeqLog.
//
// Defines the `StorageBackend` trait that all ordered stores must satisfy.
// Every call is synchronous and blocking: the log has no suspension points,
// so backends run their I/O on the caller's thread. Backends are expected to
// be thread-safe (`Send + Sync`) and to make a single-key `put` atomic.

use std::ops::ControlFlow;

use crate::error::StorageError;

/// Callback invoked for each `(key, value)` pair of a range scan.
///
/// Returning [`ControlFlow::Break`] stops the scan after the current entry.
pub type RangeVisitor<'a> = dyn FnMut(&[u8], &[u8]) -> ControlFlow<()> + 'a;

/// An ordered key-value storage backend.
///
/// All keys and values are opaque byte slices, ordered byte-lexicographically.
/// Ranges are half-open: `start` is inclusive, `end` exclusive. A range with
/// `start >= end` is empty.
pub trait StorageBackend: Send + Sync {
    /// Retrieve the value associated with `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist, rather than an error.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any previous value for `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Visit every entry in `[start, end)` in ascending key order.
    ///
    /// The scan runs inside a single read snapshot; entries written after
    /// the scan began may or may not be observed.
    fn scan_range(
        &self,
        start: &[u8],
        end: &[u8],
        visit: &mut RangeVisitor<'_>,
    ) -> Result<(), StorageError>;

    /// Seek to the greatest key in `[start, end)`.
    fn last_key_in_range(&self, start: &[u8], end: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Flush any buffered writes to durable storage.
    fn flush(&self) -> Result<(), StorageError>;

    /// A human-readable name for this backend, used in logging and metrics.
    fn name(&self) -> &str;

    /// Return the approximate total size of stored data in bytes, if known.
    fn approximate_size(&self) -> Result<Option<u64>, StorageError>;
}

/// True when `[start, end)` cannot contain any key.
pub(crate) fn is_empty_range(start: &[u8], end: &[u8]) -> bool {
    start >= end
}
