// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory storage backend for SeqLog.
//
// Uses a `BTreeMap` wrapped in a `RwLock` for thread-safe, ordered key-value
// storage. The BTreeMap ordering gives the same byte-lexicographic iteration
// order as the on-disk backend. Intended for tests and ephemeral logs.

use std::collections::BTreeMap;
use std::ops::{Bound, ControlFlow};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::{is_empty_range, RangeVisitor, StorageBackend};
use crate::error::StorageError;

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// An in-memory storage backend backed by a sorted `BTreeMap`.
///
/// All data lives in process memory and is lost on drop. Clones share the
/// same map.
///
/// # Example
///
/// ```rust
/// use seqlog_storage::memory::InMemoryBackend;
/// use seqlog_storage::backend::StorageBackend;
///
/// let store = InMemoryBackend::new();
/// store.put(b"hello", b"world").unwrap();
/// let val = store.get(b"hello").unwrap();
/// assert_eq!(val, Some(b"world".to_vec()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    /// The underlying sorted map, protected by a read-write lock.
    data: Arc<RwLock<Map>>,
}

impl InMemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of keys currently stored.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    /// Return true if the store contains no keys.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Map>, StorageError> {
        self.data.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Map>, StorageError> {
        self.data.write().map_err(|_| StorageError::LockPoisoned)
    }
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.write()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn scan_range(
        &self,
        start: &[u8],
        end: &[u8],
        visit: &mut RangeVisitor<'_>,
    ) -> Result<(), StorageError> {
        if is_empty_range(start, end) {
            return Ok(());
        }
        let map = self.read()?;
        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (Bound::Included(start), Bound::Excluded(end));
        for (key, value) in map.range::<[u8], _>(bounds) {
            if visit(key.as_slice(), value.as_slice()).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn last_key_in_range(&self, start: &[u8], end: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        if is_empty_range(start, end) {
            return Ok(None);
        }
        let map = self.read()?;
        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (Bound::Included(start), Bound::Excluded(end));
        Ok(map.range::<[u8], _>(bounds).next_back().map(|(key, _)| key.clone()))
    }

    fn flush(&self) -> Result<(), StorageError> {
        // No-op: all writes are immediately visible.
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory"
    }

    fn approximate_size(&self) -> Result<Option<u64>, StorageError> {
        let size: u64 = self
            .read()?
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum();
        Ok(Some(size))
    }
}
