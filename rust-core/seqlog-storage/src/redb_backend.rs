// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//
// redb-backed persistent storage backend for SeqLog.
//
// Uses redb (pure Rust, B-tree, ACID, single-file database) to provide
// durable ordered key-value storage. No C/C++ dependencies.
//
// # Design
//
// - Single redb `Database` file containing one `entries` table.
// - Read transactions for all read operations (concurrent, MVCC snapshots).
// - One write transaction per `put`; redb serialises writers internally and
//   fsyncs on commit, so a returned `put` is durable and atomic.
// - `scan_range` and `last_key_in_range` use redb's `range()`, which is a
//   double-ended iterator, so the reverse seek is a single B-tree descent.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Builder, Database, ReadOnlyTable, ReadableDatabase, TableDefinition, TableError};
use tracing::debug;

use crate::backend::{is_empty_range, RangeVisitor, StorageBackend};
use crate::error::StorageError;

/// Table definition for the log entries.
///
/// Keys and values are byte slices, matching the `StorageBackend` trait's
/// opaque byte interface.
const ENTRIES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entries");

/// A persistent storage backend powered by redb.
///
/// Thread-safe: `Database` is `Send + Sync` and handles internal locking.
///
/// # Example
///
/// ```rust,no_run
/// use seqlog_storage::redb_backend::RedbBackend;
/// use seqlog_storage::backend::StorageBackend;
///
/// let store = RedbBackend::open("/tmp/seqlog-test.redb").unwrap();
/// store.put(b"hello", b"world").unwrap();
/// let val = store.get(b"hello").unwrap();
/// assert_eq!(val, Some(b"world".to_vec()));
/// ```
pub struct RedbBackend {
    /// The redb database handle.
    db: Arc<Database>,
    /// Path to the database file (for diagnostics and approximate_size).
    path: PathBuf,
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    ///
    /// Creates the file and parent directories if they don't exist. The
    /// entries table is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_cache(path, None)
    }

    /// Open or create a database, optionally overriding redb's page cache size
    /// (in bytes).
    pub fn open_with_cache(
        path: impl AsRef<Path>,
        cache_size_bytes: Option<usize>,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut builder = Builder::new();
        if let Some(bytes) = cache_size_bytes {
            builder.set_cache_size(bytes);
        }
        let db = builder.create(&path).map_err(|e| {
            StorageError::Open(format!("failed to open redb at {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), ?cache_size_bytes, "opened redb backend");

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Return the filesystem path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the entries table for reading.
    ///
    /// Returns `Ok(None)` when nothing has been written yet and the table
    /// does not exist.
    fn read_table(&self) -> Result<Option<ReadOnlyTable<&'static [u8], &'static [u8]>>, StorageError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StorageError::Read(format!("read txn: {e}")))?;

        match txn.open_table(ENTRIES_TABLE) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(StorageError::Read(format!("open table: {e}"))),
        }
    }
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish()
    }
}

impl StorageBackend for RedbBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let Some(table) = self.read_table()? else {
            return Ok(None);
        };

        match table.get(key) {
            Ok(Some(value)) => Ok(Some(value.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::CorruptedData(format!("get: {e}"))),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StorageError::Write(format!("write txn: {e}")))?;
        {
            let mut table = txn
                .open_table(ENTRIES_TABLE)
                .map_err(|e| StorageError::Write(format!("open table: {e}")))?;
            table
                .insert(key, value)
                .map_err(|e| StorageError::Write(format!("insert: {e}")))?;
        }
        txn.commit()
            .map_err(|e| StorageError::Write(format!("commit: {e}")))?;
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
        let Some(table) = self.read_table()? else {
            return Ok(());
        };

        let iter = table
            .range(start..end)
            .map_err(|e| StorageError::Read(format!("range scan: {e}")))?;

        for entry in iter {
            let (key, value) =
                entry.map_err(|e| StorageError::CorruptedData(format!("scan entry: {e}")))?;
            if let ControlFlow::Break(()) = visit(key.value(), value.value()) {
                break;
            }
        }
        Ok(())
    }

    fn last_key_in_range(&self, start: &[u8], end: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        if is_empty_range(start, end) {
            return Ok(None);
        }
        let Some(table) = self.read_table()? else {
            return Ok(None);
        };

        let mut iter = table
            .range(start..end)
            .map_err(|e| StorageError::Read(format!("range seek: {e}")))?;

        match iter.next_back() {
            Some(entry) => {
                let (key, _) =
                    entry.map_err(|e| StorageError::CorruptedData(format!("last entry: {e}")))?;
                Ok(Some(key.value().to_vec()))
            }
            None => Ok(None),
        }
    }

    fn flush(&self) -> Result<(), StorageError> {
        // Every write transaction is fsynced on commit.
        Ok(())
    }

    fn name(&self) -> &str {
        "redb"
    }

    fn approximate_size(&self) -> Result<Option<u64>, StorageError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Create a temporary RedbBackend for testing.
    ///
    /// The `TempDir` must outlive the backend so the file stays in place.
    fn temp_backend() -> (RedbBackend, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.redb");
        let backend = RedbBackend::open(&path).unwrap();
        (backend, dir)
    }

    fn keys_in(backend: &RedbBackend, start: &[u8], end: &[u8]) -> Vec<Vec<u8>> {
        let mut keys = Vec::new();
        backend
            .scan_range(start, end, &mut |key, _| {
                keys.push(key.to_vec());
                ControlFlow::Continue(())
            })
            .unwrap();
        keys
    }

    #[test]
    fn test_reads_on_fresh_database() {
        let (backend, _dir) = temp_backend();

        // No table exists yet; every read reports absence.
        assert_eq!(backend.get(b"key1").unwrap(), None);
        assert!(keys_in(&backend, b"a", b"z").is_empty());
        assert_eq!(backend.last_key_in_range(b"a", b"z").unwrap(), None);
    }

    #[test]
    fn test_basic_get_put() {
        let (backend, _dir) = temp_backend();

        backend.put(b"key1", b"value1").unwrap();
        assert_eq!(backend.get(b"key1").unwrap(), Some(b"value1".to_vec()));

        backend.put(b"key1", b"updated").unwrap();
        assert_eq!(backend.get(b"key1").unwrap(), Some(b"updated".to_vec()));
        assert_eq!(backend.get(b"key2").unwrap(), None);
    }

    #[test]
    fn test_scan_range_order_and_bounds() {
        let (backend, _dir) = temp_backend();

        backend.put(b"user:2", b"Bob").unwrap();
        backend.put(b"user:1", b"Alice").unwrap();
        backend.put(b"user:3", b"Carol").unwrap();
        backend.put(b"post:1", b"Hello").unwrap();

        let keys = keys_in(&backend, b"user:1", b"user:3");
        assert_eq!(keys, vec![b"user:1".to_vec(), b"user:2".to_vec()]);
    }

    #[test]
    fn test_scan_range_break() {
        let (backend, _dir) = temp_backend();
        for key in [b"a", b"b", b"c"] {
            backend.put(key, b"v").unwrap();
        }

        let mut seen = Vec::new();
        backend
            .scan_range(b"a", b"z", &mut |key, _| {
                seen.push(key.to_vec());
                if seen.len() == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn test_last_key_in_range() {
        let (backend, _dir) = temp_backend();

        backend.put(b"log\x00\x01", b"1").unwrap();
        backend.put(b"log\x00\x02", b"2").unwrap();
        backend.put(b"loh\x00\x01", b"other").unwrap();

        assert_eq!(
            backend.last_key_in_range(b"log", b"loh").unwrap(),
            Some(b"log\x00\x02".to_vec())
        );
        assert_eq!(backend.last_key_in_range(b"lox", b"loz").unwrap(), None);
        assert_eq!(backend.last_key_in_range(b"loz", b"log").unwrap(), None);
    }

    #[test]
    fn test_name_and_size() {
        let (backend, _dir) = temp_backend();
        assert_eq!(backend.name(), "redb");

        backend.put(b"key", b"value").unwrap();
        backend.flush().unwrap();
        let size = backend.approximate_size().unwrap();
        assert!(size.unwrap() > 0);
    }

    #[test]
    fn test_open_with_cache_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("cache.redb");

        let backend = RedbBackend::open_with_cache(&path, Some(1 << 20)).unwrap();
        backend.put(b"k", b"v").unwrap();
        assert!(path.exists());
        assert_eq!(backend.path(), path.as_path());
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("persist-test.redb");

        {
            let backend = RedbBackend::open(&path).unwrap();
            backend.put(b"persistent-key", b"persistent-value").unwrap();
        }

        {
            let backend = RedbBackend::open(&path).unwrap();
            let val = backend.get(b"persistent-key").unwrap();
            assert_eq!(val, Some(b"persistent-value".to_vec()));
        }
    }
}
