// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Log facade.
//
// Owns the store handle and the registry of per-address sequence generators.
// The registry has its own lock, separate from every generator's lock, and it
// is held across generator creation and counter recovery so two callers can
// never initialise the same address from the same pre-write state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use seqlog_storage::{InMemoryBackend, RedbBackend, StorageBackend};
use tracing::{debug, info};

use crate::config::{BackendKind, LogConfig};
use crate::error::{LogError, LogResult};
use crate::key::display_address;
use crate::record::Record;
use crate::sequence::SequenceGenerator;
use crate::store::{RangeRead, RecordStore};

/// Paths shorter than this many bytes are never removed.
pub const MIN_REMOVE_PATH_LEN: usize = 4;

/// An append-only log of records keyed by `(address, sequence)`.
///
/// # Example
///
/// ```rust
/// use seqlog::{Json, Log};
///
/// let log = Log::in_memory();
/// let generator = log.sequence_generator_for(b"hello").unwrap();
/// assert_eq!(generator.append(&Json("first".to_string())).unwrap(), 1);
/// assert_eq!(log.last_sequence(b"hello").unwrap(), 1);
///
/// let Json(first): Json<String> = log.get(b"hello", 1).unwrap();
/// assert_eq!(first, "first");
/// ```
pub struct Log {
    store: Arc<RecordStore>,
    generators: Mutex<HashMap<Vec<u8>, Arc<SequenceGenerator>>>,
}

impl Log {
    /// Open or create a log stored in the directory `path`.
    pub fn open(path: impl AsRef<Path>) -> LogResult<Self> {
        Self::open_with_config(&LogConfig::new(path.as_ref()))
    }

    /// Open a log as described by `config`.
    pub fn open_with_config(config: &LogConfig) -> LogResult<Self> {
        config.validate()?;

        let backend: Arc<dyn StorageBackend> = match config.backend {
            BackendKind::Redb => {
                let store_path = config.store_path();
                let backend = RedbBackend::open_with_cache(&store_path, config.cache_size_bytes)
                    .map_err(|source| LogError::StoreOpen {
                        path: store_path.display().to_string(),
                        source,
                    })?;
                Arc::new(backend)
            }
            BackendKind::Memory => Arc::new(InMemoryBackend::new()),
        };

        info!(
            backend = backend.name(),
            data_dir = %config.data_dir.display(),
            "opened log"
        );
        Ok(Self::with_backend(backend))
    }

    /// A log that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()))
    }

    /// A log over an already opened backend.
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: Arc::new(RecordStore::new(backend)),
            generators: Mutex::new(HashMap::new()),
        }
    }

    /// Delete the on-disk log at `path`.
    ///
    /// Refuses paths shorter than [`MIN_REMOVE_PATH_LEN`] bytes. A path that
    /// does not exist counts as removed.
    pub fn remove(path: impl AsRef<Path>) -> LogResult<()> {
        let path = path.as_ref();
        if path.as_os_str().len() < MIN_REMOVE_PATH_LEN {
            return Err(LogError::UnsafePath(path.display().to_string()));
        }

        let removed = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        match removed {
            Ok(()) => {
                info!(path = %path.display(), "removed log");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LogError::Io(e)),
        }
    }

    /// The generator for `address`, created on first use.
    ///
    /// Creation recovers the counter with one reverse seek. If that read
    /// fails, nothing is registered and the next call retries.
    pub fn sequence_generator_for(&self, address: &[u8]) -> LogResult<Arc<SequenceGenerator>> {
        let mut generators = self.generators.lock().map_err(|_| LogError::LockPoisoned)?;
        if let Some(generator) = generators.get(address) {
            return Ok(Arc::clone(generator));
        }

        let generator = Arc::new(SequenceGenerator::open(address, Arc::clone(&self.store))?);
        generators.insert(address.to_vec(), Arc::clone(&generator));

        debug!(
            address = %display_address(address),
            registered = generators.len(),
            "registered sequence generator"
        );
        Ok(generator)
    }

    /// Write `record` at an explicit sequence number, bypassing the generator.
    pub fn put<T: Record>(&self, address: &[u8], seq: i64, record: &T) -> LogResult<()> {
        self.store.put(address, seq, record)
    }

    /// Read the record at `(address, seq)`.
    pub fn get<T: Record>(&self, address: &[u8], seq: i64) -> LogResult<T> {
        self.store.get(address, seq)
    }

    /// Read records with sequence numbers in `[start, end)`.
    pub fn get_range<T: Record>(&self, address: &[u8], start: i64, end: i64) -> RangeRead<T> {
        self.store.get_range(address, start, end)
    }

    /// Highest stored sequence for `address`, or -1 if it has none.
    pub fn last_sequence(&self, address: &[u8]) -> LogResult<i64> {
        self.store.last_sequence(address)
    }

    /// Flush buffered writes in the backend.
    pub fn flush(&self) -> LogResult<()> {
        self.store.backend().flush().map_err(LogError::StoreWrite)
    }

    /// Name of the backing store, as reported by the backend.
    pub fn backend_name(&self) -> &str {
        self.store.backend().name()
    }

    /// Number of addresses with a live generator.
    pub fn generator_count(&self) -> LogResult<usize> {
        let generators = self.generators.lock().map_err(|_| LogError::LockPoisoned)?;
        Ok(generators.len())
    }

    /// The record store shared by every generator.
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }
}

impl std::fmt::Debug for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Log")
            .field("store", &self.store)
            .field("generators", &self.generator_count().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Json;
    use seqlog_storage::StorageError;

    #[test]
    fn test_generator_is_shared_per_address() {
        let log = Log::in_memory();
        let a = log.sequence_generator_for(b"a").unwrap();
        let again = log.sequence_generator_for(b"a").unwrap();
        let b = log.sequence_generator_for(b"b").unwrap();

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(log.generator_count().unwrap(), 2);
    }

    #[test]
    fn test_generator_continues_after_explicit_puts() {
        let log = Log::in_memory();
        log.put(b"hello", 1, &Json(1)).unwrap();
        log.put(b"hello", 2, &Json(2)).unwrap();

        let generator = log.sequence_generator_for(b"hello").unwrap();
        assert_eq!(generator.append(&Json(3)).unwrap(), 3);
    }

    #[test]
    fn test_empty_address() {
        let log = Log::in_memory();
        assert_eq!(log.last_sequence(b"nobody").unwrap(), -1);
        let read = log.get_range::<Json<i64>>(b"nobody", 0, 10);
        assert!(read.is_complete());
        assert!(read.is_empty());
        assert_eq!(log.backend_name(), "in-memory");
        log.flush().unwrap();
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log");

        let log = Log::open(&path).unwrap();
        log.sequence_generator_for(b"x").unwrap().append(&Json(1)).unwrap();
        assert_eq!(log.backend_name(), "redb");
        assert!(path.join("seqlog.redb").is_file());
    }

    #[test]
    fn test_open_memory_config() {
        let config = LogConfig {
            backend: BackendKind::Memory,
            ..LogConfig::default()
        };
        let log = Log::open_with_config(&config).unwrap();
        assert_eq!(log.backend_name(), "in-memory");
    }

    #[test]
    fn test_open_fails_on_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = Log::open(blocker.join("log")).unwrap_err();
        assert!(matches!(err, LogError::StoreOpen { .. }));
    }

    #[test]
    fn test_remove_refuses_short_paths() {
        for path in ["", "/", "a/b", "abc"] {
            let err = Log::remove(path).unwrap_err();
            assert!(matches!(err, LogError::UnsafePath(_)), "{path:?}");
        }
    }

    #[test]
    fn test_remove_missing_path_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        Log::remove(dir.path().join("never-created")).unwrap();
    }

    #[test]
    fn test_remove_deletes_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        {
            let log = Log::open(&path).unwrap();
            log.put(b"hello", 1, &Json(1)).unwrap();
        }
        Log::remove(&path).unwrap();
        assert!(!path.exists());
    }

    /// A backend whose reads always fail.
    struct BrokenReads;

    impl StorageBackend for BrokenReads {
        fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Read("unreadable".into()))
        }
        fn put(&self, _key: &[u8], _value: &[u8]) -> Result<(), StorageError> {
            Ok(())
        }
        fn scan_range(
            &self,
            _start: &[u8],
            _end: &[u8],
            _visit: &mut seqlog_storage::RangeVisitor<'_>,
        ) -> Result<(), StorageError> {
            Err(StorageError::Read("unreadable".into()))
        }
        fn last_key_in_range(
            &self,
            _start: &[u8],
            _end: &[u8],
        ) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Read("unreadable".into()))
        }
        fn flush(&self) -> Result<(), StorageError> {
            Ok(())
        }
        fn name(&self) -> &str {
            "broken"
        }
        fn approximate_size(&self) -> Result<Option<u64>, StorageError> {
            Ok(None)
        }
    }

    #[test]
    fn test_failed_init_registers_nothing() {
        let log = Log::with_backend(Arc::new(BrokenReads));
        let err = log.sequence_generator_for(b"hello").unwrap_err();
        assert!(matches!(err, LogError::StoreRead(_)));
        assert_eq!(log.generator_count().unwrap(), 0);

        let read = log.get_range::<Json<i64>>(b"hello", 1, 5);
        assert!(matches!(read.error, Some(LogError::StoreRead(_))));
    }
}
