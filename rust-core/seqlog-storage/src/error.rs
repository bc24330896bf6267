// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storage error types for the SeqLog backend layer.
//
// One enum for every failure a backend can report: filesystem errors,
// failures to open the store, failed reads and writes, corrupted pages and
// poisoned in-process locks.

use thiserror::Error;

/// Errors that can occur when interacting with a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred in the underlying storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store could not be opened or created.
    #[error("failed to open store: {0}")]
    Open(String),

    /// A read transaction or point read failed.
    #[error("read failed: {0}")]
    Read(String),

    /// A write transaction, insert or commit failed.
    #[error("write failed: {0}")]
    Write(String),

    /// The stored data is corrupted or in an unexpected format.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    /// An in-process lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,
}
