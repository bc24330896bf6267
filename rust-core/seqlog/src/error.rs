// SPDX-License-Identifier: PMPL-1.0-or-later
//
// SeqLog - Error types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Every failure the log surfaces to callers. Nothing here is retried
// internally: store failures, serialization failures and absent records are
// all handed back so the caller decides what to do.

use seqlog_storage::StorageError;
use thiserror::Error;

/// Errors that can occur during log operations.
#[derive(Debug, Error)]
pub enum LogError {
    /// The backing store could not be opened or created at `path`.
    #[error("failed to open log store at {path}: {source}")]
    StoreOpen {
        /// The location that was being opened.
        path: String,
        /// The underlying backend failure.
        #[source]
        source: StorageError,
    },

    /// A write to the backing store failed (disk full, corruption, closed
    /// handle). The sequence number consumed by the write is not reused.
    #[error("store write failed: {0}")]
    StoreWrite(#[source] StorageError),

    /// A point read, range scan or reverse seek failed in the backing store.
    #[error("store read failed: {0}")]
    StoreRead(#[source] StorageError),

    /// A record could not be encoded to bytes.
    #[error("failed to serialize record: {0}")]
    Serialization(String),

    /// Stored bytes did not parse as the requested record type.
    #[error("failed to decode record at sequence {sequence}: {reason}")]
    Decode {
        /// The sequence number of the offending entry, when known.
        sequence: i64,
        /// Why decoding failed.
        reason: String,
    },

    /// No record is stored under the requested address and sequence.
    #[error("no record for address {address} at sequence {sequence}")]
    NotFound {
        /// The address, with non-printable bytes escaped.
        address: String,
        /// The sequence number that was looked up.
        sequence: i64,
    },

    /// The sequence number is outside `0..=MAX_SEQUENCE`. Negative numbers
    /// sort after every non-negative key of the same address, and
    /// `i64::MAX` is never reached by a range scan or the last-sequence
    /// seek. A generator also reports this once its counter is exhausted.
    #[error("invalid sequence number {0}: must be in 0..=i64::MAX - 1")]
    InvalidSequence(i64),

    /// `Log::remove` refused a path that is too short to be deleted safely.
    #[error("refusing to remove unsafe path {0:?}")]
    UnsafePath(String),

    /// The configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A filesystem error outside the backing store (directory removal).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generator or registry lock was poisoned by a panicking thread.
    #[error("log lock poisoned")]
    LockPoisoned,
}

impl LogError {
    /// True for the expected "nothing stored here" outcome, as opposed to
    /// corruption or I/O failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LogError::NotFound { .. })
    }
}

/// Convenience type alias for log results.
pub type LogResult<T> = Result<T, LogError>;
