// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Record store: typed get/put/range over composite keys.
//
// A thin adapter between the log and a `StorageBackend`. Writes encode the
// record and perform one blocking put; reads decode into a caller-chosen
// `Record` type. No application-level locking happens here: concurrent reads
// see either the pre- or post-write state of any key, never a partial write.

use std::ops::ControlFlow;
use std::sync::Arc;

use seqlog_storage::StorageBackend;
use tracing::{trace, warn};

use crate::error::{LogError, LogResult};
use crate::key::{
    decode_key, display_address, encode_key, is_exact_key_for, key_contains_address,
    sequence_range, MAX_SEQUENCE, NO_ENTRIES, NO_OFFSET,
};
use crate::record::{at_sequence, Record};

/// Outcome of a range read.
///
/// Scans stop at the first undecodable entry and keep what they already
/// decoded, so callers must look at both fields.
#[derive(Debug)]
pub struct RangeRead<T> {
    /// Records decoded before the scan finished or stopped, in ascending
    /// sequence order.
    pub records: Vec<T>,
    /// The failure that stopped the scan early, if any.
    pub error: Option<LogError>,
}

impl<T> RangeRead<T> {
    fn complete(records: Vec<T>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    /// True when the scan covered the whole requested range.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Number of records read.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records were read.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Discard partial results on failure.
    pub fn into_result(self) -> LogResult<Vec<T>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

/// Typed access to records stored under composite `(address, sequence)` keys.
pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
}

impl RecordStore {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Encode `record` and write it under `(address, seq)`, replacing any
    /// previous value.
    pub fn put<T: Record>(&self, address: &[u8], seq: i64, record: &T) -> LogResult<()> {
        if !(0..=MAX_SEQUENCE).contains(&seq) {
            return Err(LogError::InvalidSequence(seq));
        }
        let value = record.encode_record()?;
        let key = encode_key(address, seq);
        self.backend.put(&key, &value).map_err(LogError::StoreWrite)?;

        trace!(address = %display_address(address), seq, bytes = value.len(), "wrote record");
        Ok(())
    }

    /// Read and decode the record at `(address, seq)`.
    pub fn get<T: Record>(&self, address: &[u8], seq: i64) -> LogResult<T> {
        let bytes = self.get_raw(&encode_key(address, seq))?.ok_or_else(|| {
            LogError::NotFound {
                address: display_address(address),
                sequence: seq,
            }
        })?;
        T::decode_record(&bytes).map_err(|e| at_sequence(e, seq))
    }

    /// Read the raw bytes stored under a full composite key.
    pub fn get_raw(&self, key: &[u8]) -> LogResult<Option<Vec<u8>>> {
        self.backend.get(key).map_err(LogError::StoreRead)
    }

    /// Read records with sequence numbers in `[start, end)`.
    ///
    /// At most `end - start` records are returned. The scan stops early,
    /// keeping earlier records, when a key no longer contains the address
    /// bytes (it has run into another address's key space) or when a value
    /// fails to decode.
    pub fn get_range<T: Record>(&self, address: &[u8], start: i64, end: i64) -> RangeRead<T> {
        if end <= start {
            return RangeRead::complete(Vec::new());
        }
        let capacity = usize::try_from(end.saturating_sub(start)).unwrap_or(usize::MAX);
        let (lower, upper) = sequence_range(address, start, end);

        let mut records: Vec<T> = Vec::with_capacity(capacity.min(1024));
        let mut failure: Option<LogError> = None;

        let scanned = self.backend.scan_range(&lower, &upper, &mut |key, value| {
            if records.len() >= capacity {
                return ControlFlow::Break(());
            }
            if !key_contains_address(key, address) {
                warn!(
                    address = %display_address(address),
                    key = %display_address(key),
                    "range scan left the address key space; stopping"
                );
                return ControlFlow::Break(());
            }
            match T::decode_record(value) {
                Ok(record) => {
                    records.push(record);
                    ControlFlow::Continue(())
                }
                Err(e) => {
                    let seq = decode_key(key, address).unwrap_or(NO_ENTRIES);
                    warn!(
                        address = %display_address(address),
                        seq,
                        error = %e,
                        "range scan stopped at undecodable record"
                    );
                    failure = Some(at_sequence(e, seq));
                    ControlFlow::Break(())
                }
            }
        });

        if let Err(e) = scanned {
            if failure.is_none() {
                failure = Some(LogError::StoreRead(e));
            }
        }

        RangeRead {
            records,
            error: failure,
        }
    }

    /// Highest sequence number stored for `address`, or `NO_ENTRIES` (-1)
    /// when the address has never been written.
    ///
    /// Costs one reverse seek over `[encode_key(address, 0),
    /// encode_key(address, i64::MAX))`.
    pub fn last_sequence(&self, address: &[u8]) -> LogResult<i64> {
        let (lower, upper) = sequence_range(address, NO_OFFSET, i64::MAX);
        let last = self
            .backend
            .last_key_in_range(&lower, &upper)
            .map_err(LogError::StoreRead)?;

        let Some(key) = last else {
            return Ok(NO_ENTRIES);
        };

        if !is_exact_key_for(&key, address) {
            // The last key belongs to a longer address sharing this prefix.
            warn!(
                address = %display_address(address),
                key = %display_address(&key),
                "last key in range is not an exact key for this address"
            );
        }
        Ok(decode_key(&key, address).unwrap_or(NO_ENTRIES))
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}
