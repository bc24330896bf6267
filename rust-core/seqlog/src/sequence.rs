// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-address sequence generator.
//
// Each address gets one generator for the lifetime of its `Log`. The counter
// is recovered once from the store (a single reverse seek) and then lives in
// memory; nothing besides the records themselves is persisted. Appends to one
// address are serialised by the generator's own mutex, appends to different
// addresses never contend.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{LogError, LogResult};
use crate::key::{display_address, MAX_SEQUENCE};
use crate::record::Record;
use crate::store::RecordStore;

/// Monotonic sequence counter for a single address.
pub struct SequenceGenerator {
    address: Vec<u8>,
    store: Arc<RecordStore>,
    /// Last sequence number handed out (or recovered from the store).
    counter: Mutex<i64>,
}

impl SequenceGenerator {
    /// Create a generator for `address`, recovering its counter from the
    /// highest sequence already stored.
    ///
    /// An address with no entries starts at 0, so its first append is 1.
    pub fn open(address: &[u8], store: Arc<RecordStore>) -> LogResult<Self> {
        let last = store.last_sequence(address)?;
        let counter = last.max(0);

        debug!(
            address = %display_address(address),
            last_sequence = last,
            "initialised sequence generator"
        );

        Ok(Self {
            address: address.to_vec(),
            store,
            counter: Mutex::new(counter),
        })
    }

    /// Append `record` under the next sequence number and return that number.
    ///
    /// The counter advances before the write is attempted. If the write
    /// fails, that number is never reused and the address keeps a gap.
    /// Once the counter reaches [`MAX_SEQUENCE`] every append fails with
    /// [`LogError::InvalidSequence`] and the counter stays put.
    pub fn append<T: Record>(&self, record: &T) -> LogResult<i64> {
        let mut counter = self.counter.lock().map_err(|_| LogError::LockPoisoned)?;
        let seq = counter
            .checked_add(1)
            .filter(|next| *next <= MAX_SEQUENCE)
            .ok_or(LogError::InvalidSequence(counter.saturating_add(1)))?;
        *counter = seq;
        self.store.put(&self.address, seq, record)?;
        Ok(seq)
    }

    /// The last sequence number assigned, including failed attempts.
    pub fn current(&self) -> LogResult<i64> {
        let counter = self.counter.lock().map_err(|_| LogError::LockPoisoned)?;
        Ok(*counter)
    }

    /// The address this generator appends to.
    pub fn address(&self) -> &[u8] {
        &self.address
    }
}

impl std::fmt::Debug for SequenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceGenerator")
            .field("address", &display_address(&self.address))
            .field("counter", &self.counter)
            .finish()
    }
}
