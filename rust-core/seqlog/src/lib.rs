// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SeqLog
//
// An append-only log of records, one independent sequence per address, kept
// in an embedded ordered key-value store. Each record lives under the
// composite key `address ++ sequence (i64 big-endian)`, so the store's byte
// ordering is the log ordering: range reads are forward scans and the last
// sequence of an address is a single reverse seek. No counter is persisted.
//
// # Modules
//
// - [`key`] -- Composite key codec.
// - [`record`] -- The `Record` serialization contract (protobuf or JSON).
// - [`store`] -- Typed get/put/range over a `StorageBackend`.
// - [`sequence`] -- Per-address sequence generators.
// - [`log`] -- The `Log` facade and its generator registry.
// - [`config`] -- `LogConfig` for choosing and tuning the backend.
// - [`error`] -- `LogError`.
//
// # Example
//
// ```rust
// use seqlog::{Json, Log};
//
// let dir = tempfile::tempdir().unwrap();
// let log = Log::open(dir.path().join("events")).unwrap();
//
// let generator = log.sequence_generator_for(b"hello").unwrap();
// for n in 0..10u32 {
//     generator.append(&Json(n)).unwrap();
// }
//
// assert_eq!(log.last_sequence(b"hello").unwrap(), 10);
// let read = log.get_range::<Json<u32>>(b"hello", 4, 8);
// assert!(read.is_complete());
// assert_eq!(read.len(), 4);
// ```

pub mod config;
pub mod error;
pub mod key;
pub mod log;
pub mod record;
pub mod sequence;
pub mod store;

pub use config::{BackendKind, LogConfig, DEFAULT_FILE_NAME};
pub use error::{LogError, LogResult};
pub use key::{
    decode_key, encode_key, is_exact_key_for, key_contains_address, sequence_range, MAX_SEQUENCE,
    NO_ENTRIES, NO_OFFSET, SEQUENCE_WIDTH,
};
pub use log::{Log, MIN_REMOVE_PATH_LEN};
pub use record::{Json, Record};
pub use sequence::SequenceGenerator;
pub use store::{RangeRead, RecordStore};

pub use seqlog_storage::{InMemoryBackend, MetricsBackend, RedbBackend, StorageBackend, StorageError};
