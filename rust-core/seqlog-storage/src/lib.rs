// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SeqLog Storage Backends
//
// This crate provides the ordered key-value layer underneath SeqLog. The
// `StorageBackend` trait captures exactly what the log needs from an embedded
// store: point reads, single-key atomic writes, bounded forward iteration and
// a reverse seek to the last key of a range. Keys compare byte-lexicographically.
//
// # Modules
//
// - [`backend`] -- The `StorageBackend` trait.
// - [`error`] -- The `StorageError` enum covering all backend failure modes.
// - [`memory`] -- An in-memory `BTreeMap`-based backend for tests and
//   ephemeral logs.
// - [`metrics`] -- A transparent wrapper that collects operation statistics.
// - [`redb_backend`] -- The persistent single-file redb backend.
//
// # Example
//
// ```rust
// use std::ops::ControlFlow;
// use seqlog_storage::{InMemoryBackend, MetricsBackend, StorageBackend};
//
// let store = MetricsBackend::new(InMemoryBackend::new());
// store.put(b"a1", b"one").unwrap();
// store.put(b"a2", b"two").unwrap();
//
// let mut seen = Vec::new();
// store
//     .scan_range(b"a1", b"a3", &mut |key, _value| {
//         seen.push(key.to_vec());
//         ControlFlow::Continue(())
//     })
//     .unwrap();
// assert_eq!(seen.len(), 2);
// assert_eq!(store.last_key_in_range(b"a", b"b").unwrap(), Some(b"a2".to_vec()));
// assert_eq!(store.stats().put_count, 2);
// ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod metrics;

// Persistent backend, on by default.
#[cfg(feature = "redb-backend")]
pub mod redb_backend;

pub use backend::{RangeVisitor, StorageBackend};
pub use error::StorageError;
pub use memory::InMemoryBackend;
pub use metrics::{BackendStats, MetricsBackend};

#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;
