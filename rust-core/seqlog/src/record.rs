// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Record serialization contract.
//
// The log never inspects record contents. Callers pick the record type at
// each read through the `Record` type parameter; protobuf messages work out
// of the box, and any serde type can be stored through the `Json` wrapper.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// A value that can be stored in the log.
///
/// Decoding reports failures through [`LogError::Decode`] with sequence
/// `-1`; the record store fills in the real sequence number.
pub trait Record: Sized {
    /// Serialize the record to bytes.
    fn encode_record(&self) -> Result<Vec<u8>, LogError>;

    /// Parse a record from stored bytes.
    fn decode_record(bytes: &[u8]) -> Result<Self, LogError>;
}

impl<M> Record for M
where
    M: prost::Message + Default,
{
    fn encode_record(&self) -> Result<Vec<u8>, LogError> {
        Ok(self.encode_to_vec())
    }

    fn decode_record(bytes: &[u8]) -> Result<Self, LogError> {
        M::decode(bytes).map_err(|e| LogError::Decode {
            sequence: -1,
            reason: e.to_string(),
        })
    }
}

/// Stores any serde-serializable value as JSON.
///
/// # Example
///
/// ```rust
/// use seqlog::{Json, Record};
///
/// let encoded = Json(vec![1u32, 2, 3]).encode_record().unwrap();
/// let Json(decoded) = Json::<Vec<u32>>::decode_record(&encoded).unwrap();
/// assert_eq!(decoded, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Record for Json<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode_record(&self) -> Result<Vec<u8>, LogError> {
        serde_json::to_vec(&self.0).map_err(|e| LogError::Serialization(e.to_string()))
    }

    fn decode_record(bytes: &[u8]) -> Result<Self, LogError> {
        serde_json::from_slice(bytes).map(Json).map_err(|e| LogError::Decode {
            sequence: -1,
            reason: e.to_string(),
        })
    }
}

/// Attach the sequence number to a decode failure raised by a `Record` impl.
pub(crate) fn at_sequence(err: LogError, seq: i64) -> LogError {
    match err {
        LogError::Decode { reason, .. } => LogError::Decode {
            sequence: seq,
            reason,
        },
        other => other,
    }
}
