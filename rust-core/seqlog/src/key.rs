// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Composite key codec.
//
// A key is the raw address bytes followed by the sequence number as a fixed
// 8-byte big-endian integer:
//
// ```text
// [N bytes: address][8 bytes: sequence (i64, big-endian)]
// ```
//
// For one address, keys of non-negative sequence numbers sort exactly like
// the numbers themselves, so the store's native ordering drives range scans
// and the last-sequence seek. The address is not length-prefixed: addresses
// that are proper prefixes of one another share key space.

/// Width of the encoded sequence suffix.
pub const SEQUENCE_WIDTH: usize = 8;

/// Highest sequence a record can be stored under. `i64::MAX` is the
/// exclusive upper bound of every whole-address scan and seek.
pub const MAX_SEQUENCE: i64 = i64::MAX - 1;

/// Sequence reported by `last_sequence` for an address with no entries.
pub const NO_ENTRIES: i64 = -1;

/// Range start meaning "from the beginning of the address".
pub const NO_OFFSET: i64 = 0;

/// Concatenate `address` with `seq` encoded big-endian.
pub fn encode_key(address: &[u8], seq: i64) -> Vec<u8> {
    let mut key = Vec::with_capacity(address.len() + SEQUENCE_WIDTH);
    key.extend_from_slice(address);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// Recover the sequence number from `key`, given the address it was built from.
///
/// Strips `address.len()` bytes and decodes the next eight. The prefix is not
/// compared against `address`. Returns `None` only when the key is too short
/// to carry a sequence suffix.
pub fn decode_key(key: &[u8], address: &[u8]) -> Option<i64> {
    let suffix = key.get(address.len()..address.len() + SEQUENCE_WIDTH)?;
    let bytes: [u8; SEQUENCE_WIDTH] = suffix.try_into().ok()?;
    Some(i64::from_be_bytes(bytes))
}

/// Half-open key bounds `[encode_key(address, start), encode_key(address, end))`.
pub fn sequence_range(address: &[u8], start: i64, end: i64) -> (Vec<u8>, Vec<u8>) {
    (encode_key(address, start), encode_key(address, end))
}

/// True when `address` occurs anywhere in `key` as a contiguous byte run.
///
/// Range scans use this to notice they have wandered into another address's
/// key space. It is a heuristic: a neighbouring key that happens to contain
/// the address bytes still passes.
pub fn key_contains_address(key: &[u8], address: &[u8]) -> bool {
    if address.is_empty() {
        return true;
    }
    key.windows(address.len()).any(|window| window == address)
}

/// True when `key` is exactly one composite key for `address`.
///
/// A longer key in the same range belongs to an address that has `address`
/// as a proper prefix.
pub fn is_exact_key_for(key: &[u8], address: &[u8]) -> bool {
    key.len() == address.len() + SEQUENCE_WIDTH && key.starts_with(address)
}

/// Render an address for logs and error messages.
pub(crate) fn display_address(address: &[u8]) -> String {
    address.escape_ascii().to_string()
}
