// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for the composite key codec and the range scan guards

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqlog::{decode_key, encode_key, is_exact_key_for, key_contains_address, Json, Log};

fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    let (seq_bytes, address) = data.split_at(8);
    let seq = i64::from_be_bytes(seq_bytes.try_into().unwrap_or([0; 8]));

    let key = encode_key(address, seq);
    assert_eq!(decode_key(&key, address), Some(seq));
    assert!(is_exact_key_for(&key, address));
    assert!(key_contains_address(&key, address));

    // Decoding arbitrary bytes as a key must never panic.
    let _ = decode_key(data, address);

    // Stored garbage must surface as a decode error, not a panic.
    let log = Log::in_memory();
    if log.put(address, seq.max(0), &Json(address.len())).is_ok() {
        let _ = log.get::<Json<String>>(address, seq.max(0));
        let _ = log.get_range::<Json<String>>(address, 0, i64::MAX);
    }
});
