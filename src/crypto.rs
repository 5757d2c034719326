//! Cryptographic helpers: SHA-256 fingerprinting of block fields.

use sha2::{Digest, Sha256};

/// Domain tag prepended to every block fingerprint.
const BLOCK_DOMAIN: &[u8] = b"heartbeat-block-v1:";

/// Hash inputs (concatenate as bytes, SHA-256) and return lowercase hex.
pub fn hash_concat(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p);
    }
    hex::encode(hasher.finalize())
}

/// Fingerprint a block from its own fields.
///
/// Integers are fixed-width little-endian; strings carry an 8-byte length
/// prefix so no two field tuples share an encoding.
pub fn fingerprint(index: u64, value: i64, timestamp: &str, prev_hash: &str) -> String {
    let ts_len = (timestamp.len() as u64).to_le_bytes();
    let prev_len = (prev_hash.len() as u64).to_le_bytes();
    hash_concat(&[
        BLOCK_DOMAIN,
        &index.to_le_bytes(),
        &value.to_le_bytes(),
        &ts_len,
        timestamp.as_bytes(),
        &prev_len,
        prev_hash.as_bytes(),
    ])
}
