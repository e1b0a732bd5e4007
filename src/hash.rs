//! BLAKE3 digests of unit bytes

use blake3::Hasher;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Length of the hex part kept by `short_digest`
const SHORT_LEN: usize = 12;

/// Full digest of `bytes`, as `blake3:<hex>`
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}

/// Abbreviated hex digest for listings and logs
pub fn short_digest(bytes: &[u8]) -> String {
    let hex = blake3::hash(bytes).to_hex();
    hex[..SHORT_LEN].to_string()
}
