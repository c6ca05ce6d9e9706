//! Hashing helpers.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hashes an ordered list of parts into one fingerprint.
///
/// Parts are joined with a unit separator so `["ab", "c"]` and `["a", "bc"]`
/// never collide.
pub fn fingerprint(parts: &[&str]) -> String {
    sha256_hex(&parts.join("\u{1f}"))
}
