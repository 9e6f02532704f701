//! # Hashing Utilities
//!
//! SHA-256 in the three shapes the rest of the crate wants: a `Vec<u8>` for
//! call sites that pass the digest straight into `&[u8]` APIs, a `[u8; 32]`
//! for addresses and seeds, and a multi-part variant that hashes several
//! slices without concatenating them first.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use ledger_loadtest::crypto::sha256;
///
/// let hash = sha256(b"ledger load test");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices as if they were concatenated.
///
/// Used for domain-separated derivations such as `tag || alias`, where a
/// temporary buffer would only exist to be thrown away.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
