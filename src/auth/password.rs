use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_LEN: usize = 64;

/// Deterministic SHA-256 digest of `plain`, lowercase hex.
///
/// Unsalted on purpose: digests already stored in the user table were written
/// this way and login compares digests directly.
pub fn hash_password(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

pub fn verify_password(plain: &str, digest: &str) -> bool {
    digest.len() == DIGEST_LEN && hash_password(plain) == digest
}
