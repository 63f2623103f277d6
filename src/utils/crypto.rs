//! Cryptographic utilities

use sha2::{Digest, Sha256};

/// Hash a string using SHA-256
pub fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Deterministic check-in code for a registration.
///
/// Stand-in for a real QR payload: the first 16 hex chars of
/// `sha256("{registration_id}:{secret}")`, upper-cased.
pub fn check_in_code(registration_id: i64, secret: &str) -> String {
    hash_string(&format!("{registration_id}:{secret}"))[..16].to_uppercase()
}
