//! Salted password hashing.
//!
//! Stored form is `"<salt>:<digest>"`, both hex-encoded. The digest is
//! SHA-512 over `salt || password`, re-hashed for a fixed number of
//! rounds. Verification recomputes with the stored salt and compares.

use rand::RngCore;
use sha2::{Digest, Sha512};

const SALT_LEN: usize = 10;
const ROUNDS: usize = 1000;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);
    let digest = stretch(&salt_hex, password);
    format!("{salt_hex}:{digest}")
}

/// Check a candidate password against a stored `"<salt>:<digest>"` value.
/// Malformed stored values never verify.
pub fn verify_password(candidate: &str, stored: &str) -> bool {
    let Some((salt_hex, digest)) = stored.split_once(':') else {
        return false;
    };
    stretch(salt_hex, candidate) == digest
}

fn stretch(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..ROUNDS {
        let mut hasher = Sha512::new();
        hasher.update(&digest);
        digest = hasher.finalize();
    }

    hex::encode(digest)
}
