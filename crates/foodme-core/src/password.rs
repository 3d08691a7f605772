//! Salted password hashing and random password generation.
//!
//! Stored format is `<iterations>$<salt hex>$<digest hex>`, where the digest
//! is SHA-256 over `salt || password`, re-hashed `iterations - 1` more times.

use std::fmt::Write as _;

use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const ITERATIONS: u32 = 10_000;
const SALT_LEN: usize = 16;

/// Hash `password` with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let digest = stretch(&salt, password, ITERATIONS);
    format!("{ITERATIONS}${}${}", to_hex(&salt), to_hex(&digest))
}

/// Check `password` against a hash produced by [`hash_password`].
///
/// Malformed stored hashes never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(iterations), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Some(salt), Some(expected)) = (from_hex(salt), from_hex(expected)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = stretch(&salt, password, iterations);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

/// Random alphanumeric password of exactly `length` characters.
#[must_use]
pub fn generate_random_password(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn stretch(salt: &[u8], password: &str, iterations: u32) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..iterations {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt);
        digest = hasher.finalize();
    }

    digest.to_vec()
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() || s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}
