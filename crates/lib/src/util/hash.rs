//! Hashing utilities for content identity and canonical artifact names.
//!
//! This module provides:
//! - `ContentHash`: a full 64-character SHA-256 hash of some bytes
//! - `identity_token()`: the 32-bit content identity stored in idmap headers
//! - `path_hash()`: a truncated hash naming store entries after a path

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::consts::CANONICAL_HASH_LEN;

/// A full 64-character SHA-256 hash for content verification.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash arbitrary bytes.
///
/// Returns the full 64-character SHA256 hash.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(hex::encode(Sha256::digest(data)))
}

/// Compute the 32-bit identity token of a package's raw bytes.
///
/// The token is the first four bytes of the SHA-256 digest read as a
/// little-endian word. Any change to the bytes changes the token with
/// overwhelming probability, which is all staleness detection needs.
pub fn identity_token(data: &[u8]) -> u32 {
  let digest = Sha256::digest(data);
  u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Hash a filesystem path into a short, stable hex label.
///
/// The path is hashed by its platform byte representation, so the label only
/// depends on the path text and never on the file's contents.
pub fn path_hash(path: &Path) -> String {
  let full = hash_bytes(path.as_os_str().as_encoded_bytes());
  full.0[..CANONICAL_HASH_LEN].to_string()
}
