//! Exact-match hashing for normalized text.
//!
//! ```text
//! SHA-256(normalized_text_bytes) -> 64 hex chars
//! ```
//!
//! Two text units are exact duplicates iff their normalized forms hash equal.
//! Callers are expected to hash the output of [`normalize`](crate::normalize),
//! never raw text.

use sha2::{Digest, Sha256};

/// Hash text with SHA-256 and return a hex digest.
///
/// ```rust
/// use canonical::hash_text;
///
/// let hash = hash_text("hello world");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_text("hello world"));
/// assert_ne!(hash, hash_text("hello world!"));
/// ```
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
