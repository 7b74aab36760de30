//! The fingerprint record.
//!
//! A [`Fingerprint`] carries everything duplicate detection compares: the
//! exact hash of the normalized text, its SimHash, its tokens, and a few raw
//! size counters. Fingerprints are immutable once computed and are shared as
//! `Arc<Fingerprint>` by the engine cache.

use canonical::{hash_text, normalize, tokenize_words};
use serde::{Deserialize, Serialize};

use crate::config::PerceptualConfig;
use crate::simhash::SimHash;

/// Exact and approximate identity of one text unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fingerprint {
    /// Hex SHA-256 of `normalized_text`.
    pub exact_hash: String,
    /// 64-bit SimHash over `tokens`.
    pub similarity_hash: SimHash,
    /// Tokens of the normalized text, in order.
    pub tokens: Vec<String>,
    /// Comment-stripped, whitespace-collapsed, lowercased text.
    pub normalized_text: String,
    /// Lines in the raw text.
    pub line_count: usize,
    /// Chars in the raw text.
    pub char_count: usize,
}

impl Fingerprint {
    /// Fingerprint `text` without any caching.
    pub fn compute(text: &str, language_id: &str, cfg: &PerceptualConfig) -> Self {
        let normalized_text = normalize(text, language_id, &cfg.canonical);
        let tokens = tokenize_words(&normalized_text);
        let similarity_hash = SimHash::from_tokens(&tokens, cfg.seed);

        Self {
            exact_hash: hash_text(&normalized_text),
            similarity_hash,
            tokens,
            normalized_text,
            line_count: text.lines().count(),
            char_count: text.chars().count(),
        }
    }

    /// Same normalized text.
    #[inline]
    pub fn is_exact_match(&self, other: &Fingerprint) -> bool {
        self.exact_hash == other.exact_hash
    }

    /// SimHash Hamming similarity to `other`.
    #[inline]
    pub fn hamming_similarity(&self, other: &Fingerprint) -> f64 {
        self.similarity_hash.similarity(other.similarity_hash)
    }
}
