//! # dupguard Fingerprinting and Similarity
//!
//! This crate turns a text unit (a line or a block of code) into a
//! [`Fingerprint`] supporting both exact-equality and approximate-similarity
//! checks, and scores how similar two text units are.
//!
//! ## Contract
//!
//! - Normalization and tokenization are delegated to the `canonical` crate.
//! - Fingerprinting is a pure function of `(text, language, config)`; the
//!   [`FingerprintEngine`] only adds memoization on top.
//! - Every similarity score lies in [0, 1], is symmetric, and is exactly 1
//!   for identical inputs.
//!
//! ## Fingerprint
//!
//! 1.  **Exact hash**: hex SHA-256 of the normalized text. Two texts that only
//!     differ in comments, whitespace, or case share it.
//! 2.  **SimHash**: a 64-bit signature where every token votes on every bit.
//!     Texts with many shared tokens end up a small Hamming distance apart,
//!     so near duplicates can be screened without touching the texts.
//! 3.  **Tokens**: the normalized text split on non-word characters.
//!
//! ## Similarity
//!
//! The combined score is `0.5 * edit + 0.3 * jaccard + 0.2 * cosine` by
//! default, where `edit` is the normalized Levenshtein similarity (inputs
//! capped at `max_edit_chars`), `jaccard` compares token sets and `cosine`
//! compares token frequency vectors.
//!
//! ## Cache
//!
//! Each engine owns a bounded cache keyed by raw text and language. On
//! overflow exactly one entry is evicted, chosen by [`EvictionPolicy`].
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{FingerprintEngine, PerceptualConfig};
//!
//! let engine = FingerprintEngine::new(PerceptualConfig::default()).unwrap();
//! let a = engine.fingerprint("let total = a + b; // sum", "javascript");
//! let b = engine.fingerprint("let  total = a + b;", "javascript");
//!
//! assert_eq!(a.exact_hash, b.exact_hash);
//! assert_eq!(engine.fingerprint_similarity(&a, &b), 1.0);
//! assert_eq!(engine.cache_stats().entries, 2);
//! ```
mod cache;
pub mod config;
mod engine;
pub mod fingerprint;
pub mod similarity;
mod simhash;

pub use crate::cache::CacheStats;
pub use crate::config::{EvictionPolicy, PerceptualConfig, PerceptualError};
pub use crate::engine::FingerprintEngine;
pub use crate::fingerprint::Fingerprint;
pub use crate::similarity::{
    cosine_similarity, edit_similarity, fingerprint_similarity, hamming_similarity,
    jaccard_similarity, levenshtein, similarity, weighted_similarity, SimilarityWeights,
    DEFAULT_MAX_EDIT_CHARS,
};
pub use crate::simhash::{hash_token, SimHash};
