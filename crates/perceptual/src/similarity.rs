//! Continuous [0, 1] similarity between two text units.
//!
//! Three independent metrics are combined with [`SimilarityWeights`]:
//! character edit distance, token-set Jaccard and token-frequency cosine.
//! [`hamming_similarity`] compares two precomputed SimHash signatures without
//! touching the texts at all.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::PerceptualError;
use crate::fingerprint::Fingerprint;
use crate::simhash::SimHash;

/// Default cap on edit-distance input length, in chars.
pub const DEFAULT_MAX_EDIT_CHARS: usize = 2000;

/// Weights of the combined similarity score.
///
/// The combined score is normalized by the weight sum, so any non-negative
/// weights with a positive sum keep the result in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub edit: f64,
    pub jaccard: f64,
    pub cosine: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            edit: 0.5,
            jaccard: 0.3,
            cosine: 0.2,
        }
    }
}

impl SimilarityWeights {
    /// Validate that all weights are finite, non-negative, and not all zero.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        for (name, value) in [
            ("edit", self.edit),
            ("jaccard", self.jaccard),
            ("cosine", self.cosine),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PerceptualError::InvalidWeights(format!(
                    "{name} weight must be a finite non-negative number (got {value})"
                )));
            }
        }
        if self.total() <= 0.0 {
            return Err(PerceptualError::InvalidWeights(
                "weights must not all be zero".into(),
            ));
        }
        Ok(())
    }

    #[inline]
    fn total(&self) -> f64 {
        self.edit + self.jaccard + self.cosine
    }

    /// Weighted mean of the three metric scores, clamped to [0, 1].
    pub fn combine(&self, edit: f64, jaccard: f64, cosine: f64) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        let score = (edit * self.edit + jaccard * self.jaccard + cosine * self.cosine) / total;
        score.clamp(0.0, 1.0)
    }
}

/// Levenshtein distance over chars with a two-row table.
///
/// ```rust
/// use perceptual::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    // Keep the row over the shorter input.
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

/// `1 - distance / max(len_a, len_b)` after truncating both inputs to
/// `max_chars` chars. Two empty inputs are identical.
pub fn edit_similarity(a: &str, b: &str, max_chars: usize) -> f64 {
    let a: Vec<char> = a.chars().take(max_chars).collect();
    let b: Vec<char> = b.chars().take(max_chars).collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    let distance = levenshtein_chars(&a, &b);
    (1.0 - distance as f64 / longest as f64).clamp(0.0, 1.0)
}

/// `|A ∩ B| / |A ∪ B|` over token sets. Two empty sets score 0.
pub fn jaccard_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let set_a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let set_b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Cosine of the token frequency vectors. 0 when either side has no tokens.
pub fn cosine_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let freq_a = frequencies(a);
    let freq_b = frequencies(b);
    if freq_a.is_empty() || freq_b.is_empty() {
        return 0.0;
    }

    let dot: f64 = freq_a
        .iter()
        .filter_map(|(token, &ca)| freq_b.get(token).map(|&cb| ca * cb))
        .sum();
    let norm_a = freq_a.values().map(|c| c * c).sum::<f64>().sqrt();
    let norm_b = freq_b.values().map(|c| c * c).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn frequencies<S: AsRef<str>>(tokens: &[S]) -> HashMap<&str, f64> {
    let mut freq = HashMap::with_capacity(tokens.len());
    for token in tokens {
        *freq.entry(token.as_ref()).or_insert(0.0) += 1.0;
    }
    freq
}

/// `1 - hamming_distance / 64`.
#[inline]
pub fn hamming_similarity(a: SimHash, b: SimHash) -> f64 {
    a.similarity(b)
}

/// Combined similarity of two texts with explicit token lists.
pub fn weighted_similarity<S: AsRef<str>>(
    text_a: &str,
    tokens_a: &[S],
    text_b: &str,
    tokens_b: &[S],
    weights: &SimilarityWeights,
    max_edit_chars: usize,
) -> f64 {
    if text_a == text_b {
        return 1.0;
    }
    let edit = edit_similarity(text_a, text_b, max_edit_chars);
    let jaccard = jaccard_similarity(tokens_a, tokens_b);
    let cosine = cosine_similarity(tokens_a, tokens_b);
    weights.combine(edit, jaccard, cosine)
}

/// Combined similarity of two fingerprints, over their normalized texts and
/// tokens.
pub fn fingerprint_similarity(
    a: &Fingerprint,
    b: &Fingerprint,
    weights: &SimilarityWeights,
    max_edit_chars: usize,
) -> f64 {
    if a.is_exact_match(b) {
        return 1.0;
    }
    weighted_similarity(
        &a.normalized_text,
        &a.tokens,
        &b.normalized_text,
        &b.tokens,
        weights,
        max_edit_chars,
    )
}

/// Combined similarity of two raw texts with default weights and edit cap.
///
/// Symmetric, in [0, 1], and exactly 1 for identical inputs.
///
/// ```rust
/// use perceptual::similarity;
///
/// assert_eq!(similarity("let x = 1;", "let x = 1;"), 1.0);
/// let s = similarity("let x = 1;", "let y = 2;");
/// assert!(s > 0.0 && s < 1.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let tokens_a = canonical::tokenize_words(a);
    let tokens_b = canonical::tokenize_words(b);
    weighted_similarity(
        a,
        &tokens_a,
        b,
        &tokens_b,
        &SimilarityWeights::default(),
        DEFAULT_MAX_EDIT_CHARS,
    )
}
