//! Configuration and error types for dupguard fingerprinting.
//!
//! The fingerprint of a text is a pure function of `(text, language, config)`.
//! Nothing in here performs I/O or consults the environment.

use canonical::{CanonicalError, CanonicalizeConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::similarity::SimilarityWeights;

/// Which cache entry is evicted when a full cache receives a new text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Evict the entry inserted first. Lookups never reorder entries.
    #[default]
    InsertionOrder,
    /// Evict the entry looked up least recently. Hits promote the entry.
    LeastRecentlyUsed,
}

/// Configuration for the fingerprint and similarity engines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect a fingerprint must bump this
    /// version.
    pub version: u32,
    /// Seed for the SimHash token hash. Same seed, same text, same config
    /// give bit-identical signatures.
    pub seed: u64,
    /// Maximum number of cached fingerprints. `0` disables caching.
    pub cache_capacity: usize,
    /// Eviction order once `cache_capacity` is reached.
    pub eviction: EvictionPolicy,
    /// Fingerprint uncached batch entries on the rayon pool.
    pub use_parallel: bool,
    /// Edit-distance inputs are truncated to this many chars.
    ///
    /// Levenshtein is quadratic; the cap bounds the worst case for very long
    /// blocks.
    pub max_edit_chars: usize,
    /// Weights of the combined similarity score.
    pub weights: SimilarityWeights,
    /// Normalization applied before hashing and tokenizing.
    pub canonical: CanonicalizeConfig,
}

impl PerceptualConfig {
    /// Create a new configuration with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the cache capacity. `0` turns the cache off entirely.
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Enable or disable parallel batch fingerprinting.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_max_edit_chars(mut self, max_edit_chars: usize) -> Self {
        self.max_edit_chars = max_edit_chars;
        self
    }

    pub fn with_weights(mut self, weights: SimilarityWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_canonical(mut self, canonical: CanonicalizeConfig) -> Self {
        self.canonical = canonical;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.max_edit_chars < 1 {
            return Err(PerceptualError::InvalidEditSpan {
                max_edit_chars: self.max_edit_chars,
            });
        }
        self.weights.validate()?;
        self.canonical.validate()?;
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            seed: 0xF00D_BAAD_F00D_BAAD,
            cache_capacity: 1000,
            eviction: EvictionPolicy::InsertionOrder,
            use_parallel: false,
            max_edit_chars: 2000,
            weights: SimilarityWeights::default(),
            canonical: CanonicalizeConfig::default(),
        }
    }
}

/// Errors returned when validating fingerprint configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PerceptualError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: max_edit_chars must be >= 1 (got {max_edit_chars})")]
    InvalidEditSpan { max_edit_chars: usize },

    #[error("invalid similarity weights: {0}")]
    InvalidWeights(String),

    #[error("invalid canonical config: {0}")]
    Canonical(#[from] CanonicalError),
}
