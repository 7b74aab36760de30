//! Configuration types for the canonical normalization layer.
//!
//! This module defines [`CanonicalizeConfig`], which controls how a text unit
//! is normalized before it is hashed or tokenized.
//!
//! # Versioning
//!
//! Any change to normalization behavior (even bug fixes) must be accompanied
//! by a version bump, so callers persisting exact hashes can tell which
//! normalization produced them.
//!
//! # Examples
//!
//! ```rust
//! use canonical::CanonicalizeConfig;
//!
//! let config = CanonicalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.strip_comments);
//! assert!(!config.normalize_unicode);
//! assert!(config.lowercase);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Configuration for the canonical normalization pipeline.
///
/// Cheap to clone and serializable:
///
/// ```json
/// {
///   "version": 1,
///   "strip_comments": true,
///   "normalize_unicode": false,
///   "lowercase": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CanonicalizeConfig {
    /// Version of the normalization behavior. Must be >= 1; version 0 is
    /// reserved and rejected by [`CanonicalizeConfig::validate`].
    pub version: u32,

    /// Remove comments according to the language's comment syntax before
    /// anything else. Comments never count towards duplication.
    pub strip_comments: bool,

    /// Apply Unicode NFKC normalization after comment stripping.
    ///
    /// Off by default: source code is overwhelmingly ASCII and composed and
    /// decomposed forms are rare in generated completions.
    pub normalize_unicode: bool,

    /// Apply locale-free Unicode lowercasing.
    pub lowercase: bool,
}

impl CanonicalizeConfig {
    /// Create a new configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip_comments(mut self, strip_comments: bool) -> Self {
        self.strip_comments = strip_comments;
        self
    }

    pub fn with_normalize_unicode(mut self, normalize_unicode: bool) -> Self {
        self.normalize_unicode = normalize_unicode;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CanonicalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            strip_comments: true,
            normalize_unicode: false,
            lowercase: true,
        }
    }
}
