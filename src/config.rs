//! YAML configuration file support for dupguard.
//!
//! One file carries the settings of every layer: fingerprinting (including
//! normalization and similarity weights), batch analysis and streaming loop
//! detection. Every section and every field is optional; anything left out
//! takes its default.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # dupguard configuration
//! version: "1.0"
//! name: "completions"
//!
//! perceptual:
//!   version: 1
//!   cache_capacity: 1000
//!   eviction: insertion_order
//!   use_parallel: false
//!   max_edit_chars: 2000
//!   weights:
//!     edit: 0.5
//!     jaccard: 0.3
//!     cosine: 0.2
//!   canonical:
//!     lowercase: false
//!
//! analyzer:
//!   similarity_threshold: 0.8
//!   min_block_size: 20
//!   detect_distributed: true
//!   window_size: 10
//!   detect_structural: false
//!
//! stream:
//!   similarity_threshold: 0.9
//!   max_repeat_window: 20
//!   near_duplicate_requires_precedent: true
//!   disabled_checks: [template_markers]
//! ```

use std::fs;
use std::path::Path;

use detector::{AnalyzerConfig, StreamConfig};
use perceptual::PerceptualConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the whole detector stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DupGuardConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Fingerprinting, normalization and similarity weights
    #[serde(default)]
    pub perceptual: PerceptualConfig,

    /// Batch duplicate analysis
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Streaming loop detection
    #[serde(default)]
    pub stream: StreamConfig,
}

impl DupGuardConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: DupGuardConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.perceptual
            .validate()
            .map_err(|err| section_error("perceptual", err))?;
        self.analyzer
            .validate()
            .map_err(|err| section_error("analyzer", err))?;
        self.stream
            .validate()
            .map_err(|err| section_error("stream", err))?;

        Ok(())
    }
}

impl Default for DupGuardConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            name: None,
            perceptual: PerceptualConfig::default(),
            analyzer: AnalyzerConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

fn section_error(section: &str, err: impl std::fmt::Display) -> ConfigLoadError {
    ConfigLoadError::Validation(format!("{section}: {err}"))
}

fn default_format_version() -> String {
    "1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use detector::LoopCheck;
    use perceptual::EvictionPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
analyzer:
  min_block_size: 40
stream:
  disabled_checks: [template_markers, character_repetition]
"#;

        let config = DupGuardConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.analyzer.min_block_size, 40);
        assert_eq!(config.analyzer.similarity_threshold, 0.8);
        assert!(!config.stream.is_enabled(LoopCheck::TemplateMarkers));
        assert!(!config.stream.is_enabled(LoopCheck::CharacterRepetition));
        assert!(config.stream.is_enabled(LoopCheck::ExactDuplicate));
    }

    #[test]
    fn test_empty_document_takes_defaults() {
        let config = DupGuardConfig::from_yaml("{}").unwrap();
        assert_eq!(config, DupGuardConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
perceptual:
  cache_capacity: 64
  eviction: least_recently_used
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = DupGuardConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.perceptual.cache_capacity, 64);
        assert_eq!(config.perceptual.eviction, EvictionPolicy::LeastRecentlyUsed);
    }

    #[test]
    fn test_missing_file() {
        let result = DupGuardConfig::from_file("/definitely/not/here/dupguard.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let result = DupGuardConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"));
    }

    #[test]
    fn test_threshold_validation() {
        let yaml = r#"
analyzer:
  similarity_threshold: 1.5
"#;

        let result = DupGuardConfig::from_yaml(yaml);
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
        assert!(err.to_string().contains("analyzer"));
        assert!(err.to_string().contains("similarity_threshold"));
    }

    #[test]
    fn test_window_validation() {
        let yaml = r#"
stream:
  max_repeat_window: 0
"#;
        let err = DupGuardConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("max_repeat_window"));
    }

    #[test]
    fn test_bad_weights_rejected() {
        let yaml = r#"
perceptual:
  weights:
    edit: -1.0
"#;
        let err = DupGuardConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().starts_with("validation error: perceptual"));
    }

    #[test]
    fn test_unknown_check_is_a_parse_error() {
        let yaml = r#"
stream:
  disabled_checks: [not_a_check]
"#;
        let result = DupGuardConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
    }

    #[test]
    fn test_full_yaml_roundtrip() {
        let mut config = DupGuardConfig {
            name: Some("production".into()),
            ..Default::default()
        };
        config.analyzer = config.analyzer.with_detect_structural(true);
        config.stream = config.stream.disable(LoopCheck::BlockRepetition);

        let yaml = config.to_yaml().unwrap();
        let parsed = DupGuardConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
