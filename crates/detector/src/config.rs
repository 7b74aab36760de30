//! Configuration for batch analysis and streaming loop detection.
//!
//! Both structs are serde-friendly with per-field defaults, so partial
//! configs (for example a YAML section naming a single knob) deserialize into
//! a complete, valid configuration.

use serde::{Deserialize, Serialize};

use crate::batch::{MIN_PERIOD, MIN_REPEATS};
use crate::types::{DetectorError, LoopCheck};

/// Smallest scan window that can hold a pattern at all.
const MIN_SCAN_WINDOW: usize = MIN_PERIOD * MIN_REPEATS;

/// Configuration for [`crate::DuplicateAnalyzer`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Minimum SimHash similarity for a near-duplicate candidate.
    pub similarity_threshold: f64,
    /// Blocks whose trimmed content is shorter than this many chars are
    /// ignored entirely.
    pub min_block_size: usize,
    /// Run the distributed-pattern scan over individual lines.
    pub detect_distributed: bool,
    /// Lines per distributed-pattern scan window.
    pub window_size: usize,
    /// Require near candidates to also reach `similarity_threshold` under the
    /// combined similarity score.
    pub confirm_near_matches: bool,
    /// Report blocks with the same token shape as an earlier block.
    pub detect_structural: bool,
    /// A pattern is only reported when one of its unit lines normalizes to at
    /// least this many chars.
    pub min_pattern_line_chars: usize,
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_similarity_threshold(mut self, similarity_threshold: f64) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    pub fn with_min_block_size(mut self, min_block_size: usize) -> Self {
        self.min_block_size = min_block_size;
        self
    }

    pub fn with_detect_distributed(mut self, detect_distributed: bool) -> Self {
        self.detect_distributed = detect_distributed;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_confirm_near_matches(mut self, confirm_near_matches: bool) -> Self {
        self.confirm_near_matches = confirm_near_matches;
        self
    }

    pub fn with_detect_structural(mut self, detect_structural: bool) -> Self {
        self.detect_structural = detect_structural;
        self
    }

    pub fn with_min_pattern_line_chars(mut self, min_pattern_line_chars: usize) -> Self {
        self.min_pattern_line_chars = min_pattern_line_chars;
        self
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        validate_threshold("similarity_threshold", self.similarity_threshold)?;
        validate_window("window_size", self.window_size, MIN_SCAN_WINDOW)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            min_block_size: 20,
            detect_distributed: true,
            window_size: 10,
            confirm_near_matches: true,
            detect_structural: false,
            min_pattern_line_chars: 6,
        }
    }
}

/// Configuration for [`crate::StreamingFilter`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// A near duplicate needs a combined similarity strictly above this.
    pub similarity_threshold: f64,
    /// Lines kept in the rolling window for the distributed-pattern check.
    pub max_repeat_window: usize,
    /// Only treat a near match as a loop when the earlier line already has a
    /// recorded exact repeat elsewhere in the session.
    pub near_duplicate_requires_precedent: bool,
    /// Checks skipped entirely. The remaining checks keep their order.
    pub disabled_checks: Vec<LoopCheck>,
    /// Runs of whitespace never count as character repetition, so deep
    /// indentation does not stop generation. `false` flags any run.
    pub ignore_whitespace_runs: bool,
    /// Scan window used when looking for patterns inside the rolling window.
    pub pattern_window_size: usize,
    /// Same meaning as [`AnalyzerConfig::min_pattern_line_chars`].
    pub min_pattern_line_chars: usize,
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_similarity_threshold(mut self, similarity_threshold: f64) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    pub fn with_max_repeat_window(mut self, max_repeat_window: usize) -> Self {
        self.max_repeat_window = max_repeat_window;
        self
    }

    pub fn with_near_duplicate_requires_precedent(mut self, required: bool) -> Self {
        self.near_duplicate_requires_precedent = required;
        self
    }

    /// Skip `check` during evaluation.
    pub fn disable(mut self, check: LoopCheck) -> Self {
        if !self.disabled_checks.contains(&check) {
            self.disabled_checks.push(check);
        }
        self
    }

    pub fn with_ignore_whitespace_runs(mut self, ignore: bool) -> Self {
        self.ignore_whitespace_runs = ignore;
        self
    }

    pub fn is_enabled(&self, check: LoopCheck) -> bool {
        !self.disabled_checks.contains(&check)
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        validate_threshold("similarity_threshold", self.similarity_threshold)?;
        validate_window("max_repeat_window", self.max_repeat_window, 1)?;
        validate_window("pattern_window_size", self.pattern_window_size, MIN_SCAN_WINDOW)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
            max_repeat_window: 20,
            near_duplicate_requires_precedent: true,
            disabled_checks: Vec::new(),
            ignore_whitespace_runs: true,
            pattern_window_size: 10,
            min_pattern_line_chars: 6,
        }
    }
}

fn validate_threshold(name: &'static str, value: f64) -> Result<(), DetectorError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DetectorError::InvalidThreshold { name, value });
    }
    Ok(())
}

fn validate_window(name: &'static str, value: usize, min: usize) -> Result<(), DetectorError> {
    if value < min {
        return Err(DetectorError::InvalidWindow { name, value, min });
    }
    Ok(())
}
