use std::fmt;

use perceptual::{Fingerprint, PerceptualError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a duplicate block relates to the block it repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKind {
    /// Same normalized text.
    Exact,
    /// SimHash close enough, confirmed by the combined similarity score.
    Near,
    /// Same token shape (identifiers and numbers abstracted away). Reported,
    /// never removed.
    Structural,
}

/// A block repeating an earlier block of the same text.
///
/// Line numbers are 0-based and inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateBlock {
    /// Raw content of the repeated block.
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Always at least 2: the original plus this repeat.
    pub occurrences: usize,
    /// Similarity to the original, in [0, 1]. `1.0` for exact repeats.
    pub similarity: f64,
    pub kind: DuplicateKind,
    /// Line range of the block this one duplicates.
    pub first_start_line: usize,
    pub first_end_line: usize,
}

/// A cyclical A-B-A-B... repeat of short line units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepetitionPattern {
    /// Fingerprints of one period of the cycle, in order.
    pub pattern_units: Vec<Fingerprint>,
    /// Number of consecutive periods; at least 3.
    pub occurrences: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl RepetitionPattern {
    /// Lines per period.
    pub fn period(&self) -> usize {
        self.pattern_units.len()
    }
}

/// Outcome of one batch analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateReport {
    pub has_duplicates: bool,
    pub duplicate_blocks: Vec<DuplicateBlock>,
    pub distributed_patterns: Vec<RepetitionPattern>,
    /// The input with exact and near duplicates and repeated pattern periods
    /// removed.
    pub cleaned_text: String,
    pub original_line_count: usize,
    pub cleaned_line_count: usize,
    /// Removed blocks plus removed pattern periods.
    pub duplicates_removed: usize,
}

impl DuplicateReport {
    /// Report for text with nothing to remove.
    pub(crate) fn clean(text: &str, line_count: usize) -> Self {
        Self {
            has_duplicates: false,
            duplicate_blocks: Vec::new(),
            distributed_patterns: Vec::new(),
            cleaned_text: text.to_string(),
            original_line_count: line_count,
            cleaned_line_count: line_count,
            duplicates_removed: 0,
        }
    }
}

/// Named streaming checks, in evaluation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LoopCheck {
    MetadataLoop,
    ExactDuplicate,
    NearDuplicate,
    DistributedPattern,
    BlockRepetition,
    TokenRepetition,
    TemplateMarkers,
    CharacterRepetition,
}

impl LoopCheck {
    /// Evaluation order, cheapest first. The first check that trips wins.
    pub const ORDER: [LoopCheck; 8] = [
        LoopCheck::MetadataLoop,
        LoopCheck::ExactDuplicate,
        LoopCheck::NearDuplicate,
        LoopCheck::DistributedPattern,
        LoopCheck::BlockRepetition,
        LoopCheck::TokenRepetition,
        LoopCheck::TemplateMarkers,
        LoopCheck::CharacterRepetition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoopCheck::MetadataLoop => "metadata_loop",
            LoopCheck::ExactDuplicate => "exact_duplicate",
            LoopCheck::NearDuplicate => "near_duplicate",
            LoopCheck::DistributedPattern => "distributed_pattern",
            LoopCheck::BlockRepetition => "block_repetition",
            LoopCheck::TokenRepetition => "token_repetition",
            LoopCheck::TemplateMarkers => "template_markers",
            LoopCheck::CharacterRepetition => "character_repetition",
        }
    }
}

impl fmt::Display for LoopCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a streaming session should stop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StopReason {
    pub check: LoopCheck,
    pub detail: String,
}

/// Decision for one streamed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamVerdict {
    Continue,
    Stop(StopReason),
}

impl StreamVerdict {
    pub fn should_stop(&self) -> bool {
        matches!(self, StreamVerdict::Stop(_))
    }

    pub fn reason(&self) -> Option<&StopReason> {
        match self {
            StreamVerdict::Stop(reason) => Some(reason),
            StreamVerdict::Continue => None,
        }
    }
}

/// Errors produced when configuring the detection layer.
///
/// Detection itself is total; only configuration is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectorError {
    #[error("invalid config: {name} must be within [0.0, 1.0] (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("invalid config: {name} must be >= {min} (got {value})")]
    InvalidWindow {
        name: &'static str,
        value: usize,
        min: usize,
    },

    #[error("perceptual error: {0}")]
    Perceptual(#[from] PerceptualError),
}
