//! # dupguard Detector (`detector`)
//!
//! ## Purpose
//!
//! `detector` sits on top of `perceptual` and finds repetition in generated
//! code, in two settings:
//!
//! - **Batch**: a finished text is segmented into blocks, duplicate blocks
//!   and line cycles are reported, and a cleaned copy is produced.
//! - **Streaming**: a generation in progress is checked after every new line
//!   so the caller can stop a model that has started looping.
//!
//! ## Core Types
//!
//! - [`DuplicateAnalyzer`]: batch analysis over one text.
//!   - [`DuplicateReport`]: blocks, patterns, cleaned text and line counts.
//!   - [`DuplicateKind`]: `Exact`, `Near` or `Structural`.
//! - [`StreamingFilter`]: per-session loop detection.
//!   - [`LoopCheck`]: the named checks, evaluated in [`LoopCheck::ORDER`].
//!   - [`StreamVerdict`]: `Continue` or `Stop` with a [`StopReason`].
//! - [`segment`]: splits text into blocks of non-blank lines.
//! - [`DetectorMetrics`]: optional global observer, installed with
//!   [`set_detector_metrics`].
//!
//! Analyzers and filters can share one [`perceptual::FingerprintEngine`] (and
//! therefore one fingerprint cache) through `with_engine`.
//!
//! ## Example Usage
//!
//! ```
//! use detector::{AnalyzerConfig, DuplicateAnalyzer, LoopCheck, StreamConfig, StreamingFilter};
//!
//! let block = "function add(a, b) {\n  return a + b;\n}";
//! let text = format!("{block}\n\n{block}");
//!
//! let analyzer = DuplicateAnalyzer::new(AnalyzerConfig::default()).unwrap();
//! let report = analyzer.detect_duplicates(&text, "javascript");
//! assert_eq!(report.duplicate_blocks.len(), 1);
//! assert_eq!(report.cleaned_text, format!("{block}\n"));
//!
//! let mut filter = StreamingFilter::new(StreamConfig::default()).unwrap();
//! let line = "console.log(total);";
//! let mut completion = String::new();
//! let mut stopped = None;
//! for _ in 0..3 {
//!     completion.push_str(line);
//!     completion.push('\n');
//!     if let Some(reason) = filter.check_line(&completion, line, "javascript").reason() {
//!         stopped = Some(reason.check);
//!     }
//! }
//! assert_eq!(stopped, Some(LoopCheck::ExactDuplicate));
//! ```
mod batch;
mod config;
mod metrics;
mod segment;
mod stream;
mod types;

pub use crate::batch::{DuplicateAnalyzer, MAX_PERIOD, MIN_PERIOD, MIN_REPEATS};
pub use crate::config::{AnalyzerConfig, StreamConfig};
pub use crate::metrics::{set_detector_metrics, DetectorMetrics};
pub use crate::segment::{segment, split_lines, Block};
pub use crate::stream::StreamingFilter;
pub use crate::types::{
    DetectorError, DuplicateBlock, DuplicateKind, DuplicateReport, LoopCheck,
    RepetitionPattern, StopReason, StreamVerdict,
};
