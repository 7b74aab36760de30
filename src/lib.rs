//! Workspace umbrella crate for dupguard.
//!
//! This crate stitches together normalization, fingerprinting and the two
//! detectors so callers can analyze finished code and police running
//! generations through a single entry point, [`DupGuard`], configured from one
//! YAML file ([`DupGuardConfig`]).

pub mod config;

pub use canonical::{
    count_loc, hash_text, is_blank, normalize, strip_comments, token_shape, tokenize,
    tokenize_words, CanonicalError, CanonicalizeConfig, Language, Token,
};
pub use detector::{
    segment, set_detector_metrics, split_lines, AnalyzerConfig, Block, DetectorError,
    DetectorMetrics, DuplicateAnalyzer, DuplicateBlock, DuplicateKind, DuplicateReport, LoopCheck,
    RepetitionPattern, StopReason, StreamConfig, StreamVerdict, StreamingFilter,
};
pub use perceptual::{
    similarity, CacheStats, EvictionPolicy, Fingerprint, FingerprintEngine, PerceptualConfig,
    PerceptualError, SimHash, SimilarityWeights,
};

pub use crate::config::{ConfigLoadError, DupGuardConfig};

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// Errors that can occur while assembling a [`DupGuard`].
#[derive(Debug, Clone, PartialEq)]
pub enum DupGuardError {
    Perceptual(PerceptualError),
    Detector(DetectorError),
}

impl fmt::Display for DupGuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DupGuardError::Perceptual(err) => write!(f, "fingerprint engine setup failed: {err}"),
            DupGuardError::Detector(err) => write!(f, "detector setup failed: {err}"),
        }
    }
}

impl Error for DupGuardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DupGuardError::Perceptual(err) => Some(err),
            DupGuardError::Detector(err) => Some(err),
        }
    }
}

impl From<PerceptualError> for DupGuardError {
    fn from(value: PerceptualError) -> Self {
        DupGuardError::Perceptual(value)
    }
}

impl From<DetectorError> for DupGuardError {
    fn from(value: DetectorError) -> Self {
        DupGuardError::Detector(value)
    }
}

/// One fingerprint engine shared by a batch analyzer and every streaming
/// session handed out.
///
/// ```
/// use dupguard::{DupGuard, DupGuardConfig};
///
/// let guard = DupGuard::from_config(&DupGuardConfig::default()).unwrap();
/// let block = "def area(r):\n    return 3.14159 * r * r";
/// let report = guard.analyze(&format!("{block}\n\n{block}"), "python");
/// assert_eq!(report.duplicates_removed, 1);
///
/// let mut session = guard.new_session();
/// assert!(!session.check_duplication("x = 1\n", "x = 1", "python"));
/// ```
#[derive(Debug, Clone)]
pub struct DupGuard {
    engine: Arc<FingerprintEngine>,
    analyzer: DuplicateAnalyzer,
    session: StreamingFilter,
}

impl DupGuard {
    pub fn new(
        perceptual_cfg: PerceptualConfig,
        analyzer_cfg: AnalyzerConfig,
        stream_cfg: StreamConfig,
    ) -> Result<Self, DupGuardError> {
        let engine = Arc::new(FingerprintEngine::new(perceptual_cfg)?);
        let analyzer = DuplicateAnalyzer::with_engine(Arc::clone(&engine), analyzer_cfg)?;
        let session = StreamingFilter::with_engine(Arc::clone(&engine), stream_cfg)?;
        debug!(
            cache_capacity = engine.config().cache_capacity,
            "dupguard_ready"
        );
        Ok(Self {
            engine,
            analyzer,
            session,
        })
    }

    pub fn from_config(cfg: &DupGuardConfig) -> Result<Self, DupGuardError> {
        Self::new(
            cfg.perceptual.clone(),
            cfg.analyzer.clone(),
            cfg.stream.clone(),
        )
    }

    /// See [`DuplicateAnalyzer::detect_duplicates`].
    pub fn analyze(&self, text: &str, language_id: &str) -> DuplicateReport {
        self.analyzer.detect_duplicates(text, language_id)
    }

    pub fn remove_duplicates(&self, text: &str, language_id: &str) -> String {
        self.analyzer.remove_duplicates(text, language_id)
    }

    pub fn detect_distributed_repetition<S: AsRef<str>>(
        &self,
        lines: &[S],
        language_id: &str,
    ) -> Vec<RepetitionPattern> {
        self.analyzer.detect_distributed_repetition(lines, language_id)
    }

    /// A fresh streaming filter for one generation.
    pub fn new_session(&self) -> StreamingFilter {
        self.session.clone()
    }

    pub fn engine(&self) -> &Arc<FingerprintEngine> {
        &self.engine
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.engine.cache_stats()
    }
}
