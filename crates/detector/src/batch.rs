//! Batch duplicate analysis over a finished text.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use canonical::{hash_text, is_blank, token_shape};
use perceptual::{Fingerprint, FingerprintEngine};
use tracing::{debug, info, Level};

use crate::config::AnalyzerConfig;
use crate::metrics::metrics_recorder;
use crate::segment::{segment, split_lines, Block};
use crate::types::{DetectorError, DuplicateBlock, DuplicateKind, DuplicateReport, RepetitionPattern};

/// Shortest cycle looked for by the distributed-pattern scan, in lines.
pub const MIN_PERIOD: usize = 2;
/// Longest cycle looked for by the distributed-pattern scan, in lines.
pub const MAX_PERIOD: usize = 4;
/// Consecutive periods needed before a cycle counts as a pattern.
pub const MIN_REPEATS: usize = 3;

/// One non-blank line as seen by the pattern scan.
#[derive(Debug, Clone)]
pub(crate) struct LineUnit {
    pub(crate) line: usize,
    /// Identity used for line equality.
    pub(crate) key: String,
    /// Chars of the text behind `key`.
    pub(crate) weight: usize,
    pub(crate) fingerprint: Arc<Fingerprint>,
}

impl LineUnit {
    /// Lines are equal when their normalized text is. Comment-only lines
    /// normalize to nothing, so they fall back to their trimmed raw text.
    pub(crate) fn new(line: usize, raw: &str, fingerprint: Arc<Fingerprint>) -> Self {
        let (key, weight) = if fingerprint.normalized_text.is_empty() {
            let trimmed = raw.trim();
            (hash_text(trimmed), trimmed.chars().count())
        } else {
            (
                fingerprint.exact_hash.clone(),
                fingerprint.normalized_text.chars().count(),
            )
        };
        Self {
            line,
            key,
            weight,
            fingerprint,
        }
    }
}

/// A pattern plus the line numbers of every period after the first.
#[derive(Debug, Clone)]
pub(crate) struct PatternHit {
    pub(crate) pattern: RepetitionPattern,
    pub(crate) repeated_periods: Vec<Vec<usize>>,
}

/// Greedy, non-overlapping cycle scan.
///
/// From each start position a window of `window_size` units (shorter at the
/// end) is checked for periods `MIN_PERIOD..=MAX_PERIOD` repeating at least
/// `MIN_REPEATS` times from the window start. The first hit is recorded,
/// extended for as long as the cycle keeps going, and the scan resumes right
/// after it.
pub(crate) fn scan_patterns(
    units: &[LineUnit],
    window_size: usize,
    min_line_chars: usize,
) -> Vec<PatternHit> {
    let mut hits = Vec::new();
    let mut start = 0;

    while start < units.len() {
        let end = (start + window_size).min(units.len());
        let Some(period) = find_cycle(&units[start..end], min_line_chars) else {
            start += 1;
            continue;
        };

        let rest = &units[start..];
        let repeats = count_repeats(rest, period);
        let covered = &rest[..period * repeats];
        let mut periods = covered
            .chunks(period)
            .map(|chunk| chunk.iter().map(|unit| unit.line).collect::<Vec<_>>());
        // The first period is the one kept.
        periods.next();

        hits.push(PatternHit {
            pattern: RepetitionPattern {
                pattern_units: covered[..period]
                    .iter()
                    .map(|unit| unit.fingerprint.as_ref().clone())
                    .collect(),
                occurrences: repeats,
                start_line: covered[0].line,
                end_line: covered[covered.len() - 1].line,
            },
            repeated_periods: periods.collect(),
        });
        start += covered.len();
    }

    hits
}

fn find_cycle(window: &[LineUnit], min_line_chars: usize) -> Option<usize> {
    (MIN_PERIOD..=MAX_PERIOD)
        .take_while(|period| window.len() >= period * MIN_REPEATS)
        .find(|&period| {
            count_repeats(window, period) >= MIN_REPEATS
                && window[..period].iter().any(|unit| unit.weight >= min_line_chars)
        })
}

/// Consecutive copies of `units[..period]` at the start of `units`.
fn count_repeats(units: &[LineUnit], period: usize) -> usize {
    let mut repeats = 1;
    while (repeats + 1) * period <= units.len()
        && (0..period).all(|k| units[repeats * period + k].key == units[k].key)
    {
        repeats += 1;
    }
    repeats
}

/// Finds and removes duplicate blocks and distributed repetition in finished
/// text.
///
/// Holds a shared [`FingerprintEngine`]; many analyzers (and streaming
/// filters) may share one engine and its cache.
#[derive(Debug, Clone)]
pub struct DuplicateAnalyzer {
    engine: Arc<FingerprintEngine>,
    config: AnalyzerConfig,
}

impl DuplicateAnalyzer {
    /// Analyzer with a private default engine.
    pub fn new(config: AnalyzerConfig) -> Result<Self, DetectorError> {
        Self::with_engine(Arc::new(FingerprintEngine::default()), config)
    }

    pub fn with_engine(
        engine: Arc<FingerprintEngine>,
        config: AnalyzerConfig,
    ) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<FingerprintEngine> {
        &self.engine
    }

    /// Analyze `text` and build the cleaned version.
    ///
    /// Exact and near duplicate blocks are removed (the first occurrence is
    /// kept), as are all periods of a distributed pattern but the first.
    /// Structural duplicates are only reported.
    pub fn detect_duplicates(&self, text: &str, language_id: &str) -> DuplicateReport {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "detector.detect_duplicates",
            language = language_id,
            bytes = text.len()
        );
        let _guard = span.enter();

        let lines = split_lines(text);
        let duplicate_blocks = self.find_duplicate_blocks(text, language_id);
        let hits = if self.config.detect_distributed {
            self.scan_lines(&lines, language_id)
        } else {
            Vec::new()
        };

        let report = if duplicate_blocks.is_empty() && hits.is_empty() {
            DuplicateReport::clean(text, lines.len())
        } else {
            build_report(text, lines.len(), duplicate_blocks, hits)
        };

        let elapsed = start.elapsed();
        info!(
            original_line_count = report.original_line_count,
            cleaned_line_count = report.cleaned_line_count,
            duplicate_blocks = report.duplicate_blocks.len(),
            distributed_patterns = report.distributed_patterns.len(),
            duplicates_removed = report.duplicates_removed,
            elapsed_micros = elapsed.as_micros() as u64,
            "detect_duplicates"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_analysis(language_id, elapsed, &report);
        }

        report
    }

    /// Cycles of 2 to 4 lines repeating at least 3 times in a row.
    ///
    /// Blank lines are skipped but keep their place in the numbering, so the
    /// returned line numbers index into `lines`.
    pub fn detect_distributed_repetition<S: AsRef<str>>(
        &self,
        lines: &[S],
        language_id: &str,
    ) -> Vec<RepetitionPattern> {
        self.scan_lines(lines, language_id)
            .into_iter()
            .map(|hit| hit.pattern)
            .collect()
    }

    /// The cleaned text of [`Self::detect_duplicates`].
    pub fn remove_duplicates(&self, text: &str, language_id: &str) -> String {
        self.detect_duplicates(text, language_id).cleaned_text
    }

    fn scan_lines<S: AsRef<str>>(&self, lines: &[S], language_id: &str) -> Vec<PatternHit> {
        let picked: Vec<(usize, &str)> = lines
            .iter()
            .map(|line| line.as_ref())
            .enumerate()
            .filter(|(_, line)| !is_blank(line))
            .collect();
        let texts: Vec<&str> = picked.iter().map(|&(_, line)| line).collect();
        let fingerprints = self.engine.fingerprint_batch(&texts, language_id);

        let units: Vec<LineUnit> = picked
            .iter()
            .zip(fingerprints)
            .map(|(&(line, raw), fp)| LineUnit::new(line, raw, fp))
            .collect();

        let hits = scan_patterns(
            &units,
            self.config.window_size,
            self.config.min_pattern_line_chars,
        );
        for hit in &hits {
            debug!(
                period = hit.pattern.period(),
                occurrences = hit.pattern.occurrences,
                start_line = hit.pattern.start_line,
                end_line = hit.pattern.end_line,
                "distributed_pattern"
            );
        }
        hits
    }

    fn find_duplicate_blocks(&self, text: &str, language_id: &str) -> Vec<DuplicateBlock> {
        let blocks: Vec<Block> = segment(text)
            .into_iter()
            .filter(|block| block.content.trim().chars().count() >= self.config.min_block_size)
            .collect();
        let contents: Vec<&str> = blocks.iter().map(|block| block.content.as_str()).collect();
        let fingerprints = self.engine.fingerprint_batch(&contents, language_id);

        let mut seen: Vec<usize> = Vec::new();
        let mut seen_exact: HashMap<&str, usize> = HashMap::new();
        let mut seen_shapes: HashMap<String, usize> = HashMap::new();
        let mut found = Vec::new();

        for (idx, fp) in fingerprints.iter().enumerate() {
            let block = &blocks[idx];

            if let Some(&first) = seen_exact.get(fp.exact_hash.as_str()) {
                found.push(duplicate_of(block, &blocks[first], 1.0, DuplicateKind::Exact));
                continue;
            }

            if let Some((first, similarity)) = self.near_match(fp, &seen, &fingerprints) {
                found.push(duplicate_of(block, &blocks[first], similarity, DuplicateKind::Near));
                continue;
            }

            if self.config.detect_structural {
                let shape = token_shape(&fp.normalized_text);
                if let Some(&first) = seen_shapes.get(&shape) {
                    let similarity = self.engine.fingerprint_similarity(fp, &fingerprints[first]);
                    found.push(duplicate_of(
                        block,
                        &blocks[first],
                        similarity,
                        DuplicateKind::Structural,
                    ));
                    continue;
                }
                seen_shapes.insert(shape, idx);
            }

            seen_exact.insert(fp.exact_hash.as_str(), idx);
            seen.push(idx);
        }

        for dup in &found {
            debug!(
                kind = ?dup.kind,
                start_line = dup.start_line,
                end_line = dup.end_line,
                first_start_line = dup.first_start_line,
                similarity = dup.similarity,
                "duplicate_block"
            );
        }
        found
    }

    /// First earlier block whose SimHash passes the threshold and, when
    /// confirmation is on, whose combined similarity does too.
    fn near_match(
        &self,
        fp: &Fingerprint,
        seen: &[usize],
        fingerprints: &[Arc<Fingerprint>],
    ) -> Option<(usize, f64)> {
        let threshold = self.config.similarity_threshold;
        seen.iter().find_map(|&candidate| {
            let other = &fingerprints[candidate];
            let screen = fp.hamming_similarity(other);
            if screen < threshold {
                return None;
            }
            if !self.config.confirm_near_matches {
                return Some((candidate, screen));
            }
            let full = self.engine.fingerprint_similarity(fp, other);
            (full >= threshold).then_some((candidate, full))
        })
    }
}

impl Default for DuplicateAnalyzer {
    fn default() -> Self {
        Self {
            engine: Arc::new(FingerprintEngine::default()),
            config: AnalyzerConfig::default(),
        }
    }
}

fn duplicate_of(
    block: &Block,
    first: &Block,
    similarity: f64,
    kind: DuplicateKind,
) -> DuplicateBlock {
    DuplicateBlock {
        content: block.content.clone(),
        start_line: block.start_line,
        end_line: block.end_line,
        occurrences: 2,
        similarity: similarity.clamp(0.0, 1.0),
        kind,
        first_start_line: first.start_line,
        first_end_line: first.end_line,
    }
}

fn build_report(
    text: &str,
    line_count: usize,
    duplicate_blocks: Vec<DuplicateBlock>,
    hits: Vec<PatternHit>,
) -> DuplicateReport {
    let mut removed = vec![false; line_count];
    let mut duplicates_removed = 0;

    let mut removable: Vec<&DuplicateBlock> = duplicate_blocks
        .iter()
        .filter(|dup| dup.kind != DuplicateKind::Structural)
        .collect();
    removable.sort_by(|a, b| b.start_line.cmp(&a.start_line));
    for dup in removable {
        if mark_removed(&mut removed, dup.start_line..=dup.end_line) {
            duplicates_removed += 1;
        }
    }

    for hit in &hits {
        for period in &hit.repeated_periods {
            if mark_removed(&mut removed, period.iter().copied()) {
                duplicates_removed += 1;
            }
        }
    }

    // Raw pieces, so kept lines keep any `\r`.
    let kept: Vec<&str> = text
        .split('\n')
        .zip(&removed)
        .filter(|(_, gone)| !**gone)
        .map(|(line, _)| line)
        .collect();

    DuplicateReport {
        has_duplicates: true,
        duplicate_blocks,
        distributed_patterns: hits.into_iter().map(|hit| hit.pattern).collect(),
        cleaned_text: kept.join("\n"),
        original_line_count: line_count,
        cleaned_line_count: kept.len(),
        duplicates_removed,
    }
}

/// Marks `lines` removed. Returns whether any of them was still present.
fn mark_removed(removed: &mut [bool], lines: impl IntoIterator<Item = usize>) -> bool {
    let mut any = false;
    for line in lines {
        if let Some(slot) = removed.get_mut(line) {
            if !*slot {
                *slot = true;
                any = true;
            }
        }
    }
    any
}
