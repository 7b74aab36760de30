//! Streaming repetition-loop detection.
//!
//! A [`StreamingFilter`] watches one generation session line by line and
//! decides after every line whether the model has fallen into a loop. The
//! decision is an ordered chain of named checks ([`LoopCheck::ORDER`]); the
//! first one that trips stops the session.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use canonical::{is_blank, Language};
use perceptual::{Fingerprint, FingerprintEngine};
use tracing::debug;

use crate::batch::{scan_patterns, LineUnit};
use crate::config::StreamConfig;
use crate::metrics::metrics_recorder;
use crate::types::{DetectorError, LoopCheck, StopReason, StreamVerdict};

/// Lines must be longer than this (trimmed, in chars) to be recorded for the
/// duplicate checks.
pub const MIN_RECORDED_LINE_CHARS: usize = 5;
/// Chars at the end of the completion inspected by the tail checks.
pub const TAIL_CHARS: usize = 50;
/// The block check needs a completion longer than this many chars.
pub const MIN_BLOCK_CHECK_CHARS: usize = 100;
/// Shortest word unit counted by the token check.
pub const MIN_REPEATED_TOKEN_CHARS: usize = 4;
/// Back-to-back copies of a word unit that count as a loop.
pub const TOKEN_REPEATS: usize = 5;
/// Template keyword hits in the tail that count as a loop.
pub const TEMPLATE_MARKER_HITS: usize = 3;
/// Contiguous copies of one char that count as a loop.
pub const CHAR_RUN: usize = 15;
/// The distributed-pattern check runs once the window holds at least this
/// many lines.
const MIN_PATTERN_WINDOW: usize = 6;

const TEMPLATE_MARKERS: [&str; 4] = ["prefix", "suffix", "middle", "fim"];
const HEADER_PREFIXES: [&str; 4] = ["file:", "filename:", "filepath:", "path:"];

#[derive(Debug, Clone)]
struct LineRecord {
    line: usize,
    key: String,
    fingerprint: Arc<Fingerprint>,
}

/// Per-line inputs shared by every check.
struct LineContext<'a> {
    completion: &'a str,
    trimmed: &'a str,
    unit: &'a LineUnit,
    recorded: bool,
}

/// Per-session loop detector.
///
/// Create one per generation (or call [`StreamingFilter::reset`] before
/// reusing one) and feed it every newly produced line. Cloning a filter
/// forks the session; the engine stays shared.
#[derive(Debug, Clone)]
pub struct StreamingFilter {
    engine: Arc<FingerprintEngine>,
    config: StreamConfig,
    window: VecDeque<LineUnit>,
    records: Vec<LineRecord>,
    key_counts: HashMap<String, usize>,
    headers: HashSet<String>,
    lines_seen: usize,
}

impl StreamingFilter {
    /// Filter with a private default engine.
    pub fn new(config: StreamConfig) -> Result<Self, DetectorError> {
        Self::with_engine(Arc::new(FingerprintEngine::default()), config)
    }

    pub fn with_engine(
        engine: Arc<FingerprintEngine>,
        config: StreamConfig,
    ) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            window: VecDeque::new(),
            records: Vec::new(),
            key_counts: HashMap::new(),
            headers: HashSet::new(),
            lines_seen: 0,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Non-blank lines fed since the last reset.
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Forget everything about the current session.
    pub fn reset(&mut self) {
        self.window.clear();
        self.records.clear();
        self.key_counts.clear();
        self.headers.clear();
        self.lines_seen = 0;
    }

    /// `true` when generation should stop.
    ///
    /// `completion_so_far` is the whole completion including `new_line`.
    pub fn check_duplication(
        &mut self,
        completion_so_far: &str,
        new_line: &str,
        language_id: &str,
    ) -> bool {
        self.check_line(completion_so_far, new_line, language_id)
            .should_stop()
    }

    /// Same decision as [`Self::check_duplication`], with the reason.
    pub fn check_line(
        &mut self,
        completion_so_far: &str,
        new_line: &str,
        language_id: &str,
    ) -> StreamVerdict {
        if is_blank(new_line) {
            return StreamVerdict::Continue;
        }

        let line = self.lines_seen;
        self.lines_seen += 1;

        let fingerprint = self.engine.fingerprint(new_line, language_id);
        let unit = LineUnit::new(line, new_line, fingerprint);
        let trimmed = new_line.trim();
        let recorded = trimmed.chars().count() > MIN_RECORDED_LINE_CHARS;
        if recorded {
            *self.key_counts.entry(unit.key.clone()).or_insert(0) += 1;
            self.records.push(LineRecord {
                line,
                key: unit.key.clone(),
                fingerprint: Arc::clone(&unit.fingerprint),
            });
        }

        let ctx = LineContext {
            completion: completion_so_far,
            trimmed,
            unit: &unit,
            recorded,
        };

        for check in LoopCheck::ORDER {
            if check == LoopCheck::DistributedPattern {
                self.track(unit.clone());
            }
            if !self.config.is_enabled(check) {
                continue;
            }
            if let Some(detail) = self.evaluate(check, &ctx) {
                return self.stop(check, line, detail);
            }
        }

        StreamVerdict::Continue
    }

    fn track(&mut self, unit: LineUnit) {
        self.window.push_back(unit);
        while self.window.len() > self.config.max_repeat_window {
            self.window.pop_front();
        }
    }

    fn evaluate(&mut self, check: LoopCheck, ctx: &LineContext<'_>) -> Option<String> {
        match check {
            LoopCheck::MetadataLoop => self.metadata_loop(ctx.trimmed),
            LoopCheck::ExactDuplicate => self.exact_duplicate(ctx),
            LoopCheck::NearDuplicate => self.near_duplicate(ctx),
            LoopCheck::DistributedPattern => self.distributed_pattern(),
            LoopCheck::BlockRepetition => block_repetition(ctx.completion),
            LoopCheck::TokenRepetition => token_repetition(tail(ctx.completion, TAIL_CHARS)),
            LoopCheck::TemplateMarkers => template_markers(tail(ctx.completion, TAIL_CHARS)),
            LoopCheck::CharacterRepetition => character_repetition(
                tail(ctx.completion, TAIL_CHARS),
                self.config.ignore_whitespace_runs,
            ),
        }
    }

    fn metadata_loop(&mut self, trimmed: &str) -> Option<String> {
        let header = metadata_header(trimmed)?;
        if self.headers.insert(header) {
            return None;
        }
        Some(format!("file header repeated: {trimmed}"))
    }

    fn exact_duplicate(&self, ctx: &LineContext<'_>) -> Option<String> {
        if !ctx.recorded {
            return None;
        }
        let earlier = self.occurrences(&ctx.unit.key).saturating_sub(1);
        (earlier >= 2).then(|| format!("line already seen {earlier} times"))
    }

    fn near_duplicate(&self, ctx: &LineContext<'_>) -> Option<String> {
        if !ctx.recorded {
            return None;
        }
        let current = ctx.unit;
        let earlier = &self.records[..self.records.len().saturating_sub(1)];

        earlier.iter().find_map(|record| {
            if self.config.near_duplicate_requires_precedent {
                // Occurrences of the earlier line's text other than itself
                // and the current line.
                let same_as_current = usize::from(record.key == current.key);
                let others = self
                    .occurrences(&record.key)
                    .saturating_sub(1 + same_as_current);
                if others == 0 {
                    return None;
                }
            }
            let similarity = self
                .engine
                .fingerprint_similarity(&record.fingerprint, &current.fingerprint);
            (similarity > self.config.similarity_threshold).then(|| {
                format!("similarity {similarity:.3} to line {}", record.line)
            })
        })
    }

    fn distributed_pattern(&mut self) -> Option<String> {
        let len = self.window.len();
        if len < MIN_PATTERN_WINDOW || len % 4 != 0 {
            return None;
        }
        let window_size = self.config.pattern_window_size;
        let min_line_chars = self.config.min_pattern_line_chars;
        let hits = scan_patterns(self.window.make_contiguous(), window_size, min_line_chars);
        hits.first().map(|hit| {
            format!(
                "{}-line cycle repeated {} times from line {}",
                hit.pattern.period(),
                hit.pattern.occurrences,
                hit.pattern.start_line
            )
        })
    }

    fn occurrences(&self, key: &str) -> usize {
        self.key_counts.get(key).copied().unwrap_or(0)
    }

    fn stop(&self, check: LoopCheck, line: usize, detail: String) -> StreamVerdict {
        debug!(check = %check, line, detail = %detail, "stream_stop");
        if let Some(recorder) = metrics_recorder() {
            recorder.record_stop(check, line);
        }
        StreamVerdict::Stop(StopReason { check, detail })
    }
}

impl Default for StreamingFilter {
    fn default() -> Self {
        Self {
            engine: Arc::new(FingerprintEngine::default()),
            config: StreamConfig::default(),
            window: VecDeque::new(),
            records: Vec::new(),
            key_counts: HashMap::new(),
            headers: HashSet::new(),
            lines_seen: 0,
        }
    }
}

/// The identity of a file/path header comment, if `trimmed` is one.
///
/// Recognized shapes: `// File: src/a.rs`, `# path: pkg/b.py`,
/// `// src/lib.rs`, `<!-- file: index.html -->`, `/* a/b.c */`.
fn metadata_header(trimmed: &str) -> Option<String> {
    let marker = Language::header_markers()
        .iter()
        .find(|marker| trimmed.starts_with(**marker))?;
    let body = trimmed[marker.len()..]
        .trim()
        .trim_end_matches("-->")
        .trim_end_matches("*/")
        .trim()
        .to_lowercase();

    let is_header = match HEADER_PREFIXES
        .iter()
        .find_map(|prefix| body.strip_prefix(prefix))
    {
        Some(rest) => !rest.trim().is_empty(),
        None => looks_like_path(&body),
    };
    is_header.then(|| trimmed.to_string())
}

/// A bare path token: path-safe chars, at least one separator, and a final
/// segment with a file extension. `// self.items` and `#include<sys/x.h>`
/// are not paths.
fn looks_like_path(text: &str) -> bool {
    let path_char = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '\\' | ':')
    };
    if !text.contains(['/', '\\']) || !text.chars().all(path_char) {
        return false;
    }
    let name = text.rsplit(['/', '\\']).next().unwrap_or("");
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// The last `n` chars of `text` (all of it when shorter).
fn tail(text: &str, n: usize) -> &str {
    match char_offset_from_end(text, n) {
        Some(offset) => &text[offset..],
        None => text,
    }
}

/// Byte offset where the last `n` chars start, or `None` when `text` has
/// fewer than `n` chars.
fn char_offset_from_end(text: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return Some(text.len());
    }
    text.char_indices().rev().nth(n - 1).map(|(idx, _)| idx)
}

fn block_repetition(completion: &str) -> Option<String> {
    char_offset_from_end(completion, MIN_BLOCK_CHECK_CHARS + 1)?;
    let last_start = char_offset_from_end(completion, TAIL_CHARS)?;
    let before_start = char_offset_from_end(completion, 2 * TAIL_CHARS)?;
    let last = &completion[last_start..];
    let before = &completion[before_start..last_start];
    before
        .contains(last)
        .then(|| format!("last {TAIL_CHARS} chars repeat the {TAIL_CHARS} before them"))
}

#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn token_repetition(tail: &str) -> Option<String> {
    let chars: Vec<char> = tail.chars().collect();
    let n = chars.len();
    for len in MIN_REPEATED_TOKEN_CHARS..=n / TOKEN_REPEATS {
        for start in 0..=n - len * TOKEN_REPEATS {
            let unit = &chars[start..start + len];
            if !unit.iter().all(|&c| is_word_char(c)) {
                continue;
            }
            let repeated = (1..TOKEN_REPEATS).all(|k| {
                let from = start + k * len;
                &chars[from..from + len] == unit
            });
            if repeated {
                let token: String = unit.iter().collect();
                return Some(format!("`{token}` repeated {TOKEN_REPEATS}+ times"));
            }
        }
    }
    None
}

fn template_markers(tail: &str) -> Option<String> {
    let lower = tail.to_lowercase();
    let hits: usize = TEMPLATE_MARKERS
        .iter()
        .map(|marker| lower.matches(marker).count())
        .sum();
    (hits >= TEMPLATE_MARKER_HITS).then(|| format!("{hits} template markers in tail"))
}

fn character_repetition(tail: &str, ignore_whitespace: bool) -> Option<String> {
    let mut previous: Option<char> = None;
    let mut run = 0;
    for ch in tail.chars() {
        if previous == Some(ch) {
            run += 1;
        } else {
            previous = Some(ch);
            run = 1;
        }
        if run >= CHAR_RUN && !(ignore_whitespace && ch.is_whitespace()) {
            return Some(format!("{ch:?} repeated {CHAR_RUN}+ times"));
        }
    }
    None
}
