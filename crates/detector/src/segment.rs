//! Block segmentation.
//!
//! A block is a maximal run of non-blank lines. Blank lines (empty or
//! whitespace only) delimit blocks and are never part of one.

use canonical::is_blank;
use serde::{Deserialize, Serialize};

/// A contiguous run of non-blank lines. Line numbers are 0-based and
/// inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl Block {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Splits on `\n` and drops a trailing `\r` from every line.
///
/// Line `i` of the result is line `i` everywhere else in this crate.
///
/// ```rust
/// use detector::split_lines;
///
/// assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b", ""]);
/// assert_eq!(split_lines(""), vec![""]);
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Segment `text` into blocks in document order.
///
/// ```rust
/// use detector::segment;
///
/// let blocks = segment("fn a() {}\n\n\nfn b() {\n}\n");
/// assert_eq!(blocks.len(), 2);
/// assert_eq!((blocks[1].start_line, blocks[1].end_line), (3, 4));
/// ```
pub fn segment(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start_line = 0;

    for (idx, line) in split_lines(text).into_iter().enumerate() {
        if is_blank(line) {
            if !current.is_empty() {
                blocks.push(Block {
                    content: current.join("\n"),
                    start_line,
                    end_line: idx - 1,
                });
                current.clear();
            }
            continue;
        }
        if current.is_empty() {
            start_line = idx;
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(Block {
            content: current.join("\n"),
            start_line,
            end_line: start_line + current.len() - 1,
        });
    }

    blocks
}
