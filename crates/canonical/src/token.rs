use serde::{Deserialize, Serialize};

/// A token with its UTF-8 byte offsets in the text it was cut from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// The token text content.
    pub text: String,
    /// Byte offset (inclusive).
    pub start: usize,
    /// Byte offset (exclusive).
    pub end: usize,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Splits text on runs of characters that are neither alphanumeric nor `_`
/// and produces byte offsets. Empty tokens are never emitted.
///
/// ```rust
/// use canonical::tokenize;
///
/// let words: Vec<String> = tokenize("let total_sum = a+b;").into_iter().map(|t| t.text).collect();
/// assert_eq!(words, vec!["let", "total_sum", "a", "b"]);
/// ```
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if !is_word_char(ch) {
            if let Some(token_start) = start.take() {
                tokens.push(Token {
                    text: text[token_start..idx].to_string(),
                    start: token_start,
                    end: idx,
                });
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }

    if let Some(token_start) = start {
        tokens.push(Token {
            text: text[token_start..].to_string(),
            start: token_start,
            end: text.len(),
        });
    }

    tokens
}

/// Token texts only, for callers that do not need offsets.
pub fn tokenize_words(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|t| t.text).collect()
}

/// Lexical shape of a text: every identifier becomes `_`, every number `0`,
/// punctuation is kept and whitespace dropped. Two blocks that differ only in
/// names and literals share a shape.
///
/// ```rust
/// use canonical::token_shape;
///
/// assert_eq!(token_shape("total = price * 2;"), token_shape("count = size * 10;"));
/// assert_ne!(token_shape("a + b"), token_shape("a - b"));
/// ```
pub fn token_shape(text: &str) -> String {
    let mut shape = String::with_capacity(text.len() / 2);
    let mut in_word = false;
    for ch in text.chars() {
        if is_word_char(ch) {
            if !in_word {
                shape.push(if ch.is_ascii_digit() { '0' } else { '_' });
                in_word = true;
            }
        } else {
            in_word = false;
            if !ch.is_whitespace() {
                shape.push(ch);
            }
        }
    }
    shape
}
