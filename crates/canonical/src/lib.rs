//! dupguard canonical text layer.
//!
//! This crate turns a raw text unit (a line, a block, a whole file) into the
//! normalized form that duplicate detection compares. Downstream stages
//! (fingerprinting, batch analysis, streaming loop detection) rely on it for
//! stable identity.
//!
//! ## What we do
//!
//! - Comment stripping per language, with a generic fallback for unknown ids
//! - Optional Unicode NFKC normalization
//! - Whitespace normalization (collapses to single spaces)
//! - Lowercasing
//! - Tokenization on non-word characters, with byte offsets
//! - Exact hashing of the normalized form
//! - Lines-of-code counting
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no OS/locale dependence. Same text, language and
//! config give the same result on any machine.
//!
//! ## What we don't do
//!
//! We never parse. Comments are recognized lexically from a small table and
//! string literals are only tracked so that comment markers inside them are
//! left alone.

mod comments;
mod config;
mod error;
mod hash;
mod language;
mod pipeline;
mod token;
mod whitespace;

pub use crate::comments::{strip_comments, strip_comments_with};
pub use crate::config::CanonicalizeConfig;
pub use crate::error::CanonicalError;
pub use crate::hash::hash_text;
pub use crate::language::{CommentSyntax, Language};
pub use crate::pipeline::{count_loc, normalize};
pub use crate::token::{token_shape, tokenize, tokenize_words, Token};
pub use crate::whitespace::{collapse_whitespace, is_blank};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_code_hashes_equal_across_formatting() {
        let cfg = CanonicalizeConfig::default();
        let a = normalize(
            "function add(a, b) {\n    return a + b; // add\n}",
            "javascript",
            &cfg,
        );
        let b = normalize("function add(a, b) { return a + b; }", "javascript", &cfg);
        assert_eq!(hash_text(&a), hash_text(&b));
    }

    #[test]
    fn different_code_hashes_differ() {
        let cfg = CanonicalizeConfig::default();
        let a = normalize("return a + b;", "javascript", &cfg);
        let b = normalize("return a - b;", "javascript", &cfg);
        assert_ne!(hash_text(&a), hash_text(&b));
    }

    #[test]
    fn tokens_of_normalized_text_are_lowercase() {
        let cfg = CanonicalizeConfig::default();
        let normalized = normalize("def Compute(X):  # doc", "python", &cfg);
        assert_eq!(tokenize_words(&normalized), vec!["def", "compute", "x"]);
    }

    #[test]
    fn unknown_language_degrades_to_generic() {
        let cfg = CanonicalizeConfig::default();
        let normalized = normalize("value = 1 // note", "no-such-language", &cfg);
        assert_eq!(normalized, "value = 1");
    }
}
