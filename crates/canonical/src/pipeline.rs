use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;

use crate::comments::strip_comments;
use crate::config::CanonicalizeConfig;

/// Main entry point. Produces the normalized form of a text unit that exact
/// hashing and tokenization operate on.
///
/// Steps, in order: strip comments for `language_id` (generic pass for
/// unknown languages), optional Unicode NFKC, collapse whitespace runs into a
/// single space and trim, lowercase.
///
/// ```rust
/// use canonical::{normalize, CanonicalizeConfig};
///
/// let cfg = CanonicalizeConfig::default();
/// let a = normalize("function Add(a, b) {  // sum\n  return a + b;\n}", "javascript", &cfg);
/// let b = normalize("function add(a, b) { return a + b; }", "javascript", &cfg);
/// assert_eq!(a, b);
/// ```
pub fn normalize(text: &str, language_id: &str, cfg: &CanonicalizeConfig) -> String {
    let stripped: Cow<str> = if cfg.strip_comments {
        Cow::Owned(strip_comments(text, language_id))
    } else {
        Cow::Borrowed(text)
    };

    let unicode: Cow<str> = if cfg.normalize_unicode {
        Cow::Owned(stripped.nfkc().collect::<String>())
    } else {
        stripped
    };

    let mut normalized = String::with_capacity(unicode.len());
    for segment in unicode.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        if cfg.lowercase {
            // Lowercasing can expand a single character into several.
            normalized.extend(segment.chars().flat_map(char::to_lowercase));
        } else {
            normalized.push_str(segment);
        }
    }
    normalized
}

/// Count lines of code: lines that are non-blank once comments are removed.
///
/// ```rust
/// use canonical::count_loc;
///
/// let src = "# config\nx = 1\n\n# done\ny = 2\n";
/// assert_eq!(count_loc(src, "python"), 2);
/// ```
pub fn count_loc(text: &str, language_id: &str) -> usize {
    strip_comments(text, language_id)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}
