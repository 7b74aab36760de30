//! Whitespace helpers shared by normalization and line segmentation.
//!
//! Whitespace is Unicode whitespace throughout (`char::is_whitespace`), so a
//! line holding only a tab or a non-breaking space counts as blank.

/// Collapses whitespace runs into a single ASCII space and trims both ends.
///
/// ```rust
/// use canonical::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  if (x)\n\t{ y(); }  "), "if (x) { y(); }");
/// assert_eq!(collapse_whitespace(" \n\t "), "");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

/// True for empty or whitespace-only text.
///
/// ```rust
/// use canonical::is_blank;
///
/// assert!(is_blank(""));
/// assert!(is_blank(" \t\u{00A0}"));
/// assert!(!is_blank("  }"));
/// ```
#[inline]
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_handles_crlf() {
        assert_eq!(collapse_whitespace("a\r\nb"), "a b");
    }

    #[test]
    fn collapse_is_idempotent() {
        let once = collapse_whitespace("  x   y ");
        assert_eq!(collapse_whitespace(&once), once);
    }
}
