//! Comment stripping driven by a [`CommentSyntax`].
//!
//! A small state machine walks the text once. String literals are copied
//! verbatim so that `"http://example.com"` or `'#fff'` survive; comments are
//! dropped. Newlines are always preserved so that line numbering of the
//! stripped text matches the input.

use crate::language::{CommentSyntax, Language};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment(&'static str),
    Str(char),
}

/// Remove comments from `text` using the syntax of `language_id`.
///
/// Unknown languages use the generic pass. Never fails.
///
/// ```rust
/// use canonical::strip_comments;
///
/// let js = "let a = 1; // counter\nlet url = \"http://x\"; /* note */";
/// assert_eq!(strip_comments(js, "javascript"), "let a = 1; \nlet url = \"http://x\";  ");
///
/// let py = "x = '#not a comment'  # real comment";
/// assert_eq!(strip_comments(py, "python"), "x = '#not a comment'  ");
/// ```
pub fn strip_comments(text: &str, language_id: &str) -> String {
    let syntax = Language::from_id(language_id).syntax_for(language_id);
    strip_comments_with(text, &syntax)
}

/// Remove comments from `text` using an explicit [`CommentSyntax`].
pub fn strip_comments_with(text: &str, syntax: &CommentSyntax) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        match state {
            State::Code => {
                if let Some((open, close)) = syntax.block {
                    if rest.starts_with(open) {
                        state = State::BlockComment(close);
                        i += open.len();
                        continue;
                    }
                }
                if let Some(marker) = syntax.line.iter().find(|m| rest.starts_with(**m)) {
                    let boundary_ok = !(syntax.hash_needs_boundary && *marker == "#")
                        || prev.map_or(true, char::is_whitespace);
                    if boundary_ok {
                        state = State::LineComment;
                        i += marker.len();
                        continue;
                    }
                }
                if syntax.quotes.contains(&ch) {
                    state = State::Str(ch);
                }
                out.push(ch);
                prev = Some(ch);
                i += ch.len_utf8();
            }
            State::LineComment => {
                if ch == '\n' {
                    out.push('\n');
                    prev = Some('\n');
                    state = State::Code;
                }
                i += ch.len_utf8();
            }
            State::BlockComment(close) => {
                if rest.starts_with(close) {
                    // Keep the tokens on either side of the comment apart.
                    out.push(' ');
                    prev = Some(' ');
                    state = State::Code;
                    i += close.len();
                    continue;
                }
                if ch == '\n' {
                    out.push('\n');
                }
                i += ch.len_utf8();
            }
            State::Str(quote) => {
                out.push(ch);
                prev = Some(ch);
                i += ch.len_utf8();
                if ch == '\\' {
                    if let Some(escaped) = text[i..].chars().next() {
                        if escaped != '\n' {
                            out.push(escaped);
                            prev = Some(escaped);
                            i += escaped.len_utf8();
                        }
                    }
                } else if ch == quote || ch == '\n' {
                    // An unterminated literal ends at the newline.
                    state = State::Code;
                }
            }
        }
    }

    out
}
