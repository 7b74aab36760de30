//! Per-language comment syntax table.
//!
//! The duplicate detector never parses source code. The only thing it needs to
//! know about a language is how comments and string literals are spelled, so
//! that comments can be removed before hashing and strings are not mistaken
//! for comments. Editor language identifiers map onto a small set of comment
//! families; anything unknown falls back to [`Language::Generic`].
//!
//! ```rust
//! use canonical::Language;
//!
//! assert_eq!(Language::from_id("typescriptreact"), Language::CStyle);
//! assert_eq!(Language::from_id("python"), Language::Hash);
//! assert_eq!(Language::from_id("klingon"), Language::Generic);
//! ```

use serde::{Deserialize, Serialize};

/// Comment family of a source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// `//` line comments and `/* */` block comments.
    CStyle,
    /// `#` line comments.
    Hash,
    /// `--` line comments (SQL, Lua, Haskell).
    DoubleDash,
    /// `<!-- -->` block comments.
    Markup,
    /// PHP accepts `//`, `#` and `/* */`.
    Php,
    /// Unknown language: `//`, `/* */` and whitespace-preceded `#`.
    Generic,
}

/// Lexical description of how a language spells comments and strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    pub line: &'static [&'static str],
    pub block: Option<(&'static str, &'static str)>,
    pub quotes: &'static [char],
    /// `#` only opens a comment at line start or after whitespace.
    pub hash_needs_boundary: bool,
}

const C_STYLE: CommentSyntax = CommentSyntax {
    line: &["//"],
    block: Some(("/*", "*/")),
    quotes: &['"', '\'', '`'],
    hash_needs_boundary: false,
};

// Rust lifetimes (`'a`) would open a bogus char literal.
const RUST: CommentSyntax = CommentSyntax {
    line: &["//"],
    block: Some(("/*", "*/")),
    quotes: &['"'],
    hash_needs_boundary: false,
};

const HASH: CommentSyntax = CommentSyntax {
    line: &["#"],
    block: None,
    quotes: &['"', '\''],
    hash_needs_boundary: false,
};

const DOUBLE_DASH: CommentSyntax = CommentSyntax {
    line: &["--"],
    block: None,
    quotes: &['"', '\''],
    hash_needs_boundary: false,
};

const MARKUP: CommentSyntax = CommentSyntax {
    line: &[],
    block: Some(("<!--", "-->")),
    quotes: &[],
    hash_needs_boundary: false,
};

const PHP: CommentSyntax = CommentSyntax {
    line: &["//", "#"],
    block: Some(("/*", "*/")),
    quotes: &['"', '\''],
    hash_needs_boundary: false,
};

const GENERIC: CommentSyntax = CommentSyntax {
    line: &["//", "#"],
    block: Some(("/*", "*/")),
    quotes: &['"'],
    hash_needs_boundary: true,
};

impl Language {
    /// Map an editor language identifier onto its comment family.
    ///
    /// Matching is case-insensitive. Unknown identifiers degrade to
    /// [`Language::Generic`]; this never fails.
    pub fn from_id(language_id: &str) -> Self {
        match language_id.trim().to_ascii_lowercase().as_str() {
            "javascript" | "javascriptreact" | "typescript" | "typescriptreact" | "js" | "jsx"
            | "ts" | "tsx" | "java" | "c" | "cpp" | "c++" | "objective-c" | "objective-cpp"
            | "csharp" | "cs" | "go" | "rust" | "rs" | "swift" | "kotlin" | "scala" | "dart"
            | "groovy" | "zig" | "css" | "scss" | "less" | "jsonc" | "proto" => Language::CStyle,
            "python" | "py" | "ruby" | "rb" | "shell" | "shellscript" | "bash" | "sh" | "zsh"
            | "perl" | "r" | "yaml" | "yml" | "toml" | "dockerfile" | "makefile" | "cmake"
            | "powershell" | "elixir" | "julia" | "nim" | "coffeescript" => Language::Hash,
            "sql" | "lua" | "haskell" | "hs" | "ada" | "elm" | "vhdl" => Language::DoubleDash,
            "html" | "xml" | "svg" | "vue-html" | "markdown" | "md" => Language::Markup,
            "php" => Language::Php,
            _ => Language::Generic,
        }
    }

    /// Comment syntax for this family. `language_id` refines the quote set
    /// for languages whose apostrophes are not string delimiters.
    pub fn syntax_for(self, language_id: &str) -> CommentSyntax {
        match self {
            Language::CStyle => {
                if matches!(
                    language_id.trim().to_ascii_lowercase().as_str(),
                    "rust" | "rs"
                ) {
                    RUST
                } else {
                    C_STYLE
                }
            }
            other => other.syntax(),
        }
    }

    /// Default comment syntax for this family.
    pub fn syntax(self) -> CommentSyntax {
        match self {
            Language::CStyle => C_STYLE,
            Language::Hash => HASH,
            Language::DoubleDash => DOUBLE_DASH,
            Language::Markup => MARKUP,
            Language::Php => PHP,
            Language::Generic => GENERIC,
        }
    }

    /// Line-comment markers that may open a file/path header comment.
    pub fn header_markers() -> &'static [&'static str] {
        &["//", "#", "--", "/*", "<!--", ";"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_map_to_families() {
        assert_eq!(Language::from_id("javascript"), Language::CStyle);
        assert_eq!(Language::from_id("Rust"), Language::CStyle);
        assert_eq!(Language::from_id("shellscript"), Language::Hash);
        assert_eq!(Language::from_id("sql"), Language::DoubleDash);
        assert_eq!(Language::from_id("html"), Language::Markup);
        assert_eq!(Language::from_id("php"), Language::Php);
    }

    #[test]
    fn unknown_id_is_generic() {
        assert_eq!(Language::from_id(""), Language::Generic);
        assert_eq!(Language::from_id("brainfuck"), Language::Generic);
    }

    #[test]
    fn rust_drops_single_quote_strings() {
        let syntax = Language::from_id("rust").syntax_for("rust");
        assert_eq!(syntax.quotes, &['"']);
        let ts = Language::from_id("typescript").syntax_for("typescript");
        assert!(ts.quotes.contains(&'\''));
    }
}
