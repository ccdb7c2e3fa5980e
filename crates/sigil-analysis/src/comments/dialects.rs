//! Per-language comment dialects.
//!
//! Adding a language is one table entry, not a new implementation.

use serde::{Deserialize, Serialize};

/// Supported source languages (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Ruby,
    Php,
    Kotlin,
    Cpp,
    C,
    Swift,
}

impl Language {
    /// Resolve a language from its tag (as supplied in the input file list).
    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag {
            "typescript" => Some(Language::TypeScript),
            "javascript" => Some(Language::JavaScript),
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "csharp" => Some(Language::CSharp),
            "go" => Some(Language::Go),
            "rust" => Some(Language::Rust),
            "ruby" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "kotlin" => Some(Language::Kotlin),
            "cpp" => Some(Language::Cpp),
            "c" => Some(Language::C),
            "swift" => Some(Language::Swift),
            _ => None,
        }
    }

    /// Detect language from a file extension string.
    pub fn from_extension(ext: Option<&str>) -> Option<Language> {
        match ext? {
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            "rb" | "rake" | "gemspec" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "kt" | "kts" => Some(Language::Kotlin),
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Some(Language::Cpp),
            "c" | "h" => Some(Language::C),
            "swift" => Some(Language::Swift),
            _ => None,
        }
    }

    /// Returns the display name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Kotlin => "Kotlin",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Swift => "Swift",
        }
    }

    /// The comment dialect for this language.
    pub fn comment_style(&self) -> &'static CommentStyle {
        match self {
            Language::Python | Language::Ruby => &HASH_STYLE,
            Language::Php => &PHP_STYLE,
            _ => &C_STYLE,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One comment dialect: line markers, block delimiters, string quotes the
/// scanner must respect.
#[derive(Debug, Clone)]
pub struct CommentStyle {
    /// Line comment introducers, longest first.
    pub line_markers: &'static [&'static str],
    /// Block comment (open, close) pairs.
    pub block_pairs: &'static [(&'static str, &'static str)],
    /// Quote characters that open string literals.
    pub string_quotes: &'static [char],
}

static C_STYLE: CommentStyle = CommentStyle {
    line_markers: &["///", "//!", "//"],
    block_pairs: &[("/*", "*/")],
    string_quotes: &['"', '\'', '`'],
};

static HASH_STYLE: CommentStyle = CommentStyle {
    line_markers: &["#"],
    block_pairs: &[],
    string_quotes: &['"', '\''],
};

static PHP_STYLE: CommentStyle = CommentStyle {
    line_markers: &["//", "#"],
    block_pairs: &[("/*", "*/")],
    string_quotes: &['"', '\''],
};
