//! Comment block locator.
//!
//! Walks source text with a small quote-state tracker so comment-like
//! tokens inside string literals are skipped. Best effort, not a full
//! parser: strings are assumed not to span lines.

use super::dialects::{CommentStyle, Language};

/// A raw comment block with its source line range.
///
/// Consecutive whole-line comments coalesce into one block; a comment
/// trailing code on the same line is always its own block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    /// 1-indexed first line.
    pub start_line: usize,
    /// 1-indexed last line (inclusive).
    pub end_line: usize,
    /// Comment text with markers and decorations stripped, one entry per
    /// source line.
    pub lines: Vec<String>,
    /// True when code precedes the comment on its first line.
    pub trails_code: bool,
}

impl CommentBlock {
    /// The block's text joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// What the per-line scan found.
enum LineScan {
    /// No comment on this line.
    None,
    /// A line comment: stripped text, and whether code precedes it.
    Line { text: String, trails_code: bool },
    /// A block comment opened (and possibly closed) on this line.
    Block {
        text: String,
        trails_code: bool,
        closed: bool,
    },
    /// Continuation of a block comment; `closed` when the terminator was hit.
    BlockContinuation { text: String, closed: bool },
}

/// Locate all comment blocks in `content` for the given language.
pub fn locate_blocks(content: &str, language: Language) -> Vec<CommentBlock> {
    let style = language.comment_style();
    let mut blocks: Vec<CommentBlock> = Vec::new();
    let mut current: Option<CommentBlock> = None;
    let mut in_block_comment = false;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let scan = if in_block_comment {
            scan_block_continuation(raw_line, style)
        } else {
            scan_line(raw_line, style)
        };

        match scan {
            LineScan::None => {
                // Any non-comment line ends the current run.
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            LineScan::Line { text, trails_code } => {
                match current.as_mut() {
                    // Whole-line comments coalesce with the previous line.
                    Some(block)
                        if !trails_code
                            && !block.trails_code
                            && block.end_line + 1 == line_no =>
                    {
                        block.end_line = line_no;
                        block.lines.push(text);
                    }
                    _ => {
                        if let Some(block) = current.take() {
                            blocks.push(block);
                        }
                        current = Some(CommentBlock {
                            start_line: line_no,
                            end_line: line_no,
                            lines: vec![text],
                            trails_code,
                        });
                    }
                }
                if current.as_ref().is_some_and(|b| b.trails_code) {
                    // Trailing comments never absorb following lines.
                    blocks.push(current.take().unwrap());
                }
            }
            LineScan::Block {
                text,
                trails_code,
                closed,
            } => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(CommentBlock {
                    start_line: line_no,
                    end_line: line_no,
                    lines: vec![text],
                    trails_code,
                });
                if closed {
                    blocks.push(current.take().unwrap());
                } else {
                    in_block_comment = true;
                }
            }
            LineScan::BlockContinuation { text, closed } => {
                if let Some(block) = current.as_mut() {
                    block.end_line = line_no;
                    block.lines.push(text);
                }
                if closed {
                    in_block_comment = false;
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                }
            }
        }
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }
    blocks
}

/// Scan one line that starts outside any block comment.
fn scan_line(line: &str, style: &CommentStyle) -> LineScan {
    let bytes = line.as_bytes();
    let mut in_string: Option<char> = None;
    let mut saw_code = false;
    let mut i = 0;

    while i < bytes.len() {
        let ch = line[i..].chars().next().unwrap();

        if let Some(quote) = in_string {
            if ch == '\\' {
                i += ch.len_utf8();
                if let Some(next) = line[i..].chars().next() {
                    i += next.len_utf8();
                }
                continue;
            }
            if ch == quote {
                in_string = None;
            }
            i += ch.len_utf8();
            continue;
        }

        // Comment markers are only honored outside string literals.
        if let Some(marker) = style.line_markers.iter().find(|m| line[i..].starts_with(**m)) {
            let text = strip_line_decoration(&line[i + marker.len()..]);
            return LineScan::Line {
                text,
                trails_code: saw_code,
            };
        }
        if let Some((open, close)) = style
            .block_pairs
            .iter()
            .find(|(open, _)| line[i..].starts_with(*open))
        {
            let after_open = &line[i + open.len()..];
            return match after_open.find(close) {
                Some(end) => LineScan::Block {
                    text: strip_block_decoration(&after_open[..end]),
                    trails_code: saw_code,
                    closed: true,
                },
                None => LineScan::Block {
                    text: strip_block_decoration(after_open),
                    trails_code: saw_code,
                    closed: false,
                },
            };
        }

        if style.string_quotes.contains(&ch) {
            in_string = Some(ch);
        } else if !ch.is_whitespace() {
            saw_code = true;
        }
        i += ch.len_utf8();
    }

    LineScan::None
}

/// Scan one line inside an open block comment.
fn scan_block_continuation(line: &str, style: &CommentStyle) -> LineScan {
    let close = style
        .block_pairs
        .first()
        .map(|(_, close)| *close)
        .unwrap_or("*/");
    match line.find(close) {
        Some(end) => LineScan::BlockContinuation {
            text: strip_block_decoration(&line[..end]),
            closed: true,
        },
        None => LineScan::BlockContinuation {
            text: strip_block_decoration(line),
            closed: false,
        },
    }
}

/// Strip at most one leading space after a line-comment marker.
fn strip_line_decoration(text: &str) -> String {
    text.strip_prefix(' ').unwrap_or(text).to_string()
}

/// Strip leading `*` gutters and surrounding whitespace from block
/// comment lines.
fn strip_block_decoration(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("**").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
    trimmed.strip_prefix(' ').unwrap_or(trimmed).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_line_comments_coalesce() {
        let content = "// first\n// second\n\nfn main() {}\n";
        let blocks = locate_blocks(content, Language::Rust);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 1);
        assert_eq!(blocks[0].end_line, 2);
        assert_eq!(blocks[0].lines, vec!["first", "second"]);
        assert!(!blocks[0].trails_code);
    }

    #[test]
    fn test_trailing_comment_is_its_own_block() {
        let content = "let x = 1; // inline note\n// standalone\n";
        let blocks = locate_blocks(content, Language::Rust);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].trails_code);
        assert_eq!(blocks[0].lines, vec!["inline note"]);
        assert!(!blocks[1].trails_code);
    }

    #[test]
    fn test_comment_token_inside_string_is_skipped() {
        let content = "let url = \"https://example.com\";\nlet s = '# not python';\n";
        assert!(locate_blocks(content, Language::TypeScript).is_empty());
    }

    #[test]
    fn test_multiline_block_comment() {
        let content = "/**\n * @acp:module \"Billing\"\n * details\n */\nclass Billing {}\n";
        let blocks = locate_blocks(content, Language::TypeScript);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 1);
        assert_eq!(blocks[0].end_line, 4);
        assert_eq!(blocks[0].lines[1], "@acp:module \"Billing\"");
        assert_eq!(blocks[0].lines[2], "details");
    }

    #[test]
    fn test_hash_dialect() {
        let content = "# @acp:domain billing - payment flows\nx = 1\n";
        let blocks = locate_blocks(content, Language::Python);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines[0], "@acp:domain billing - payment flows");
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let content = r#"let s = "say \"// hi\""; // real comment"#;
        let blocks = locate_blocks(content, Language::TypeScript);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines[0], "real comment");
    }

    #[test]
    fn test_single_line_block_comment() {
        let content = "int x; /* note */\n";
        let blocks = locate_blocks(content, Language::C);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].trails_code);
        assert_eq!(blocks[0].lines[0], "note");
    }

    #[test]
    fn test_locator_is_deterministic() {
        let content = "// a\n/* b */\nfn f() {} // c\n";
        let first = locate_blocks(content, Language::Rust);
        let second = locate_blocks(content, Language::Rust);
        assert_eq!(first, second);
    }
}
