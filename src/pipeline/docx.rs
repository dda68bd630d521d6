//! Markdown → DOCX block mapping.
//!
//! Works on the raw markdown source, one line at a time, with no
//! markdown parser involved. Each line maps to exactly one [`Block`], so
//! block order always equals line order and blank lines survive as empty
//! paragraphs.
//!
//! Inline emphasis is recognised by a single non-nesting regex: the first
//! delimiter pair that closes wins, and markers inside a bold span are kept
//! as literal text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `1. `, `12. ` …
static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s").unwrap());

/// Bold (`**x**`, `__x__`) or italic (`*x*`, `_x_`) spans, shortest match.
static RE_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*.*?\*\*|\*.*?\*|__.*?__|_.*?_)").unwrap());

/// A run of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }
}

/// One output paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// `# `, `## ` or `### ` line; `level` is 1..=3.
    Heading { level: u8, text: String },
    /// `- ` or `* ` line.
    Bullet(String),
    /// `N. ` line.
    Numbered(String),
    Paragraph(Vec<Run>),
    /// Blank line.
    Empty,
}

/// Map markdown source to blocks, one per line.
pub fn map_markdown(markdown: &str) -> Vec<Block> {
    markdown
        .split('\n')
        .map(|line| map_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// Classify a single line.
pub fn map_line(line: &str) -> Block {
    if line.trim().is_empty() {
        return Block::Empty;
    }

    for (level, prefix) in [(1u8, "# "), (2, "## "), (3, "### ")] {
        if let Some(text) = line.strip_prefix(prefix) {
            return Block::Heading {
                level,
                text: text.to_string(),
            };
        }
    }

    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::Bullet(text.to_string());
    }

    if let Some(m) = RE_NUMBERED.find(line) {
        return Block::Numbered(line[m.end()..].to_string());
    }

    if line.contains('*') || line.contains('_') {
        Block::Paragraph(split_runs(line))
    } else {
        Block::Paragraph(vec![Run::plain(line)])
    }
}

/// Split a line into plain, bold and italic runs. Empty runs are dropped.
fn split_runs(line: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut last = 0;
    for m in RE_EMPHASIS.find_iter(line) {
        runs.extend(piece_to_run(&line[last..m.start()]));
        runs.extend(piece_to_run(m.as_str()));
        last = m.end();
    }
    runs.extend(piece_to_run(&line[last..]));
    runs
}

fn piece_to_run(piece: &str) -> Option<Run> {
    let run = if piece.starts_with("**") && piece.ends_with("**") {
        Run::bold(strip_delimiters(piece, 2))
    } else if piece.starts_with('*') && piece.ends_with('*') {
        Run::italic(strip_delimiters(piece, 1))
    } else if piece.starts_with("__") && piece.ends_with("__") {
        Run::bold(strip_delimiters(piece, 2))
    } else if piece.starts_with('_') && piece.ends_with('_') {
        Run::italic(strip_delimiters(piece, 1))
    } else {
        Run::plain(piece)
    };
    // A bare `****` or `__` would be an empty w:r; Word renders nothing for
    // it, so it is left out of the paragraph.
    (!run.text.is_empty()).then_some(run)
}

/// Drop `n` delimiter bytes from each end; empty when they overlap.
fn strip_delimiters(piece: &str, n: usize) -> &str {
    piece.get(n..piece.len().saturating_sub(n)).unwrap_or("")
}
