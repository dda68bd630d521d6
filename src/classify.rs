//! Heading detection shared by the PDF layout engine and the optimizer's
//! HTML regeneration step.
//!
//! Both places look at a single line of plain text and guess whether it is a
//! heading. They use the same ingredients with different thresholds, so the
//! heuristic lives here once as a [`HeadingRule`] with two presets rather
//! than as two drifting copies.
//!
//! The all-caps test is deliberately naive: any short line whose upper-cased
//! form equals itself counts, which includes short all-caps sentences and
//! lines with no letters at all (`"2024"`, `"---"`).

use once_cell::sync::Lazy;
use regex::Regex;

/// One to three `=`, `#` or `*` markers followed by whitespace.
static RE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[=#*]{1,3}\s").unwrap());

/// Starts with a capital and contains no sentence-ending punctuation.
static RE_SENTENCE_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][^.!?]*$").unwrap());

/// A parameterised heading heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingRule {
    /// Lines must be strictly shorter than this (in chars) for the
    /// case-based tests to apply.
    pub max_len: usize,
    /// Accept marker-prefixed lines (`# `, `== `, `* `) regardless of length.
    pub marker_prefix: bool,
    /// Also accept short lines that look like a capitalised phrase without
    /// terminal punctuation.
    pub sentence_case: bool,
}

impl HeadingRule {
    /// Rule used by the Markdown → PDF layout engine:
    /// marker-prefixed, or short and all-caps.
    pub const LAYOUT: HeadingRule = HeadingRule {
        max_len: 60,
        marker_prefix: true,
        sentence_case: false,
    };

    /// Rule used when rebuilding HTML from extracted PDF text:
    /// short, and either all-caps or sentence-like.
    pub const REFLOW: HeadingRule = HeadingRule {
        max_len: 60,
        marker_prefix: false,
        sentence_case: true,
    };

    /// Classify one line.
    pub fn is_heading(&self, line: &str) -> bool {
        if self.marker_prefix && RE_MARKER.is_match(line) {
            return true;
        }
        if line.chars().count() >= self.max_len {
            return false;
        }
        is_all_caps(line) || (self.sentence_case && RE_SENTENCE_LIKE.is_match(line))
    }
}

/// True when upper-casing the line leaves it unchanged.
fn is_all_caps(line: &str) -> bool {
    line.to_uppercase() == line
}
