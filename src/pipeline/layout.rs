//! Text layout: plain text → positioned draw commands on A4 pages.
//!
//! This is a line printer, not a typesetter. Each source line is classified
//! as heading or body, greedily word-wrapped against the content width, and
//! placed top-down with a fixed line advance. Pages break manually whenever
//! the cursor gets within one line of the bottom margin.
//!
//! ## Cursor rules
//!
//! * Before each source line, and after each wrapped sub-line is emitted,
//!   the cursor is checked; if `y < margin + line_height` a new page starts
//!   and `y` resets to `page_height - margin`.
//! * After a source line (blank or not) the cursor drops one more line.
//!   Blank lines therefore draw nothing but still take vertical space.
//!
//! Coordinates are PDF user space: origin bottom-left, `y` grows upward.

use crate::classify::HeadingRule;
use crate::config::PageLayout;
use crate::pipeline::fonts::{FontMetrics, FontWeight};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One line of text placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    /// 0-based page index.
    pub page: usize,
    pub text: String,
    pub x: f32,
    /// Baseline, in points from the bottom edge.
    pub y: f32,
    pub weight: FontWeight,
    pub size: f32,
}

/// Result of laying out a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOutput {
    pub commands: Vec<DrawCommand>,
    /// Number of pages allocated, including trailing pages with no text.
    pub page_count: usize,
}

/// Position of the next line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub page_index: usize,
    pub y: f32,
}

/// Lays out text against a page geometry and a font-metrics source.
pub struct LayoutEngine<'a, M: FontMetrics> {
    page: PageLayout,
    metrics: &'a M,
    rule: HeadingRule,
}

impl<'a, M: FontMetrics> LayoutEngine<'a, M> {
    pub fn new(page: PageLayout, metrics: &'a M) -> Self {
        Self {
            page,
            metrics,
            rule: HeadingRule::LAYOUT,
        }
    }

    /// Override the heading rule. Default: [`HeadingRule::LAYOUT`].
    pub fn with_rule(mut self, rule: HeadingRule) -> Self {
        self.rule = rule;
        self
    }

    /// Lay out `text` from the top of the first page.
    pub fn layout(&self, text: &str) -> LayoutOutput {
        let mut run = LayoutRun {
            page: &self.page,
            cursor: PageCursor {
                page_index: 0,
                y: self.page.top(),
            },
            page_count: 1,
            commands: Vec::new(),
        };
        let line_height = self.page.line_height();
        let content_width = self.page.content_width();

        for line in text.split('\n') {
            run.break_page_if_full();

            let (weight, size) = if self.rule.is_heading(line) {
                (
                    FontWeight::Bold,
                    self.page.font_size + self.page.heading_size_delta,
                )
            } else {
                (FontWeight::Regular, self.page.font_size)
            };

            if !line.trim().is_empty() {
                let mut current = String::new();
                for word in line.split(' ') {
                    let candidate = if current.is_empty() {
                        word.to_string()
                    } else {
                        format!("{current} {word}")
                    };
                    let width = self.metrics.text_width(&candidate, weight, size);

                    if width > content_width && !current.is_empty() {
                        run.emit(std::mem::take(&mut current), weight, size);
                        run.cursor.y -= line_height;
                        run.break_page_if_full();
                        current = word.to_string();
                    } else {
                        current = candidate;
                    }
                }
                if !current.is_empty() {
                    run.emit(current, weight, size);
                }
            }

            run.cursor.y -= line_height;
        }

        debug!(
            "Laid out {} lines on {} pages",
            run.commands.len(),
            run.page_count
        );

        LayoutOutput {
            commands: run.commands,
            page_count: run.page_count,
        }
    }
}

/// Mutable state of one layout pass.
struct LayoutRun<'p> {
    page: &'p PageLayout,
    cursor: PageCursor,
    page_count: usize,
    commands: Vec<DrawCommand>,
}

impl LayoutRun<'_> {
    fn break_page_if_full(&mut self) {
        if self.cursor.y < self.page.margin + self.page.line_height() {
            self.page_count += 1;
            self.cursor = PageCursor {
                page_index: self.cursor.page_index + 1,
                y: self.page.top(),
            };
        }
    }

    fn emit(&mut self, text: String, weight: FontWeight, size: f32) {
        self.commands.push(DrawCommand {
            page: self.cursor.page_index,
            text,
            x: self.page.margin,
            y: self.cursor.y,
            weight,
            size,
        });
    }
}
