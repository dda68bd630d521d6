//! HTML → plain text via `scraper`.
//!
//! Produces the line-oriented text the layout engine consumes. Block
//! elements become paragraphs separated by one blank line and running text
//! is word-wrapped at a fixed column. Some structure survives as plain-text
//! conventions:
//!
//! | HTML | Text |
//! |------|------|
//! | `h1`, `h2` | as written |
//! | `h3`–`h6` | UPPER-CASED |
//! | `a` | `text [href]` (href dropped when it equals the text) |
//! | `ul` / `ol` items | ` * item` / `1. item` |
//! | `pre` | verbatim |
//! | `blockquote` | lines prefixed `> ` |
//! | `hr` | a dashed rule |
//! | `img` | its alt text |
//! | `br` | line break |

use scraper::{ElementRef, Html, Node};

/// Options for [`html_to_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Maximum characters per wrapped line. Default: 80.
    pub wrap_column: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self { wrap_column: 80 }
    }
}

/// Convert an HTML fragment to wrapped plain text.
pub fn html_to_text(html: &str, options: &TextOptions) -> String {
    let fragment = Html::parse_fragment(html);
    let walker = Walker { options };
    let mut blocks = Vec::new();
    walker.blocks(fragment.root_element(), &mut blocks);
    blocks.retain(|b| !b.trim().is_empty());
    blocks.join("\n\n")
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "pre"
            | "blockquote"
            | "hr"
            | "table"
            | "thead"
            | "tbody"
            | "tfoot"
            | "tr"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "main"
            | "nav"
            | "aside"
            | "figure"
            | "figcaption"
            | "dl"
            | "dt"
            | "dd"
            | "body"
            | "head"
            | "script"
            | "style"
            | "title"
    )
}

struct Walker<'o> {
    options: &'o TextOptions,
}

impl Walker<'_> {
    /// Append the blocks under `parent` to `out`. Loose inline content
    /// between block children is gathered into its own paragraph.
    fn blocks(&self, parent: ElementRef<'_>, out: &mut Vec<String>) {
        let mut inline = String::new();
        for child in parent.children() {
            match child.value() {
                Node::Text(text) => push_text(&mut inline, text),
                Node::Element(_) => {
                    let Some(element) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = element.value().name();
                    if is_block(name) {
                        out.push(wrap(&std::mem::take(&mut inline), self.options.wrap_column));
                        self.block(element, name, out);
                    } else {
                        self.inline(element, &mut inline);
                    }
                }
                _ => {}
            }
        }
        out.push(wrap(&inline, self.options.wrap_column));
    }

    fn block(&self, element: ElementRef<'_>, name: &str, out: &mut Vec<String>) {
        let column = self.options.wrap_column;
        match name {
            "h1" | "h2" | "p" | "dt" | "figcaption" => {
                out.push(wrap(&self.inline_text(element), column));
            }
            "h3" | "h4" | "h5" | "h6" => {
                out.push(wrap(&self.inline_text(element).to_uppercase(), column));
            }
            "pre" => {
                let text: String = element.text().collect();
                out.push(text.trim_end_matches('\n').to_string());
            }
            "hr" => out.push("-".repeat(column)),
            "ul" => out.push(self.list(element, false, 0)),
            "ol" => out.push(self.list(element, true, 0)),
            "blockquote" => {
                let mut inner = Vec::new();
                self.blocks(element, &mut inner);
                inner.retain(|b| !b.trim().is_empty());
                let quoted = inner
                    .join("\n\n")
                    .lines()
                    .map(|l| {
                        if l.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {l}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                out.push(quoted);
            }
            "head" | "script" | "style" | "title" => {}
            _ => self.blocks(element, out),
        }
    }

    /// Render a list, recursing into nested lists with a deeper indent.
    fn list(&self, list: ElementRef<'_>, ordered: bool, depth: usize) -> String {
        let indent = "   ".repeat(depth);
        let mut number: usize = list
            .value()
            .attr("start")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        let mut lines = Vec::new();

        for item in list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "li")
        {
            let prefix = if ordered {
                format!("{number}. ")
            } else {
                " * ".to_string()
            };
            number += 1;

            let mut text = String::new();
            let mut nested = Vec::new();
            for child in item.children() {
                match child.value() {
                    Node::Text(t) => push_text(&mut text, t),
                    Node::Element(_) => {
                        let Some(el) = ElementRef::wrap(child) else {
                            continue;
                        };
                        match el.value().name() {
                            "ul" => nested.push(self.list(el, false, depth + 1)),
                            "ol" => nested.push(self.list(el, true, depth + 1)),
                            "p" => {
                                text.push(' ');
                                self.inline_children(el, &mut text);
                            }
                            _ => self.inline(el, &mut text),
                        }
                    }
                    _ => {}
                }
            }

            let hang = indent.len() + prefix.len();
            let width = self.options.wrap_column.saturating_sub(hang);
            let body = wrap(&text, width);
            let pad = " ".repeat(hang);
            let mut body_lines = body.lines();
            let first = format!("{indent}{prefix}{}", body_lines.next().unwrap_or(""));
            lines.push(first.trim_end().to_string());
            lines.extend(body_lines.map(|l| format!("{pad}{l}")));
            lines.extend(nested);
        }
        lines.join("\n")
    }

    fn inline_text(&self, element: ElementRef<'_>) -> String {
        let mut buf = String::new();
        self.inline_children(element, &mut buf);
        buf
    }

    fn inline_children(&self, element: ElementRef<'_>, buf: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_text(buf, text),
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        self.inline(el, buf);
                    }
                }
                _ => {}
            }
        }
    }

    fn inline(&self, element: ElementRef<'_>, buf: &mut String) {
        match element.value().name() {
            "br" => buf.push('\n'),
            "img" => {
                if let Some(alt) = element.value().attr("alt") {
                    buf.push_str(alt);
                }
            }
            "a" => {
                let text = collapse(&self.inline_text(element));
                match element.value().attr("href") {
                    Some(href) if !href.is_empty() && text != href => {
                        if text.is_empty() {
                            buf.push_str(href);
                        } else {
                            buf.push_str(&format!("{text} [{href}]"));
                        }
                    }
                    _ => buf.push_str(&text),
                }
            }
            "td" | "th" => {
                self.inline_children(element, buf);
                buf.push(' ');
            }
            "script" | "style" => {}
            _ => self.inline_children(element, buf),
        }
    }
}

/// Append source text; source newlines are ordinary whitespace.
fn push_text(buf: &mut String, text: &str) {
    buf.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word wrap. `\n` marks a hard break; other whitespace collapses.
fn wrap(text: &str, column: usize) -> String {
    let column = column.max(1);
    let mut lines = Vec::new();
    for segment in text.split('\n') {
        let mut line = String::new();
        let mut len = 0;
        for word in segment.split_whitespace() {
            let word_len = word.chars().count();
            if len > 0 && len + 1 + word_len > column {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.push_str(word);
            len += word_len;
        }
        lines.push(line);
    }
    lines.join("\n").trim_matches('\n').to_string()
}
