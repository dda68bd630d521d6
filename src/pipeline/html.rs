//! Reflow of extracted PDF text into a printable HTML document.
//!
//! Every non-blank line of the extracted text becomes one element: `<h2>`
//! when [`HeadingRule::REFLOW`] accepts it, `<p>` otherwise. Text is
//! HTML-escaped. The stylesheet is deliberately plain; the point is a small
//! re-rendered PDF, not a faithful one.

use crate::classify::HeadingRule;
use html_escape::encode_text;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;font-size:11pt;\
line-height:1.4;color:#000}h2{font-size:14pt;margin:1em 0 .4em}p{margin:0 0 .4em}";

/// Build a standalone HTML document from extracted text.
pub fn generate_html(text: &str) -> String {
    let mut body = String::with_capacity(text.len() + text.len() / 4);
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let tag = if HeadingRule::REFLOW.is_heading(line) {
            "h2"
        } else {
            "p"
        };
        body.push_str(&format!("<{tag}>{}</{tag}>\n", encode_text(line)));
    }

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><style>{STYLE}</style></head>\n\
<body>\n{body}</body></html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(html: &str) -> &str {
        let start = html.find("<body>\n").unwrap() + "<body>\n".len();
        let end = html.find("</body>").unwrap();
        &html[start..end]
    }

    #[test]
    fn headings_and_paragraphs() {
        let html = generate_html("Introduction\nThis is the first paragraph.\nRESULTS\n");
        assert_eq!(
            body_of(&html),
            "<h2>Introduction</h2>\n<p>This is the first paragraph.</p>\n<h2>RESULTS</h2>\n"
        );
    }

    #[test]
    fn blank_lines_are_dropped_and_lines_trimmed() {
        let html = generate_html("\n   \n  indented body text.  \n\n");
        assert_eq!(body_of(&html), "<p>indented body text.</p>\n");
    }

    #[test]
    fn text_is_escaped() {
        let html = generate_html("if a < b && c > d then stop.");
        assert!(html.contains("<p>if a &lt; b &amp;&amp; c &gt; d then stop.</p>"));
    }

    #[test]
    fn long_capitalised_lines_are_paragraphs() {
        let line = format!("Capitalised {}", "words without stop ".repeat(5));
        let html = generate_html(&line);
        assert!(body_of(&html).starts_with("<p>"));
    }

    #[test]
    fn is_a_complete_document() {
        let html = generate_html("x");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"utf-8\">"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
