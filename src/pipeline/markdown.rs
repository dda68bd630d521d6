//! Markdown → HTML via `comrak`.
//!
//! Raw HTML in the source is passed through, bare URLs become links and
//! straight quotes / dashes / ellipses are typographically replaced.

use comrak::{markdown_to_html, ComrakOptions};

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.autolink = true;
    options.parse.smart = true;
    options.render.unsafe_ = true;
    options
}

/// Render markdown to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    markdown_to_html(markdown, &comrak_options())
}
