//! Conversion entry points.
//!
//! Two layers, mirroring the two error layers in [`crate::error`]:
//!
//! * **Byte-level** — [`markdown_to_pdf_bytes`], [`markdown_to_docx_bytes`]
//!   and [`crate::PdfOptimizer::optimize_bytes`] return
//!   `Result<_, DocShiftError>` for Rust callers.
//! * **Response-level** — [`convert_markdown_to_pdf`],
//!   [`convert_markdown_to_docx`] and [`optimize_pdf`] never fail: every
//!   error is logged and folded into a response struct with a localized
//!   message, ready to hand to an end user or serialize as JSON.

use crate::config::ConverterConfig;
use crate::error::DocShiftError;
use crate::optimize::PdfOptimizer;
use crate::output::{ConversionResponse, OptimizationResult};
use crate::pipeline::docx::map_markdown;
use crate::pipeline::docx_writer::write_docx;
use crate::pipeline::fonts::{to_winansi, StandardFonts};
use crate::pipeline::layout::LayoutEngine;
use crate::pipeline::markdown::render_html;
use crate::pipeline::pdf_writer::write_pdf;
use crate::pipeline::text::{html_to_text, TextOptions};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use tracing::{debug, error, info};

/// Reject inputs longer than `limit` bytes.
pub(crate) fn check_size(size: usize, limit: usize) -> Result<(), DocShiftError> {
    if size > limit {
        return Err(DocShiftError::InputTooLarge { size, limit });
    }
    Ok(())
}

/// Render markdown to PDF bytes.
///
/// Markdown → HTML → wrapped plain text → laid-out lines → PDF. Only text
/// survives; headings are recovered from the plain text by the layout
/// engine's heading heuristic.
///
/// # Errors
/// [`DocShiftError::InputTooLarge`] when `markdown` exceeds
/// `config.max_markdown_bytes`; [`DocShiftError::PdfWriteFailed`] if
/// serialisation fails.
pub fn markdown_to_pdf_bytes(
    markdown: &str,
    config: &ConverterConfig,
) -> Result<Vec<u8>, DocShiftError> {
    check_size(markdown.len(), config.max_markdown_bytes)?;

    let html = render_html(markdown);
    let text = html_to_text(
        &html,
        &TextOptions {
            wrap_column: config.text_wrap_column,
        },
    );
    let text = to_winansi(&text);
    debug!("Markdown → {} bytes HTML → {} lines text", html.len(), text.lines().count());

    let layout = LayoutEngine::new(config.page, &StandardFonts).layout(&text);
    let bytes = write_pdf(&layout, &config.page, &config.document_info)?;
    info!(
        "Converted markdown to PDF: {} pages, {} bytes",
        layout.page_count,
        bytes.len()
    );
    Ok(bytes)
}

/// Render markdown to DOCX bytes.
///
/// Works line by line on the markdown source; see
/// [`crate::pipeline::docx`] for the mapping rules.
pub fn markdown_to_docx_bytes(
    markdown: &str,
    config: &ConverterConfig,
) -> Result<Vec<u8>, DocShiftError> {
    check_size(markdown.len(), config.max_markdown_bytes)?;

    let blocks = map_markdown(markdown);
    let bytes = write_docx(&blocks, &config.document_info)?;
    info!(
        "Converted markdown to DOCX: {} paragraphs, {} bytes",
        blocks.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Convert markdown to a base64 PDF inside a [`ConversionResponse`].
///
/// # Example
/// ```rust
/// use docshift::{convert_markdown_to_pdf, ConverterConfig};
///
/// let resp = convert_markdown_to_pdf("# Hello\n\nWorld", &ConverterConfig::default());
/// assert!(resp.data.is_some());
/// ```
pub fn convert_markdown_to_pdf(markdown: &str, config: &ConverterConfig) -> ConversionResponse {
    respond(markdown_to_pdf_bytes(markdown, config), "PDF", config)
}

/// Convert markdown to a base64 DOCX inside a [`ConversionResponse`].
pub fn convert_markdown_to_docx(markdown: &str, config: &ConverterConfig) -> ConversionResponse {
    respond(markdown_to_docx_bytes(markdown, config), "DOCX", config)
}

fn respond(
    result: Result<Vec<u8>, DocShiftError>,
    target: &str,
    config: &ConverterConfig,
) -> ConversionResponse {
    match result {
        Ok(bytes) => ConversionResponse::success(STANDARD.encode(bytes)),
        Err(e) => {
            error!("Error converting markdown to {}: {}", target, e);
            ConversionResponse::failure(&e, config.locale)
        }
    }
}

/// Optimize a base64 PDF with the default collaborators.
///
/// Shorthand for `PdfOptimizer::new(config.clone()).optimize_base64(..)`.
pub async fn optimize_pdf(encoded: &str, config: &ConverterConfig) -> OptimizationResult {
    PdfOptimizer::new(config.clone())
        .optimize_base64(encoded)
        .await
}

/// Synchronous wrapper around [`optimize_pdf`].
///
/// Creates a temporary tokio runtime internally; do not call from within
/// an async context.
pub fn optimize_pdf_sync(encoded: &str, config: &ConverterConfig) -> OptimizationResult {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(optimize_pdf(encoded, config)),
        Err(e) => {
            let err = DocShiftError::Internal(format!("Failed to create tokio runtime: {e}"));
            error!("{}", err);
            OptimizationResult::failure(0, &err, config.locale)
        }
    }
}

/// Write `bytes` to `path` atomically (temp file in the same directory,
/// then rename), creating parent directories as needed.
pub async fn write_output(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), DocShiftError> {
    let path = path.as_ref();
    let write_err = |source| DocShiftError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
