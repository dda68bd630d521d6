//! # docshift
//!
//! Convert Markdown to PDF or DOCX, and shrink text-heavy PDFs by
//! re-rendering their text.
//!
//! ## Conversions
//!
//! ```text
//! Markdown ──▶ HTML ──▶ plain text ──▶ line layout ──▶ PDF      (pure Rust)
//! Markdown ──▶ line mapping ──▶ OOXML parts ──▶ DOCX             (pure Rust)
//! PDF ──▶ text (pdfium) ──▶ HTML ──▶ PDF (headless Chrome) ──▶ metadata rewrite
//! ```
//!
//! The two Markdown conversions are synchronous and self-contained. PDF
//! optimization needs a pdfium shared library and a Chrome/Chromium binary
//! at runtime; both block, so [`PdfOptimizer`] drives them on tokio's
//! blocking pool.
//!
//! All three are lossy by design: they keep text and a little structure,
//! nothing else.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docshift::{convert_markdown_to_docx, optimize_pdf, ConverterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConverterConfig::default();
//!
//!     let docx = convert_markdown_to_docx("# Notes\n\n- one\n- two", &config);
//!     println!("docx base64: {} chars", docx.data.map_or(0, |d| d.len()));
//!
//!     let pdf = std::fs::read("scan.pdf").unwrap();
//!     let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, pdf);
//!     let result = optimize_pdf(&encoded, &config).await;
//!     match result.error {
//!         None => println!("saved {:?}%", result.reduction_percent),
//!         Some(msg) => eprintln!("{msg}"),
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docshift` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ```toml
//! docshift = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod optimize;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConverterConfig, ConverterConfigBuilder, DocumentInfo, OptimizeThresholds, PageLayout,
    PrintOptions,
};
pub use convert::{
    convert_markdown_to_docx, convert_markdown_to_pdf, markdown_to_docx_bytes,
    markdown_to_pdf_bytes, optimize_pdf, optimize_pdf_sync, write_output,
};
pub use error::{DocShiftError, ErrorKind, Locale};
pub use optimize::PdfOptimizer;
pub use output::{ConversionResponse, OptimizationMethod, OptimizationResult, OptimizedPdf};
pub use progress::{NoopProgressCallback, OptimizeProgressCallback, OptimizeStage, ProgressCallback};
