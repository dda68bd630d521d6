//! Pipeline stages behind the three conversions.
//!
//! Each submodule implements one transformation step, so every step can be
//! tested on its own and the native-backed ones (pdfium, Chrome) can be
//! swapped for fakes through their traits.
//!
//! ## Data Flow
//!
//! ```text
//! Markdown → PDF:   markdown ──▶ text ──▶ fonts ──▶ layout ──▶ pdf_writer
//!                   (comrak)  (scraper) (WinAnsi)  (lines)    (lopdf)
//!
//! Markdown → DOCX:  docx ──▶ docx_writer
//!                   (lines)  (zip + XML)
//!
//! PDF optimize:     extract ──▶ html ──▶ browser ──▶ metadata
//!                   (pdfium)   (reflow)  (Chrome)    (lopdf)
//! ```
//!
//! 1. [`markdown`] — CommonMark + autolinks + smart punctuation to HTML
//! 2. [`text`] — HTML to wrapped plain text
//! 3. [`fonts`] — standard-14 Helvetica widths and WinAnsi encoding
//! 4. [`layout`] — heading detection, wrapping and pagination into draw
//!    commands
//! 5. [`pdf_writer`] — serialise draw commands as a PDF
//! 6. [`docx`] — line-based markdown mapping to paragraphs and runs
//! 7. [`docx_writer`] — package paragraphs as an OOXML document
//! 8. [`extract`] — text extraction; runs in `spawn_blocking` because pdfium
//!    is not async-safe
//! 9. [`html`] — reflow extracted text into a print-ready HTML page
//! 10. [`browser`] — print HTML to PDF with headless Chrome
//! 11. [`metadata`] — replace producer metadata and re-save compressed

pub mod browser;
pub mod docx;
pub mod docx_writer;
pub mod extract;
pub mod fonts;
pub mod html;
pub mod layout;
pub mod markdown;
pub mod metadata;
pub mod pdf_writer;
pub mod text;
