//! PDF text extraction via pdfium.
//!
//! The optimizer only needs the page count and the concatenated page text;
//! layout, fonts and images are discarded. Extraction sits behind the
//! [`TextExtractor`] trait so the pipeline can be driven by a fake in tests.
//!
//! pdfium is blocking and not async-safe, so callers run
//! [`TextExtractor::extract`] inside `spawn_blocking`. A fresh binding is
//! made for every call; nothing is cached between documents.

use crate::error::DocShiftError;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Text recovered from a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub page_count: usize,
    /// Page texts joined with `\n`.
    pub text: String,
}

/// Source of page text for the optimizer.
pub trait TextExtractor: Send + Sync {
    /// Parse `pdf` and return its page count and text.
    ///
    /// Unparseable input maps to [`DocShiftError::CorruptPdf`] and password
    /// protected input to [`DocShiftError::EncryptedPdf`].
    fn extract(&self, pdf: &[u8]) -> Result<ExtractedContent, DocShiftError>;
}

/// [`TextExtractor`] backed by the pdfium shared library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// Bind to the library at `path` (a file, or the directory holding the
    /// platform-named library). `None` uses the system search path.
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    fn bind(&self) -> Result<Pdfium, DocShiftError> {
        let bindings = match &self.library_path {
            Some(path) => {
                let library = resolve_library(path);
                Pdfium::bind_to_library(&library).map_err(|e| {
                    DocShiftError::PdfiumBindingFailed(format!("{}: {e}", library.display()))
                })?
            }
            None => Pdfium::bind_to_system_library()
                .map_err(|e| DocShiftError::PdfiumBindingFailed(e.to_string()))?,
        };
        Ok(Pdfium::new(bindings))
    }
}

fn resolve_library(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

impl TextExtractor for PdfiumExtractor {
    fn extract(&self, pdf: &[u8]) -> Result<ExtractedContent, DocShiftError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| classify_load_error(format!("{e:?}")))?;

        let pages = document.pages();
        let page_count = pages.len() as usize;
        let mut texts = Vec::with_capacity(page_count);
        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| DocShiftError::CorruptPdf {
                detail: format!("page {}: {e:?}", idx + 1),
            })?;
            texts.push(text.all());
        }

        let text = texts.join("\n");
        debug!(
            "Extracted {} chars from {} pages",
            text.chars().count(),
            page_count
        );
        Ok(ExtractedContent { page_count, text })
    }
}

/// Map a pdfium load failure to the error taxonomy.
fn classify_load_error(detail: String) -> DocShiftError {
    if detail.contains("Password") || detail.contains("password") {
        DocShiftError::EncryptedPdf
    } else {
        DocShiftError::CorruptPdf { detail }
    }
}
