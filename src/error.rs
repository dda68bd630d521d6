//! Error types for the docshift library.
//!
//! Two layers reflect two audiences:
//!
//! * [`DocShiftError`] — **Detailed**: what exactly went wrong, with enough
//!   context for a log line (byte counts, collaborator messages, paths).
//!   Returned as `Err(DocShiftError)` from the byte-level APIs.
//!
//! * [`ErrorKind`] — **User-facing**: the five-way taxonomy the response
//!   structs expose. Every detailed variant maps to exactly one kind and every
//!   kind has exactly one localized message, so callers never show raw
//!   collaborator errors to end users.
//!
//! `MinimalGain` is a policy refusal rather than a failure: the optimizer ran
//! (or decided it need not run) and the result would not be meaningfully
//! smaller than the input.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docshift library.
#[derive(Debug, Error)]
pub enum DocShiftError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input exceeds the configured byte ceiling.
    #[error("Input is {size} bytes, which exceeds the {limit}-byte limit")]
    InputTooLarge { size: usize, limit: usize },

    /// The optimizer input was not valid base64.
    #[error("Input is not valid base64: {detail}")]
    InvalidBase64 { detail: String },

    // ── PDF parsing errors ────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt or unreadable: {detail}")]
    CorruptPdf { detail: String },

    /// The PDF is protected with a password.
    #[error("PDF is encrypted and cannot be processed without its password")]
    EncryptedPdf,

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction needs the pdfium shared library.\n\
  • Install it system-wide, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The headless browser could not be started.
    #[error("Failed to launch headless browser: {detail}")]
    BrowserLaunchFailed { detail: String },

    /// The browser ran past the configured timeout.
    #[error("Headless browser timed out after {secs}s")]
    RenderTimeout { secs: u64 },

    /// Loading or printing the generated HTML failed.
    #[error("Headless browser failed to print the document: {detail}")]
    RenderFailed { detail: String },

    // ── Policy refusals ───────────────────────────────────────────────────
    /// Re-rendering would not shrink the document enough to be worth it.
    ///
    /// `reduction_percent` and `size` are `None` when the pipeline stopped
    /// before rendering (the input already looked optimized).
    #[error("Optimization skipped: minimal gain expected ({})", describe_gain(.reduction_percent))]
    MinimalGain {
        reduction_percent: Option<i64>,
        size: Option<usize>,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Serialising the generated PDF failed.
    #[error("Failed to write PDF: {detail}")]
    PdfWriteFailed { detail: String },

    /// Packing the generated DOCX failed.
    #[error("Failed to write DOCX: {detail}")]
    DocxWriteFailed { detail: String },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_gain(reduction_percent: &Option<i64>) -> String {
    match *reduction_percent {
        Some(p) => format!("{p}% reduction"),
        None => "already optimized".to_string(),
    }
}

impl DocShiftError {
    /// The user-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocShiftError::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            DocShiftError::InvalidBase64 { .. }
            | DocShiftError::CorruptPdf { .. }
            | DocShiftError::EncryptedPdf => ErrorKind::ParseError,
            DocShiftError::BrowserLaunchFailed { .. }
            | DocShiftError::RenderTimeout { .. }
            | DocShiftError::RenderFailed { .. } => ErrorKind::RenderError,
            DocShiftError::MinimalGain { .. } => ErrorKind::MinimalGain,
            DocShiftError::PdfiumBindingFailed(_)
            | DocShiftError::PdfWriteFailed { .. }
            | DocShiftError::DocxWriteFailed { .. }
            | DocShiftError::OutputWriteFailed { .. }
            | DocShiftError::InvalidConfig(_)
            | DocShiftError::Internal(_) => ErrorKind::Unknown,
        }
    }
}

/// The five error categories exposed across the response-level API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InputTooLarge,
    ParseError,
    RenderError,
    MinimalGain,
    Unknown,
}

/// Language of user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// English (default).
    #[default]
    En,
    /// Spanish.
    Es,
}

impl ErrorKind {
    /// The single user-facing message for this kind.
    pub fn message(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ErrorKind::InputTooLarge, Locale::En) => "The file is too large.",
            (ErrorKind::InputTooLarge, Locale::Es) => "El archivo es demasiado grande.",
            (ErrorKind::ParseError, Locale::En) => {
                "The file is corrupt, invalid or password-protected."
            }
            (ErrorKind::ParseError, Locale::Es) => {
                "El archivo está corrupto, no es válido o está protegido con contraseña."
            }
            (ErrorKind::RenderError, Locale::En) => {
                "The document could not be rendered. Please try again later."
            }
            (ErrorKind::RenderError, Locale::Es) => {
                "No se pudo renderizar el documento. Intente de nuevo más tarde."
            }
            (ErrorKind::MinimalGain, Locale::En) => {
                "This PDF is already optimized; minimal gain expected."
            }
            (ErrorKind::MinimalGain, Locale::Es) => {
                "Este PDF ya está optimizado; la reducción sería mínima."
            }
            (ErrorKind::Unknown, Locale::En) => "The conversion failed. Try another file.",
            (ErrorKind::Unknown, Locale::Es) => {
                "Error al convertir el archivo. Intente con otro archivo."
            }
        }
    }
}
