//! Result types returned by the conversion entry points.
//!
//! The `*Response` / `*Result` structs are the response-level surface: they
//! never carry a Rust error, only a localized message plus an [`ErrorKind`],
//! and serialize in camelCase for JSON consumers. Rust callers that want the
//! detailed error use the byte-level APIs, which return [`OptimizedPdf`] or
//! raw bytes inside a `Result`.

use crate::error::{DocShiftError, ErrorKind, Locale};
use serde::{Deserialize, Serialize};

/// Outcome of a Markdown → PDF or Markdown → DOCX conversion.
///
/// Exactly one of `data` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    /// Base64 of the produced document.
    pub data: Option<String>,
    /// Localized user-facing message.
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl ConversionResponse {
    pub fn success(data: String) -> Self {
        Self {
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(err: &DocShiftError, locale: Locale) -> Self {
        let kind = err.kind();
        Self {
            data: None,
            error: Some(kind.message(locale).to_string()),
            error_kind: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

/// How the optimizer arrived at its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptimizationMethod {
    /// Text was extracted and re-printed through the browser.
    Rerender,
    /// The pipeline stopped before rendering.
    Skipped,
}

/// A successfully optimized PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedPdf {
    pub original_size: usize,
    pub size: usize,
    pub reduction_percent: i64,
    pub bytes: Vec<u8>,
}

/// Outcome of a PDF optimization, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Decoded input size in bytes (0 when the input could not be decoded).
    pub original_size: usize,
    /// Size of the optimized PDF. Also set on a post-render minimal-gain
    /// refusal.
    pub size: Option<usize>,
    pub reduction_percent: Option<i64>,
    pub method: OptimizationMethod,
    /// Base64 of the optimized PDF.
    pub data: Option<String>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl OptimizationResult {
    pub fn success(optimized: &OptimizedPdf, data: String) -> Self {
        Self {
            original_size: optimized.original_size,
            size: Some(optimized.size),
            reduction_percent: Some(optimized.reduction_percent),
            method: OptimizationMethod::Rerender,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(original_size: usize, err: &DocShiftError, locale: Locale) -> Self {
        let kind = err.kind();
        let (size, reduction_percent) = match err {
            DocShiftError::MinimalGain {
                reduction_percent,
                size,
            } => (*size, *reduction_percent),
            _ => (None, None),
        };
        Self {
            original_size,
            size,
            reduction_percent,
            method: if size.is_some() {
                OptimizationMethod::Rerender
            } else {
                OptimizationMethod::Skipped
            },
            data: None,
            error: Some(kind.message(locale).to_string()),
            error_kind: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

/// `round((original - final) / original * 100)`, halves rounded up.
///
/// Negative when the result grew. Zero for an empty original.
pub fn reduction_percent(original: usize, final_size: usize) -> i64 {
    if original == 0 {
        return 0;
    }
    let saved = original as f64 - final_size as f64;
    (saved * 100.0 / original as f64 + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_rounds_half_up() {
        assert_eq!(reduction_percent(1000, 400), 60);
        assert_eq!(reduction_percent(1000, 955), 5); // 4.5 → 5
        assert_eq!(reduction_percent(1000, 956), 4); // 4.4 → 4
        assert_eq!(reduction_percent(1000, 1005), 0); // -0.5 → 0
        assert_eq!(reduction_percent(1000, 1100), -10);
        assert_eq!(reduction_percent(0, 10), 0);
    }

    #[test]
    fn conversion_response_serializes_camel_case() {
        let resp = ConversionResponse::failure(
            &DocShiftError::InputTooLarge { size: 2, limit: 1 },
            Locale::En,
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(json["errorKind"], "InputTooLarge");
        assert_eq!(json["error"], "The file is too large.");
    }

    #[test]
    fn success_and_failure_are_exclusive() {
        let ok = ConversionResponse::success("QUJD".into());
        assert!(ok.is_success() && ok.error.is_none() && ok.error_kind.is_none());
        let err = ConversionResponse::failure(&DocShiftError::Internal("x".into()), Locale::Es);
        assert!(!err.is_success() && err.error.is_some());
    }

    #[test]
    fn post_render_refusal_keeps_size() {
        let err = DocShiftError::MinimalGain {
            reduction_percent: Some(4),
            size: Some(960),
        };
        let result = OptimizationResult::failure(1000, &err, Locale::En);
        assert_eq!(result.size, Some(960));
        assert_eq!(result.reduction_percent, Some(4));
        assert_eq!(result.method, OptimizationMethod::Rerender);
        assert!(result.data.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["originalSize"], 1000);
        assert_eq!(json["reductionPercent"], 4);
        assert_eq!(json["method"], "rerender");
    }

    #[test]
    fn early_refusal_is_skipped() {
        let err = DocShiftError::MinimalGain {
            reduction_percent: None,
            size: None,
        };
        let result = OptimizationResult::failure(500, &err, Locale::En);
        assert_eq!(result.method, OptimizationMethod::Skipped);
        assert_eq!(result.error_kind, Some(ErrorKind::MinimalGain));
    }
}
